use super::*;
use crate::effects::params::ParamValue;

#[test]
fn legacy_intensity_is_lifted() {
    let p = Preset::from_json(
        r#"{"name":"x","icon":"","effects":[
            {"id":"vintage","params":{"intensity":0.8}},
            {"id":"grayscale","params":{"intensity":0.1},"intensity":0.4}
        ]}"#,
    )
    .unwrap();
    assert_eq!(p.effects[0].intensity, Some(0.8));
    assert!(p.effects[0].params.get("intensity").is_none());
    assert_eq!(p.effects[1].intensity, Some(0.4));
    assert!(p.effects[1].params.is_empty());
}

#[test]
fn missing_params_and_icon_default() {
    let p = Preset::from_json(r#"{"name":"bare","effects":[{"id":"mirror"}]}"#).unwrap();
    assert_eq!(p.icon, "");
    assert!(p.effects[0].params.is_empty());
    assert_eq!(p.effects[0].intensity, None);
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(Preset::from_json("{"), Err(FxError::Serde(_))));
}

#[test]
fn serialization_sorts_param_keys() {
    let mut entry = EffectEntry::new("brightness");
    entry.params.insert("contrast", ParamValue::Number(0.5));
    entry.params.insert("brightness", ParamValue::Number(5.0));
    let p = Preset {
        name: "s".to_owned(),
        icon: String::new(),
        description: None,
        effects: vec![entry],
    };
    let json = serde_json::to_string(&p).unwrap();
    assert!(json.find("\"brightness\":5").unwrap() < json.find("\"contrast\"").unwrap());
    assert!(!json.contains("description"));
}

#[test]
fn catalog_instantiates_every_preset() {
    let catalog = Catalog::builtin().unwrap();
    let registry = EffectRegistry::builtin();
    assert!(catalog.len() >= 9);
    for (id, preset) in catalog.iter() {
        let chain = preset
            .instantiate(&registry)
            .unwrap_or_else(|e| panic!("preset {id}: {e}"));
        assert_eq!(chain.len(), preset.effects.len(), "{id}");
    }
    assert_eq!(catalog.get("retro").unwrap().effects[0].intensity, Some(0.8));
    assert!(catalog.get("nope").is_none());
}

#[test]
fn unknown_effect_leaves_chain_untouched() {
    let registry = EffectRegistry::builtin();
    let good = Catalog::builtin().unwrap().get("minimal").unwrap().clone();
    let mut chain = good.instantiate(&registry).unwrap();

    let bad = Preset::from_json(r#"{"name":"bad","effects":[{"id":"vintage"},{"id":"hologram"}]}"#)
        .unwrap();
    let err = bad.instantiate_into(&registry, &mut chain).unwrap_err();
    assert!(err.to_string().contains("bad"));
    assert_eq!(chain.len(), 1);
}

#[test]
fn chain_round_trip_reproduces_params() {
    let registry = EffectRegistry::builtin();
    let preset = Catalog::builtin().unwrap().get("anime").unwrap().clone();
    let chain = preset.instantiate(&registry).unwrap();
    let captured = Preset::from_chain("anime", "🌸", &chain);
    let again = Preset::from_json(&captured.to_json_pretty().unwrap())
        .unwrap()
        .instantiate(&registry)
        .unwrap();
    assert_eq!(captured.effects, again.snapshot());
}
