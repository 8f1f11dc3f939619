use super::*;
use crate::effects::params::{ParamDefault, ParamKind};

#[test]
fn ids_are_unique_and_round_trip() {
    let mut seen = std::collections::HashSet::new();
    for k in EffectKind::ALL {
        assert!(seen.insert(k.id()), "duplicate id {}", k.id());
        assert_eq!(EffectKind::from_id(k.id()), Some(k));
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, format!("\"{}\"", k.id()));
    }
    assert_eq!(EffectKind::from_id("nope"), None);
}

#[test]
fn defaults_lie_inside_their_ranges() {
    for k in EffectKind::ALL {
        for s in k.param_specs() {
            match (s.kind, s.default) {
                (ParamKind::Number { min, max, step }, ParamDefault::Number(d)) => {
                    assert!(min <= d && d <= max, "{}.{} default out of range", k, s.key);
                    assert!(step > 0.0);
                }
                (ParamKind::Choice(choices), ParamDefault::Text(d)) => {
                    assert!(choices.contains(&d), "{}.{}", k, s.key);
                }
                (ParamKind::Bool, ParamDefault::Bool(_))
                | (ParamKind::Color, ParamDefault::Color(_))
                | (ParamKind::Text { .. }, ParamDefault::Text(_)) => {}
                other => panic!("{}.{} has mismatched spec {other:?}", k, s.key),
            }
        }
    }
}

#[test]
fn categories_cover_every_kind() {
    let pixel = EffectKind::ALL
        .iter()
        .filter(|k| k.category() == Category::Pixel)
        .count();
    let particle = EffectKind::ALL
        .iter()
        .filter(|k| k.category() == Category::Particle)
        .count();
    let overlay = EffectKind::ALL
        .iter()
        .filter(|k| k.category() == Category::Overlay)
        .count();
    assert_eq!(pixel, 11);
    assert_eq!(particle, 7);
    assert_eq!(overlay, 6);
    assert_eq!(EffectKind::ALL.len(), 38);
    assert_eq!(EffectKind::TextOverlay.id(), "textoverlay");
    assert_eq!(EffectKind::BackgroundBlur.id(), "blur");
    assert!(EffectKind::ChromaKey.accepts_image());
    assert!(!EffectKind::Grayscale.accepts_image());
}
