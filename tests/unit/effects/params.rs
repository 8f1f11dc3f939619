use super::*;

#[test]
fn numbers_are_clamped_not_rejected() {
    let s = ParamSpec::number("threshold", 0.0, 255.0, 1.0, 50.0);
    assert_eq!(s.coerce(ParamValue::Number(999.0)).unwrap(), ParamValue::Number(255.0));
    assert_eq!(s.coerce(ParamValue::Number(-1.0)).unwrap(), ParamValue::Number(0.0));
    assert_eq!(s.coerce("12".into()).unwrap(), ParamValue::Number(12.0));
    assert_eq!(s.coerce(ParamValue::Number(f64::NAN)).unwrap(), ParamValue::Number(50.0));
    assert!(s.coerce("abc".into()).is_err());
}

#[test]
fn colors_accept_hex_and_triples() {
    let s = ParamSpec::color("keyColor", Rgb::GREEN);
    assert_eq!(
        s.coerce("#ff00ff".into()).unwrap(),
        ParamValue::Color(Rgb::new(255, 0, 255))
    );
    assert_eq!(
        s.coerce(ParamValue::Color(Rgb::new(1, 2, 3))).unwrap(),
        ParamValue::Color(Rgb::new(1, 2, 3))
    );
    assert!(s.coerce(ParamValue::Number(3.0)).is_err());
}

#[test]
fn unknown_choice_falls_back_to_default() {
    let s = ParamSpec::choice("style", &["bars", "circle"], "bars");
    assert_eq!(s.coerce("CIRCLE".into()).unwrap(), ParamValue::Text("circle".into()));
    assert_eq!(s.coerce("zigzag".into()).unwrap(), ParamValue::Text("bars".into()));
}

#[test]
fn text_is_length_limited() {
    let s = ParamSpec::text("r", 4, "r");
    assert!(s.coerce("r*2".into()).is_ok());
    assert!(s.coerce("r*2+1".into()).is_err());
}

#[test]
fn untagged_json_round_trip() {
    let m: ParamMap = [
        ("a", ParamValue::Bool(true)),
        ("b", ParamValue::Number(0.5)),
        ("c", ParamValue::Color(Rgb::new(1, 2, 3))),
        ("d", ParamValue::Text("bars".into())),
    ]
    .into_iter()
    .collect();
    let s = serde_json::to_string(&m).unwrap();
    assert_eq!(s, r#"{"a":true,"b":0.5,"c":[1,2,3],"d":"bars"}"#);
    let back: ParamMap = serde_json::from_str(&s).unwrap();
    assert_eq!(back, m);
}

#[test]
fn typed_getters_fall_back() {
    let m: ParamMap = [("n", ParamValue::Number(3.7))].into_iter().collect();
    assert_eq!(m.u32_or("n", 0), 3);
    assert_eq!(m.f32_or("missing", 1.5), 1.5);
    assert!(m.bool_or("n", false));
    assert_eq!(m.color_or("n", Rgb::WHITE), Rgb::WHITE);
}
