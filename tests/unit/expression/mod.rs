use super::*;

const VARS: &[&str] = &["r", "g", "b", "a", "x", "y", "w", "h", "t", "i"];

#[test]
fn compiles_and_evaluates_channel_program() {
    let p = Program::compile("255 - r", VARS).unwrap();
    let mut stack = Vec::new();
    let vars = [10.0, 0.0, 0.0, 255.0, 0.0, 0.0, 4.0, 4.0, 0.0, 1.0];
    assert_eq!(p.eval(&vars, &mut stack).unwrap(), 245.0);
    assert_eq!(p.source(), "255 - r");
}

#[test]
fn rejects_unknown_names() {
    let err = Program::compile("q + 1", VARS).unwrap_err();
    assert!(matches!(err, FxError::Expr(ref m) if m.contains("unknown variable")));
    let err = Program::compile("exp(r)", VARS).unwrap_err();
    assert!(matches!(err, FxError::Expr(ref m) if m.contains("unknown function")));
    assert!(Program::compile("min(r)", VARS).is_err());
}

#[test]
fn rejects_oversize_source_and_programs() {
    let long = format!("r{}", " ".repeat(MAX_SOURCE_LEN));
    assert!(matches!(
        Program::compile(&long, VARS),
        Err(FxError::Expr(_))
    ));

    // 200 additions lower to ~400 operations while staying under the byte limit.
    let many = vec!["1"; 200].join("+");
    assert!(many.len() <= MAX_SOURCE_LEN);
    assert!(Program::compile(&many, VARS).is_err());
}

#[test]
fn non_finite_results_fail_evaluation() {
    let p = Program::compile("r / 0", VARS).unwrap();
    let mut stack = Vec::new();
    let vars = [1.0; 10];
    assert!(p.eval(&vars, &mut stack).is_err());
}

#[test]
fn passthrough_detection() {
    assert!(Program::compile("g", VARS).unwrap().is_passthrough(1));
    assert!(!Program::compile("g", VARS).unwrap().is_passthrough(0));
    assert!(!Program::compile("g + 0", VARS).unwrap().is_passthrough(1));
    assert_eq!(Program::compile("1 + 2", VARS).unwrap().op_count(), 3);
}
