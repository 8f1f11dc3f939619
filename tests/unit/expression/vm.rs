use super::*;
use crate::expression::lower::lower_to_bytecode;
use crate::expression::parser::parse_expr;

fn run(src: &str, vars: &[(&str, f64)]) -> f64 {
    let names: Vec<&str> = vars.iter().map(|(n, _)| *n).collect();
    let values: Vec<f64> = vars.iter().map(|(_, v)| *v).collect();
    let p = lower_to_bytecode(&parse_expr(src).unwrap(), &names, 256).unwrap();
    let mut stack = Vec::new();
    eval_program_with_stack(&p, &values, &mut stack).unwrap()
}

#[test]
fn arithmetic_and_comparisons() {
    assert_eq!(run("1 + 2 * 3", &[]), 7.0);
    assert_eq!(run("(1 + 2) * 3", &[]), 9.0);
    assert_eq!(run("2 < 3", &[]), 1.0);
    assert_eq!(run("2 >= 3", &[]), 0.0);
    assert_eq!(run("-7 % 3", &[]), 2.0);
}

#[test]
fn logic_treats_non_zero_as_true() {
    assert_eq!(run("2 && 5", &[]), 1.0);
    assert_eq!(run("0 || 0", &[]), 0.0);
    assert_eq!(run("!0", &[]), 1.0);
    assert_eq!(run("!3", &[]), 0.0);
}

#[test]
fn select_picks_branch() {
    assert_eq!(run("r > 128 ? 255 : 0", &[("r", 200.0)]), 255.0);
    assert_eq!(run("r > 128 ? 255 : 0", &[("r", 10.0)]), 0.0);
}

#[test]
fn builtins() {
    assert_eq!(run("min(3, 4) + max(3, 4)", &[]), 7.0);
    assert_eq!(run("clamp(300, 0, 255)", &[]), 255.0);
    assert_eq!(run("clamp(5, 10, 0)", &[]), 5.0);
    assert_eq!(run("abs(-2)", &[]), 2.0);
    assert_eq!(run("floor(2.7)", &[]), 2.0);
    assert_eq!(run("sqrt(16)", &[]), 4.0);
    assert_eq!(run("pow(2, 10)", &[]), 1024.0);
    assert_eq!(run("lerp(0, 100, 0.25)", &[]), 25.0);
    assert_eq!(run("mix(0, 100, 0.5)", &[]), 50.0);
    assert_eq!(run("step(0.5, 0.4)", &[]), 0.0);
    assert_eq!(run("step(0.5, 0.5)", &[]), 1.0);
    assert!((run("sin(pi / 2)", &[]) - 1.0).abs() < 1e-12);
    assert!((run("cos(0)", &[]) - 1.0).abs() < 1e-12);
}

#[test]
fn stack_stays_within_computed_depth() {
    let p = lower_to_bytecode(&parse_expr("1 + (2 + (3 + 4))").unwrap(), &[], 256).unwrap();
    assert_eq!(p.max_stack, 4);
    let mut stack = Vec::new();
    assert_eq!(eval_program_with_stack(&p, &[], &mut stack).unwrap(), 10.0);
    assert!(stack.capacity() >= 4);
}

#[test]
fn unbound_slot_is_an_error() {
    let p = lower_to_bytecode(&parse_expr("x").unwrap(), &["x"], 256).unwrap();
    let mut stack = Vec::new();
    assert!(eval_program_with_stack(&p, &[], &mut stack).is_err());
}
