use super::*;
use crate::effects::kind::EffectKind;
use crate::effects::params::defaults;
use crate::surface::painter::Painter;
use std::time::Duration;

fn params(pairs: &[(&str, &str)]) -> ParamMap {
    let mut p = defaults(EffectKind::Custom.param_specs());
    for &(k, v) in pairs {
        p.insert(k, v.into());
    }
    p
}

fn run(p: &ParamMap, intensity: f32, frame: &mut Frame) -> FxResult<()> {
    let mut painter = Painter::new();
    let ctx = FrameContext::new(&mut painter).with_elapsed(Duration::from_secs(2));
    apply(p, intensity, frame, &ctx, &mut CustomState::default())
}

#[test]
fn identity_programs_leave_frame_untouched() {
    let mut f = Frame::filled(3, 2, [10, 20, 30, 40]);
    let before = f.clone();
    run(&params(&[]), 1.0, &mut f).unwrap();
    assert_eq!(f, before);
}

#[test]
fn invert_red_channel_only() {
    let mut f = Frame::filled(2, 2, [10, 20, 30, 255]);
    run(&params(&[("r", "255 - r")]), 1.0, &mut f).unwrap();
    assert_eq!(f.pixel(1, 1), [245, 20, 30, 255]);
}

#[test]
fn coordinates_and_size_are_bound() {
    let mut f = Frame::filled(4, 1, [0, 0, 0, 255]);
    run(&params(&[("g", "x == w - 1 ? 255 : 0"), ("b", "t * 10")]), 1.0, &mut f).unwrap();
    assert_eq!(f.pixel(0, 0), [0, 0, 20, 255]);
    assert_eq!(f.pixel(3, 0), [0, 255, 20, 255]);
}

#[test]
fn output_is_clamped_and_blended() {
    let mut f = Frame::filled(1, 1, [100, 0, 0, 255]);
    run(&params(&[("r", "1000")]), 0.5, &mut f).unwrap();
    // 100 * 0.5 + 255 * 0.5
    assert_eq!(f.pixel(0, 0)[0], 178);
}

#[test]
fn alpha_program_writes_alpha() {
    let mut f = Frame::filled(1, 1, [1, 2, 3, 255]);
    run(&params(&[("a", "a * 0.5")]), 1.0, &mut f).unwrap();
    assert_eq!(f.pixel(0, 0), [1, 2, 3, 128]);
}

#[test]
fn evaluation_error_fails_the_effect() {
    let mut f = Frame::filled(1, 1, [0, 0, 0, 255]);
    assert!(run(&params(&[("r", "1 / r")]), 1.0, &mut f).is_err());
}

#[test]
fn invalid_source_fails_compilation() {
    assert!(compile_channel("r +").is_err());
    assert!(compile_channel("sqrt(r) + lerp(r, g, i)").is_ok());
}
