use super::*;
use crate::effects::params::{ParamValue, defaults};
use crate::surface::painter::Painter;

fn run(kind: EffectKind, params: &ParamMap, spectrum: Option<&Spectrum>, frame: &mut Frame) {
    let mut painter = Painter::new();
    let mut ctx = FrameContext::new(&mut painter).with_audio(spectrum);
    let mut state = AudioState::default();
    apply(kind, params, 1.0, frame, &mut ctx, &mut state).unwrap();
}

fn loud_bass() -> Spectrum {
    let mut bins = vec![0u8; 128];
    bins[..12].fill(255);
    Spectrum::new(bins, vec![128; 256])
}

#[test]
fn no_snapshot_is_a_no_op() {
    let orig = Frame::filled(32, 32, [10, 10, 10, 255]);
    for kind in [
        EffectKind::AudioVisualizer,
        EffectKind::BassReactive,
        EffectKind::VoiceReactive,
    ] {
        let mut f = orig.clone();
        run(kind, &defaults(kind.param_specs()), None, &mut f);
        assert_eq!(f, orig);
    }
}

#[test]
fn bars_rise_from_the_bottom() {
    let mut f = Frame::filled(128, 64, [0, 0, 0, 255]);
    let params = defaults(EffectKind::AudioVisualizer.param_specs());
    run(EffectKind::AudioVisualizer, &params, Some(&loud_bass()), &mut f);
    // Loud bins at the left: bar of height 32 at x 0..1.
    assert!(f.pixel(0, 63)[1] > 0);
    assert_eq!(f.pixel(127, 63), [0, 0, 0, 255]);
    assert_eq!(f.pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn bass_flash_needs_level_above_threshold() {
    let quiet = Spectrum::new(vec![10; 128], vec![128; 256]);
    let orig = Frame::filled(40, 40, [0, 0, 0, 255]);
    let params = defaults(EffectKind::BassReactive.param_specs());

    let mut f = orig.clone();
    run(EffectKind::BassReactive, &params, Some(&quiet), &mut f);
    assert_eq!(f, orig);

    let mut g = orig.clone();
    run(EffectKind::BassReactive, &params, Some(&loud_bass()), &mut g);
    assert!(g.pixel(20, 20)[0] > 0);
}

#[test]
fn voice_glow_strokes_the_border() {
    let mut bins = vec![0u8; 100];
    bins[10..30].fill(255);
    let s = Spectrum::new(bins, vec![128; 200]);
    let mut params = defaults(EffectKind::VoiceReactive.param_specs());
    params.insert("highlightColor", ParamValue::Color(Rgb::new(0, 0, 255)));
    let mut f = Frame::filled(60, 60, [0, 0, 0, 255]);
    run(EffectKind::VoiceReactive, &params, Some(&s), &mut f);
    assert!(f.pixel(5, 30)[2] > 200);
    assert_eq!(f.pixel(30, 30), [0, 0, 0, 255]);
}

#[test]
fn hue_wheel_primaries() {
    assert_eq!(hue_to_rgb(0.0), Rgb::new(255, 0, 0));
    assert_eq!(hue_to_rgb(120.0), Rgb::new(0, 255, 0));
    assert_eq!(hue_to_rgb(240.0), Rgb::new(0, 0, 255));
    assert_eq!(hue_to_rgb(360.0), Rgb::new(255, 0, 0));
}
