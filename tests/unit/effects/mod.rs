use super::*;
use crate::surface::painter::Painter;
use std::time::Duration;

fn gradient(w: u32, h: u32) -> Frame {
    let mut f = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.set_pixel(x, y, [(x * 7 % 256) as u8, (y * 11 % 256) as u8, 90, 255]);
        }
    }
    f
}

fn apply_once(fx: &mut Effect, frame: &mut Frame) -> FxResult<()> {
    let mut painter = Painter::new();
    let mut ctx = FrameContext::new(&mut painter).with_dt(Duration::from_millis(33));
    fx.apply(frame, &mut ctx)
}

#[test]
fn new_effect_uses_defaults() {
    let fx = Effect::new(EffectKind::Pixelate);
    assert!(fx.is_enabled());
    assert_eq!(fx.intensity(), 1.0);
    assert_eq!(fx.name(), "pixelate");
    assert_eq!(fx.params().len(), fx.param_specs().len());
}

#[test]
fn set_param_clamps_numbers() {
    let mut fx = Effect::new(EffectKind::Pixelate);
    fx.set_param("blockSize", 10_000.0).unwrap();
    let spec = fx.kind().param_spec("blockSize").unwrap();
    let params::ParamKind::Number { max, .. } = spec.kind else {
        panic!("blockSize should be numeric");
    };
    assert_eq!(fx.params().get("blockSize").and_then(ParamValue::as_f64), Some(max));
}

#[test]
fn set_param_rejects_unknown_key_and_keeps_previous() {
    let mut fx = Effect::new(EffectKind::Brightness);
    let before = fx.params().clone();
    assert!(matches!(
        fx.set_param("nope", 1.0),
        Err(FxError::Validation(_))
    ));
    assert!(matches!(
        fx.set_param("brightness", "bright"),
        Err(FxError::Validation(_))
    ));
    assert_eq!(fx.params(), &before);
}

#[test]
fn intensity_key_routes_to_intensity() {
    let mut fx = Effect::new(EffectKind::Grayscale);
    fx.set_param("intensity", 0.25).unwrap();
    assert_eq!(fx.intensity(), 0.25);
    fx.set_intensity(7.0).unwrap();
    assert_eq!(fx.intensity(), 1.0);
    fx.set_intensity(-1.0).unwrap();
    assert_eq!(fx.intensity(), 0.0);
    assert!(fx.set_intensity(f32::NAN).is_err());
}

#[test]
fn disabled_and_zero_intensity_are_no_ops() {
    let mut fx = Effect::new(EffectKind::Vintage);
    let mut f = gradient(8, 8);
    let before = f.clone();

    assert!(!fx.toggle());
    apply_once(&mut fx, &mut f).unwrap();
    assert_eq!(f, before);

    assert!(fx.toggle());
    fx.set_intensity(0.0).unwrap();
    apply_once(&mut fx, &mut f).unwrap();
    assert_eq!(f, before);

    fx.set_intensity(1.0).unwrap();
    apply_once(&mut fx, &mut f).unwrap();
    assert_ne!(f, before);
}

#[test]
fn custom_set_param_compiles_before_storing() {
    let mut fx = Effect::new(EffectKind::Custom);
    assert!(matches!(fx.set_param("r", "r +"), Err(FxError::Expr(_))));
    assert_eq!(fx.params().str_or("r", ""), "r");
    fx.set_param("r", "255 - r").unwrap();

    let mut f = Frame::filled(2, 2, [5, 6, 7, 255]);
    apply_once(&mut fx, &mut f).unwrap();
    assert_eq!(f.pixel(0, 0), [250, 6, 7, 255]);
}

#[test]
fn trigger_only_for_burst_kinds() {
    let mut confetti = Effect::new(EffectKind::Confetti);
    assert!(confetti.trigger(10.0, 10.0));
    let mut gray = Effect::new(EffectKind::Grayscale);
    assert!(!gray.trigger(10.0, 10.0));
}

#[test]
fn set_image_is_limited_to_background_kinds() {
    let img = Arc::new(Frame::filled(4, 4, [0, 255, 0, 255]));
    let mut key = Effect::new(EffectKind::ChromaKey);
    key.set_image(Some(img.clone())).unwrap();
    let mut seg = Effect::new(EffectKind::SmartSegment);
    seg.set_image(Some(img.clone())).unwrap();
    let mut gray = Effect::new(EffectKind::Grayscale);
    assert!(matches!(gray.set_image(Some(img)), Err(FxError::Validation(_))));
}

#[test]
fn release_is_idempotent_and_effect_stays_usable() {
    let mut fx = Effect::new(EffectKind::Snow);
    let mut f = gradient(64, 48);
    apply_once(&mut fx, &mut f).unwrap();
    assert!(fx.particle_count().unwrap_or(0) > 0);

    fx.release();
    fx.release();
    assert_eq!(fx.particle_count(), Some(0));
    apply_once(&mut fx, &mut f).unwrap();
}

#[test]
fn release_keeps_the_background_image() {
    let mut key = Effect::new(EffectKind::ChromaKey);
    key.set_param("keyColor", "#00ff00").unwrap();
    key.set_param("background", "image").unwrap();
    key.set_image(Some(Arc::new(Frame::filled(4, 4, [255, 0, 0, 255]))))
        .unwrap();

    let mut f = Frame::filled(8, 8, [0, 255, 0, 255]);
    apply_once(&mut key, &mut f).unwrap();
    assert_eq!(f.pixel(3, 3), [255, 0, 0, 255]);

    key.release();
    let mut f = Frame::filled(8, 8, [0, 255, 0, 255]);
    apply_once(&mut key, &mut f).unwrap();
    assert_eq!(f.pixel(3, 3), [255, 0, 0, 255]);
}

#[test]
fn snapshot_captures_configuration() {
    let mut fx = Effect::new(EffectKind::ColorTint);
    fx.set_param("color", "#102030").unwrap();
    fx.set_intensity(0.5).unwrap();
    let entry = fx.snapshot();
    assert_eq!(entry.id, "colortint");
    assert_eq!(entry.intensity, Some(0.5));
    assert_eq!(entry.params, *fx.params());
}
