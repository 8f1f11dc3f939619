use super::*;
use crate::detect::detection::DetectionSet;
use crate::effects::params::{ParamValue, defaults};
use crate::surface::painter::Painter;

fn one_face(w: u32, h: u32, bbox: Rect) -> DetectionSet {
    DetectionSet::new(vec![Detection::new(bbox, 0.95)], w, h)
}

fn run(kind: EffectKind, params: &ParamMap, set: Option<&DetectionSet>, frame: &mut Frame) {
    let mut painter = Painter::new();
    let mut ctx = FrameContext::new(&mut painter).with_detections(set);
    let mut backdrop = Backdrop::default();
    apply(kind, params, 1.0, frame, &mut ctx, &mut backdrop).unwrap();
}

#[test]
fn no_detections_leave_frame_untouched() {
    let orig = Frame::filled(40, 40, [50, 60, 70, 255]);
    let empty = DetectionSet::new(vec![], 40, 40);
    for kind in [EffectKind::ArMask, EffectKind::FaceBeautify, EffectKind::SmartSegment] {
        let params = defaults(kind.param_specs());
        let mut f = orig.clone();
        run(kind, &params, None, &mut f);
        assert_eq!(f, orig);
        run(kind, &params, Some(&empty), &mut f);
        assert_eq!(f, orig);
    }
}

#[test]
fn every_mask_style_draws_near_the_face() {
    let face = Rect::new(60.0, 60.0, 140.0, 140.0);
    let set = one_face(200, 200, face);
    for style in crate::effects::kind::MASK_STYLES {
        let mut params = defaults(EffectKind::ArMask.param_specs());
        params.insert("mask", ParamValue::Text((*style).to_owned()));
        params.insert("color", ParamValue::Color(Rgb::new(255, 0, 0)));
        let orig = Frame::filled(200, 200, [128, 128, 128, 255]);
        let mut f = orig.clone();
        run(EffectKind::ArMask, &params, Some(&set), &mut f);
        assert_ne!(f, orig, "style {style} drew nothing");
        // Corners stay clear.
        assert_eq!(f.pixel(0, 199), orig.pixel(0, 199), "style {style}");
    }
}

#[test]
fn beautify_brightens_only_the_face_box() {
    let set = one_face(50, 50, Rect::new(10.0, 10.0, 30.0, 30.0));
    let params: ParamMap = [("smoothing", 0.0), ("brighten", 1.0), ("eyeEnhance", 0.0)]
        .into_iter()
        .collect();
    let mut f = Frame::filled(50, 50, [100, 100, 100, 255]);
    run(EffectKind::FaceBeautify, &params, Some(&set), &mut f);
    assert_eq!(f.pixel(20, 20), [130, 130, 130, 255]);
    assert_eq!(f.pixel(5, 5), [100, 100, 100, 255]);
    assert_eq!(f.pixel(35, 35), [100, 100, 100, 255]);
}

#[test]
fn eye_enhance_brightens_eye_centres() {
    let face = Rect::new(0.0, 0.0, 100.0, 100.0);
    let set = one_face(100, 100, face);
    let params: ParamMap = [("smoothing", 0.0), ("brighten", 0.0), ("eyeEnhance", 1.0)]
        .into_iter()
        .collect();
    let mut f = Frame::filled(100, 100, [100, 100, 100, 255]);
    run(EffectKind::FaceBeautify, &params, Some(&set), &mut f);
    let eye = Landmarks::from_face_box(face).left_eye_center().unwrap();
    assert!(f.pixel(eye.x as u32, eye.y as u32)[0] > 120);
    assert_eq!(f.pixel(50, 90), [100, 100, 100, 255]);
}

#[test]
fn person_box_expands_face() {
    let r = person_box(Rect::new(100.0, 100.0, 140.0, 150.0), 1.5);
    assert_eq!(r, Rect::new(80.0, 85.0, 160.0, 85.0 + 50.0 * 1.5 * 2.5));
}

#[test]
fn segmentation_replaces_outside_the_person() {
    let set = one_face(100, 100, Rect::new(40.0, 20.0, 60.0, 40.0));
    let mut params = defaults(EffectKind::SmartSegment.param_specs());
    params.insert("background", ParamValue::Text("color".into()));
    params.insert("backgroundColor", ParamValue::Color(Rgb::new(0, 0, 255)));
    params.insert("feather", ParamValue::Number(0.0));
    let mut f = Frame::filled(100, 100, [200, 200, 200, 255]);
    run(EffectKind::SmartSegment, &params, Some(&set), &mut f);
    assert_eq!(f.pixel(50, 50), [200, 200, 200, 255]);
    assert_eq!(f.pixel(5, 5), [0, 0, 255, 255]);
}

#[test]
fn glasses_lenses_span_a_quarter_eye_distance() {
    let face = Rect::new(0.0, 0.0, 200.0, 200.0);
    let set = one_face(200, 200, face);
    let (left, right, eye_dist, angle) = Landmarks::from_face_box(face).eye_line().unwrap();
    assert!(angle.abs() < 1e-9);
    let r = eye_dist * 0.25;
    let (mx, my) = ((left.x + right.x) / 2.0, (left.y + right.y) / 2.0);
    let gray = [128, 128, 128, 255];

    let mut params = defaults(EffectKind::ArMask.param_specs());
    params.insert("mask", ParamValue::Text("glasses".into()));
    params.insert("scale", ParamValue::Number(1.0));
    params.insert("color", ParamValue::Color(Rgb::new(255, 0, 0)));
    let mut f = Frame::filled(200, 200, gray);
    run(EffectKind::ArMask, &params, Some(&set), &mut f);
    for (x, y) in [(mx - 2.0 * r, my), (mx - r, my - r), (mx + 2.0 * r, my), (mx + r, my + r)] {
        let px = f.pixel(x as u32, y as u32);
        assert!(px[0] > 200 && px[1] < 60, "ring missing at ({x}, {y}): {px:?}");
    }
    // Lens interiors and the old, wider rim stay clear.
    assert_eq!(f.pixel((mx - r) as u32, my as u32), gray);
    assert_eq!(f.pixel((mx - 0.8 * eye_dist) as u32, my as u32), gray);

    params.insert("mask", ParamValue::Text("sunglasses".into()));
    let mut f = Frame::filled(200, 200, gray);
    run(EffectKind::ArMask, &params, Some(&set), &mut f);
    let lens = f.pixel((mx + r) as u32, my as u32);
    assert!(lens[0] < 60 && lens[1] < 60, "{lens:?}");
    assert_eq!(f.pixel((mx - 0.8 * eye_dist) as u32, my as u32), gray);
}
