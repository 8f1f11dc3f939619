use super::*;

#[test]
fn canonical_layout_has_68_points_inside_the_face() {
    let face = Rect::new(100.0, 50.0, 300.0, 300.0);
    let l = Landmarks::from_face_box(face);
    let total = l.jaw.len()
        + l.left_brow.len()
        + l.right_brow.len()
        + l.nose.len()
        + l.left_eye.len()
        + l.right_eye.len()
        + l.mouth.len();
    assert_eq!(total, 68);
    let inflated = face.inflate(1.0, 1.0);
    for p in l.left_eye.iter().chain(l.mouth.iter()).chain(l.jaw.iter()) {
        assert!(inflated.contains(*p), "{p:?} outside face box");
    }
}

#[test]
fn eye_line_is_level_for_upright_face() {
    let l = Landmarks::from_face_box(Rect::new(0.0, 0.0, 200.0, 200.0));
    let (left, right, dist, angle) = l.eye_line().unwrap();
    assert!(left.x < right.x);
    assert!((dist - 72.0).abs() < 1.0, "{dist}");
    assert!(angle.abs() < 1e-6);
    let (first, mid, last) = l.jaw_anchors().unwrap();
    assert!(first.x < mid.x && mid.x < last.x);
    assert!(mid.y > first.y);
}

#[test]
fn staleness_uses_capture_time() {
    let set = DetectionSet::new(vec![], 10, 10);
    let later = set.captured_at + Duration::from_millis(600);
    assert!(!set.is_stale(set.captured_at, Duration::from_millis(500)));
    assert!(set.is_stale(later, Duration::from_millis(500)));
}

#[test]
fn scaling_maps_boxes_proportionally() {
    let set = DetectionSet::new(
        vec![Detection::new(Rect::new(10.0, 10.0, 20.0, 20.0), 0.9)],
        100,
        100,
    );
    let scaled = set.scaled_to(200, 50);
    assert_eq!(scaled[0].bbox, Rect::new(20.0, 5.0, 40.0, 10.0));
    assert_eq!(set.scaled_to(100, 100)[0].bbox, set.detections[0].bbox);
}
