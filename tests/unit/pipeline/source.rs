use super::*;
use crate::detect::model::is_skin;

#[test]
fn synthetic_pattern_is_deterministic_and_limited() {
    let mut src = SyntheticSource::new(64, 48).with_limit(2);
    let a = src.next_frame().unwrap().unwrap();
    assert_eq!(a, src.render(0));
    assert!(src.next_frame().unwrap().is_some());
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn synthetic_pattern_has_a_face_block() {
    let frame = SyntheticSource::new(64, 48).render(0);
    let [r, g, b, _] = frame.pixel(32, 20);
    assert!(is_skin(r, g, b));
    let [r, g, b, _] = frame.pixel(60, 45);
    assert!(!is_skin(r, g, b));
}

#[test]
fn fit_to_resamples_only_when_needed() {
    let frame = Frame::filled(8, 8, [10, 20, 30, 255]);
    let same = fit_to(frame.clone(), FrameSize::new(8, 8)).unwrap();
    assert_eq!(same, frame);
    let scaled = fit_to(frame, FrameSize::new(4, 2)).unwrap();
    assert_eq!((scaled.width, scaled.height), (4, 2));
    assert_eq!(scaled.pixel(1, 1), [10, 20, 30, 255]);
    assert!(fit_to(Frame::new(0, 0), FrameSize::new(4, 4)).is_err());
}

#[test]
fn frame_list_plays_once_or_loops() {
    let frames = vec![Frame::filled(1, 1, [1, 0, 0, 255]), Frame::filled(1, 1, [2, 0, 0, 255])];
    let mut once = FrameListSource::new(frames.clone());
    assert_eq!(once.next_frame().unwrap().unwrap().pixel(0, 0)[0], 1);
    assert_eq!(once.next_frame().unwrap().unwrap().pixel(0, 0)[0], 2);
    assert!(once.next_frame().unwrap().is_none());

    let mut looped = FrameListSource::new(frames).looping();
    let reds: Vec<u8> = (0..5)
        .map(|_| looped.next_frame().unwrap().unwrap().pixel(0, 0)[0])
        .collect();
    assert_eq!(reds, vec![1, 2, 1, 2, 1]);
    assert!(FrameListSource::new(Vec::new()).looping().next_frame().unwrap().is_none());
}

#[test]
fn still_source_repeats() {
    let mut still = StillSource::new(Frame::filled(2, 2, [5, 5, 5, 255])).with_limit(3);
    for _ in 0..3 {
        assert!(still.next_frame().unwrap().is_some());
    }
    assert!(still.next_frame().unwrap().is_none());
}
