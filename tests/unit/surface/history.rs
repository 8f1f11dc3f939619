use super::*;

fn frame(v: u8) -> Frame {
    Frame::filled(2, 2, [v, v, v, 255])
}

#[test]
fn ring_is_bounded_and_reuses_buffers() {
    let mut h = FrameHistory::new(3);
    for v in 0..20u8 {
        h.push(&frame(v));
    }
    assert_eq!(h.len(), 3);
    let newest: Vec<u8> = h.iter_newest_first().map(|b| b[0]).collect();
    assert_eq!(newest, vec![19, 18, 17]);
    assert_eq!(h.stats().alloc_frames, 3);
    assert_eq!(h.stats().retained_bytes, 3 * 16);
}

#[test]
fn capacity_is_capped_at_ten() {
    let h = FrameHistory::new(50);
    assert_eq!(h.capacity(), MAX_HISTORY);
    assert_eq!(FrameHistory::new(0).capacity(), 1);
}

#[test]
fn size_change_resets_history() {
    let mut h = FrameHistory::new(4);
    h.push(&frame(1));
    h.push(&frame(2));
    h.push(&Frame::filled(3, 1, [9, 9, 9, 255]));
    assert_eq!(h.len(), 1);
    assert_eq!(h.stats().resets, 1);
}

#[test]
fn shrinking_keeps_newest() {
    let mut h = FrameHistory::new(5);
    for v in 1..=5u8 {
        h.push(&frame(v));
    }
    h.set_capacity(2);
    let newest: Vec<u8> = h.iter_newest_first().map(|b| b[0]).collect();
    assert_eq!(newest, vec![5, 4]);
}

#[test]
fn release_is_idempotent() {
    let mut h = FrameHistory::new(2);
    h.push(&frame(1));
    h.release();
    h.release();
    assert!(h.is_empty());
    assert_eq!(h.stats().retained_bytes, 0);
}
