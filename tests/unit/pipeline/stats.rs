use super::*;

#[test]
fn fps_is_smoothed_from_cycle_spacing() {
    let mut stats = PipelineStats::default();
    stats.record_cycle(Duration::ZERO, Duration::from_millis(2));
    assert_eq!(stats.fps, 0.0);
    stats.record_cycle(Duration::from_millis(20), Duration::from_millis(4));
    assert!((stats.fps - 50.0).abs() < 1e-9);
    stats.record_cycle(Duration::from_millis(10), Duration::from_millis(6));
    assert!((stats.fps - 55.0).abs() < 1e-9);

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.max_cycle, Duration::from_millis(6));
    assert_eq!(stats.avg_cycle(), Duration::from_millis(4));
}

#[test]
fn status_keeps_a_bounded_history() {
    let mut status = PipelineStatus::default();
    for i in 0..100 {
        status.push(FrameSeq(i), Component::Source, format!("camera busy {i}"));
    }
    assert_eq!(status.len(), 64);
    assert_eq!(status.entries().next().unwrap().seq, FrameSeq(36));
    assert_eq!(status.latest().unwrap().message, "camera busy 99");
    assert!(status.mentions(&Component::Source));
    assert!(!status.mentions(&Component::Audio));
}

#[test]
fn component_display() {
    assert_eq!(Component::Sink("ffmpeg".into()).to_string(), "sink 'ffmpeg'");
    assert_eq!(Component::Detector.to_string(), "detector");
}
