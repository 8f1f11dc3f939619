use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::default(),
    }
}

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    for i in 0..3u8 {
        sink.push_frame(FrameSeq(u64::from(i)), &Frame::filled(4, 2, [i, 0, 0, 255]))
            .unwrap();
    }
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(cfg()));
    let seqs: Vec<u64> = sink.frames().iter().map(|(s, _)| s.0).collect();
    assert_eq!(seqs, vec![0, 1, 2]);
    assert_eq!(sink.frames()[2].1.pixel(0, 0), [2, 0, 0, 255]);
}

#[test]
fn begin_resets_in_memory_sink() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameSeq(0), &Frame::new(4, 2)).unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
}

#[test]
fn boxed_sinks_forward() {
    let mut sink: Box<dyn FrameSink> = Box::new(InMemorySink::new());
    assert_eq!(sink.name(), "memory");
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameSeq(0), &Frame::new(4, 2)).unwrap();
    sink.end().unwrap();
}
