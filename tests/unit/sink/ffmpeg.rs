use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::default(),
    }
}

#[test]
fn flatten_transparent_returns_bg() {
    let src = vec![200u8, 100, 50, 0];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_half_alpha_over_black() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_straight_over_bg(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn begin_validates_dimensions_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(std::env::temp_dir().join("livefx_never.mp4")));
    assert!(matches!(sink.begin(cfg(0, 10)), Err(FxError::Validation(_))));
    assert!(matches!(sink.begin(cfg(11, 10)), Err(FxError::Validation(_))));
}

#[test]
fn push_before_begin_is_a_sink_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    assert!(matches!(
        sink.push_frame(FrameSeq(0), &Frame::new(2, 2)),
        Err(FxError::Sink(_))
    ));
    assert!(sink.end().is_ok());
}
