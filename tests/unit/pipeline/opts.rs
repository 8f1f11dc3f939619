use super::*;

#[test]
fn defaults_are_valid() {
    let opts = PipelineOpts::default();
    opts.validate().unwrap();
    assert_eq!(opts.working_size(), FrameSize::new(640, 480));
    assert_eq!(opts.max_dt(), Duration::from_millis(250));
    assert_eq!(opts.failure_limit, 3);
}

#[test]
fn partial_json_fills_defaults() {
    let opts = PipelineOpts::from_json(
        r#"{"width": 320, "height": 240, "fps": {"num": 15, "den": 1}, "detection": {"interval": 50}}"#,
    )
    .unwrap();
    assert_eq!(opts.working_size(), FrameSize::new(320, 240));
    assert_eq!(opts.frame_budget(), Duration::from_secs_f64(1.0 / 15.0));
    assert_eq!(opts.detection.interval, Duration::from_millis(50));
    assert_eq!(opts.audio.fft_size, 256);
}

#[test]
fn invalid_documents_are_rejected() {
    assert!(matches!(
        PipelineOpts::from_json(r#"{"width": 0}"#),
        Err(FxError::Validation(_))
    ));
    assert!(matches!(
        PipelineOpts::from_json(r#"{"recordEvery": 0}"#),
        Err(FxError::Validation(_))
    ));
    assert!(matches!(
        PipelineOpts::from_json(r#"{"audio": {"fftSize": 100}}"#),
        Err(FxError::Validation(_))
    ));
    assert!(matches!(
        PipelineOpts::from_json(r#"{"widht": 10}"#),
        Err(FxError::Serde(_))
    ));
}
