use super::*;
use crate::detect::detection::Detection;
use crate::detect::model::FixedModel;
use crate::effects::Effect;
use crate::effects::kind::EffectKind;
use crate::foundation::core::Rect;
use crate::pipeline::source::{FrameListSource, SyntheticSource};
use crate::sink::PreviewSink;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, s: impl Into<String>) {
        self.0.lock().unwrap().push(s.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct LoggedSource {
    inner: SyntheticSource,
    log: Log,
}

impl FrameSource for LoggedSource {
    fn name(&self) -> &str {
        "logged"
    }

    fn next_frame(&mut self) -> FxResult<Option<Frame>> {
        self.inner.next_frame()
    }

    fn stop(&mut self) {
        self.log.push("capture");
    }
}

/// Fails while `down` holds frames to skip.
struct FlakySource {
    script: Vec<bool>,
    next: usize,
}

impl FrameSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    fn next_frame(&mut self) -> FxResult<Option<Frame>> {
        let ok = self.script.get(self.next).copied().unwrap_or(true);
        self.next += 1;
        if ok {
            Ok(Some(Frame::filled(8, 8, [200, 100, 50, 255])))
        } else {
            Err(FxError::unavailable("camera busy"))
        }
    }
}

struct LoggedSink {
    name: String,
    log: Log,
    fail_on: Option<u64>,
}

impl FrameSink for LoggedSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _cfg: SinkConfig) -> FxResult<()> {
        self.log.push(format!("{}:begin", self.name));
        Ok(())
    }

    fn push_frame(&mut self, seq: FrameSeq, _frame: &Frame) -> FxResult<()> {
        if self.fail_on == Some(seq.0) {
            return Err(FxError::sink("disk full"));
        }
        self.log.push(format!("{}:{}", self.name, seq.0));
        Ok(())
    }

    fn end(&mut self) -> FxResult<()> {
        self.log.push(format!("{}:end", self.name));
        Ok(())
    }
}

struct LoggedModel {
    inner: FixedModel,
    log: Log,
}

impl LandmarkModel for LoggedModel {
    fn name(&self) -> &str {
        "logged"
    }

    fn detect(&mut self, frame: &Frame) -> FxResult<Vec<Detection>> {
        self.inner.detect(frame)
    }
}

impl Drop for LoggedModel {
    fn drop(&mut self) {
        self.log.push("detector");
    }
}

fn opts() -> PipelineOpts {
    PipelineOpts {
        width: 8,
        height: 8,
        ..PipelineOpts::default()
    }
}

fn sink(name: &str, log: &Log) -> Box<dyn FrameSink> {
    Box::new(LoggedSink {
        name: name.into(),
        log: log.clone(),
        fail_on: None,
    })
}

#[test]
fn tick_requires_start() {
    let mut p = Pipeline::new(opts(), EffectChain::new()).unwrap();
    assert!(p.tick().is_err());
    p.start().unwrap();
    p.stop();
    assert!(p.tick().is_err());
    assert!(p.start().is_err());
}

#[test]
fn empty_report_starts_at_first_sequence() {
    let r = CycleReport::default();
    assert_eq!(r.seq, FrameSeq(0));
    assert!(!r.published && !r.passthrough && !r.source_ended);
    assert!(r.detached_sinks.is_empty());
}

#[test]
fn frames_are_processed_and_resampled_to_working_size() {
    let mut chain = EffectChain::new();
    chain.push(Effect::new(EffectKind::Grayscale));
    let preview = PreviewSink::new();
    let mut p = Pipeline::new(opts(), chain)
        .unwrap()
        .with_source(Box::new(SyntheticSource::new(32, 32)))
        .with_sink(Box::new(preview.clone()));
    p.start().unwrap();
    let report = p.tick().unwrap();
    assert!(report.published && !report.passthrough);
    assert_eq!(report.chain.applied, 1);

    let out = preview.latest().unwrap();
    assert_eq!((out.width, out.height), (8, 8));
    for px in out.data.chunks_exact(4) {
        assert!(px[0] == px[1] && px[1] == px[2], "{px:?}");
    }
}

#[test]
fn unavailable_source_publishes_passthrough_and_reports() {
    let mut chain = EffectChain::new();
    chain.push(Effect::new(EffectKind::Grayscale));
    let preview = PreviewSink::new();
    let source = FlakySource {
        script: vec![false, true, false, false, true],
        next: 0,
    };
    let mut p = Pipeline::new(opts(), chain)
        .unwrap()
        .with_source(Box::new(source))
        .with_sink(Box::new(preview.clone()));
    p.start().unwrap();

    let first = p.tick().unwrap();
    assert!(first.passthrough && first.published);
    // Nothing captured yet: blank working-size frame, untouched by effects.
    assert_eq!(preview.latest().unwrap().pixel(0, 0), [0, 0, 0, 0]);

    let second = p.tick().unwrap();
    assert!(!second.passthrough);
    let gray = preview.latest().unwrap().pixel(0, 0);

    let third = p.tick().unwrap();
    assert!(third.passthrough);
    // Last good input, unprocessed.
    assert_eq!(preview.latest().unwrap().pixel(0, 0), [200, 100, 50, 255]);
    assert_ne!(gray, [200, 100, 50, 255]);
    p.tick().unwrap();
    p.tick().unwrap();

    assert_eq!(p.stats().passthrough_frames, 3);
    assert_eq!(p.stats().frames, 5);
    let messages: Vec<&str> = p
        .status()
        .entries()
        .filter(|e| e.component == Component::Source)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(messages.len(), 4);
    assert!(messages[0].contains("camera busy"));
    assert_eq!(messages[1], "source recovered");
}

#[test]
fn failing_sink_is_detached_and_preview_continues() {
    let log = Log::default();
    let preview = PreviewSink::new();
    let bad = Box::new(LoggedSink {
        name: "recorder".into(),
        log: log.clone(),
        fail_on: Some(1),
    });
    let mut p = Pipeline::new(opts(), EffectChain::new())
        .unwrap()
        .with_source(Box::new(SyntheticSource::new(8, 8)))
        .with_sink(bad)
        .with_sink(Box::new(preview.clone()));
    p.start().unwrap();
    p.tick().unwrap();
    let report = p.tick().unwrap();
    assert_eq!(report.detached_sinks, vec!["recorder".to_owned()]);
    p.tick().unwrap();

    assert_eq!(p.sink_names(), vec!["preview".to_owned()]);
    assert_eq!(
        log.entries(),
        vec!["recorder:begin", "recorder:0", "recorder:end"]
    );
    assert!(p.status().mentions(&Component::Sink("recorder".into())));
    assert_eq!(p.stats().sink_failures, 1);
    assert!(preview.latest().is_some());
}

#[test]
fn stop_runs_in_order_and_is_idempotent() {
    let log = Log::default();
    let mut chain = EffectChain::new();
    let snow = chain.push(Effect::new(EffectKind::Snow));
    let source = LoggedSource {
        inner: SyntheticSource::new(8, 8),
        log: log.clone(),
    };
    let mut p = Pipeline::new(opts(), chain)
        .unwrap()
        .with_source(Box::new(source))
        .with_sink(sink("out", &log));
    p.start_tracker(Box::new(LoggedModel {
        inner: FixedModel::new(vec![Rect::new(0.2, 0.2, 0.8, 0.8)]),
        log: log.clone(),
    }))
    .unwrap();
    p.start().unwrap();

    let t0 = Instant::now();
    for i in 0..5 {
        p.tick_at(t0 + Duration::from_millis(33 * i)).unwrap();
    }
    assert!(p.chain().get(snow).and_then(Effect::particle_count).unwrap() > 0);

    p.stop();
    p.stop();
    assert_eq!(p.state(), RunState::Stopped);
    assert_eq!(p.chain().get(snow).and_then(Effect::particle_count), Some(0));
    assert!(p.tracker().is_none());

    let entries = log.entries();
    let pos = |s: &str| entries.iter().position(|e| e == s).unwrap();
    assert!(pos("capture") < pos("detector"));
    assert!(pos("detector") < pos("out:end"));
    assert_eq!(entries.iter().filter(|e| *e == "out:end").count(), 1);
}

#[test]
fn handle_commands_apply_at_next_cycle() {
    let mut p = Pipeline::new(opts(), EffectChain::new())
        .unwrap()
        .with_source(Box::new(SyntheticSource::new(8, 8)));
    let handle = p.chain_handle();
    p.start().unwrap();

    let id = handle.push(Effect::new(EffectKind::Vintage)).unwrap();
    assert!(p.chain().is_empty());
    let report = p.tick().unwrap();
    assert_eq!(report.commands, 1);
    assert_eq!(report.chain.applied, 1);
    assert_eq!(p.chain().ids(), vec![id]);

    handle.set_intensity(id, 0.0).unwrap();
    let report = p.tick().unwrap();
    assert_eq!(report.chain.applied, 0);
}

#[test]
fn auto_disabled_effects_surface_in_status() {
    let mut chain = EffectChain::new();
    let mut bad = Effect::new(EffectKind::Custom);
    bad.set_param("g", "1 / (r - r)").unwrap();
    chain.push(bad);
    let mut p = Pipeline::new(
        PipelineOpts {
            failure_limit: 2,
            ..opts()
        },
        chain,
    )
    .unwrap()
    .with_source(Box::new(SyntheticSource::new(8, 8)));
    p.start().unwrap();
    assert_eq!(p.tick().unwrap().chain.failures.len(), 1);
    assert_eq!(p.tick().unwrap().chain.auto_disabled.len(), 1);
    assert!(p.tick().unwrap().chain.is_clean());
    assert_eq!(p.stats().effect_failures, 2);
    assert!(p.status().mentions(&Component::Effect("custom".into())));
}

#[test]
fn run_until_source_ends() {
    let log = Log::default();
    let frames = vec![Frame::new(8, 8); 3];
    let mut p = Pipeline::new(opts(), EffectChain::new())
        .unwrap()
        .with_source(Box::new(FrameListSource::new(frames)))
        .with_sink(sink("mem", &log));
    let stats = p.run(None).unwrap();
    assert_eq!(stats.frames, 3);
    assert_eq!(p.state(), RunState::Stopped);
    assert_eq!(
        log.entries(),
        vec!["mem:begin", "mem:0", "mem:1", "mem:2", "mem:end"]
    );
}

#[test]
fn run_respects_frame_limit() {
    let mut p = Pipeline::new(opts(), EffectChain::new())
        .unwrap()
        .with_source(Box::new(SyntheticSource::new(8, 8)));
    assert_eq!(p.run(Some(4)).unwrap().frames, 4);
    assert!(
        Pipeline::new(opts(), EffectChain::new())
            .unwrap()
            .run(None)
            .is_err()
    );
}
