use crate::audio::feed::{AudioFeed, PcmSource};
use crate::chain::command::ChainHandle;
use crate::chain::{ChainReport, EffectChain};
use crate::detect::model::LandmarkModel;
use crate::detect::tracker::LandmarkTracker;
use crate::effects::context::FrameContext;
use crate::foundation::core::FrameSeq;
use crate::foundation::error::{FxError, FxResult};
use crate::pipeline::opts::PipelineOpts;
use crate::pipeline::source::{FrameSource, fit_to};
use crate::pipeline::stats::{Component, PipelineStats, PipelineStatus};
use crate::sink::{FrameSink, SinkConfig};
use crate::surface::frame::Frame;
use crate::surface::painter::Painter;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

/// Outcome of one [`Pipeline::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub seq: FrameSeq,
    /// Chain commands applied at the start of the cycle.
    pub commands: usize,
    /// A frame went out to the sinks.
    pub published: bool,
    /// The published frame is the unprocessed fallback (source unavailable).
    pub passthrough: bool,
    /// The source is exhausted; nothing was published.
    pub source_ended: bool,
    pub chain: ChainReport,
    /// Sinks detached this cycle after failing.
    pub detached_sinks: Vec<String>,
}

/// Cooperative single-threaded frame loop: capture, process, publish.
///
/// Analysis workers (landmarks, audio) run on their own threads and are only read through their
/// latest snapshots; nothing in [`Pipeline::tick`] waits on them.
pub struct Pipeline {
    opts: PipelineOpts,
    chain: EffectChain,
    source: Option<Box<dyn FrameSource>>,
    sinks: Vec<Box<dyn FrameSink>>,
    tracker: Option<LandmarkTracker>,
    audio: Option<AudioFeed>,
    painter: Painter,
    input: Frame,
    frame: Frame,
    seq: FrameSeq,
    started: Option<Instant>,
    last_tick: Option<Instant>,
    state: RunState,
    source_down: bool,
    detector_reported: bool,
    audio_reported: bool,
    stats: PipelineStats,
    status: PipelineStatus,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("state", &self.state)
            .field("seq", &self.seq)
            .field("chain", &self.chain)
            .field("source", &self.source.as_ref().map(|s| s.name().to_owned()))
            .field("sinks", &self.sink_names())
            .field("tracker", &self.tracker)
            .field("audio", &self.audio)
            .finish()
    }
}

impl Pipeline {
    pub fn new(opts: PipelineOpts, chain: EffectChain) -> FxResult<Self> {
        opts.validate()?;
        let chain = chain.with_failure_limit(opts.failure_limit);
        let (w, h) = (opts.width, opts.height);
        Ok(Self {
            opts,
            chain,
            source: None,
            sinks: Vec::new(),
            tracker: None,
            audio: None,
            painter: Painter::new(),
            input: Frame::new(w, h),
            frame: Frame::new(w, h),
            seq: FrameSeq(0),
            started: None,
            last_tick: None,
            state: RunState::Idle,
            source_down: false,
            detector_reported: false,
            audio_reported: false,
            stats: PipelineStats::default(),
            status: PipelineStatus::default(),
        })
    }

    pub fn with_source(mut self, source: Box<dyn FrameSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Attach a sink. Sinks added while running start immediately.
    pub fn add_sink(&mut self, mut sink: Box<dyn FrameSink>) -> FxResult<()> {
        if self.state == RunState::Running {
            sink.begin(self.sink_config())?;
        }
        self.sinks.push(sink);
        Ok(())
    }

    /// Start landmark tracking with the configured interval and staleness window.
    pub fn start_tracker(&mut self, model: Box<dyn LandmarkModel>) -> FxResult<()> {
        if let Some(mut old) = self.tracker.take() {
            old.stop();
        }
        self.tracker = Some(LandmarkTracker::start(model, self.opts.detection)?);
        self.detector_reported = false;
        Ok(())
    }

    /// Start audio analysis of `source`, paced in real time when the pipeline is.
    pub fn start_audio(&mut self, source: Box<dyn PcmSource>) -> FxResult<()> {
        if let Some(mut old) = self.audio.take() {
            old.stop();
        }
        self.audio = Some(AudioFeed::start(source, self.opts.audio, self.opts.realtime)?);
        self.audio_reported = false;
        Ok(())
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    pub fn chain(&self) -> &EffectChain {
        &self.chain
    }

    /// Direct chain access for the thread driving the loop.
    pub fn chain_mut(&mut self) -> &mut EffectChain {
        &mut self.chain
    }

    /// Handle for mutating the chain from other threads; commands land at the next cycle.
    pub fn chain_handle(&self) -> ChainHandle {
        self.chain.handle()
    }

    pub fn tracker(&self) -> Option<&LandmarkTracker> {
        self.tracker.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioFeed> {
        self.audio.as_ref()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.iter().map(|s| s.name().to_owned()).collect()
    }

    /// The most recently published frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.opts.width,
            height: self.opts.height,
            fps: self.opts.fps,
        }
    }

    /// Begin every sink. Sinks that fail to start are detached and reported.
    pub fn start(&mut self) -> FxResult<()> {
        match self.state {
            RunState::Running => return Ok(()),
            RunState::Stopped => {
                return Err(FxError::validation("pipeline already stopped"));
            }
            RunState::Idle => {}
        }
        let cfg = self.sink_config();
        let mut kept = Vec::with_capacity(self.sinks.len());
        for mut sink in self.sinks.drain(..) {
            match sink.begin(cfg) {
                Ok(()) => kept.push(sink),
                Err(e) => {
                    self.stats.sink_failures += 1;
                    self.status
                        .push(self.seq, Component::Sink(sink.name().to_owned()), e.to_string());
                }
            }
        }
        self.sinks = kept;
        self.state = RunState::Running;
        tracing::info!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            effects = self.chain.len(),
            sinks = self.sinks.len(),
            "pipeline started"
        );
        Ok(())
    }

    pub fn tick(&mut self) -> FxResult<CycleReport> {
        self.tick_at(Instant::now())
    }

    /// Run one cycle as if the wall clock read `now`.
    #[tracing::instrument(level = "trace", skip_all, fields(seq = self.seq.0))]
    pub fn tick_at(&mut self, now: Instant) -> FxResult<CycleReport> {
        if self.state != RunState::Running {
            return Err(FxError::validation("pipeline is not running"));
        }
        let cycle_start = Instant::now();
        let mut report = CycleReport {
            seq: self.seq,
            commands: self.chain.drain_commands(),
            ..CycleReport::default()
        };

        match self.capture() {
            Ok(true) => {}
            Ok(false) => {
                report.source_ended = true;
                return Ok(report);
            }
            Err(e) => {
                if !self.source_down {
                    self.status.push(self.seq, Component::Source, e.to_string());
                    self.source_down = true;
                }
                report.passthrough = true;
            }
        }
        self.poll_workers();

        let started = *self.started.get_or_insert(now);
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);

        self.frame.clone_from(&self.input);
        if !report.passthrough {
            if let Some(tracker) = &mut self.tracker {
                tracker.submit(&self.input, now);
            }
            let detections = self.tracker.as_ref().and_then(|t| t.latest_fresh(now));
            let spectrum = self.audio.as_ref().and_then(AudioFeed::latest);
            let mut ctx = FrameContext::new(&mut self.painter)
                .with_seq(self.seq)
                .with_dt(dt)
                .with_elapsed(now.saturating_duration_since(started))
                .with_max_dt(self.opts.max_dt())
                .with_audio(spectrum.as_deref())
                .with_detections(detections.as_deref());
            report.chain = self.chain.process(&mut self.frame, &mut ctx);
            self.stats.effect_failures += report.chain.failures.len() as u64;
            for id in &report.chain.auto_disabled {
                let name = self.chain.get(*id).map_or("unknown", |fx| fx.name());
                self.status.push(
                    self.seq,
                    Component::Effect(name.to_owned()),
                    format!("{id} disabled after repeated failures"),
                );
            }
        } else {
            self.stats.passthrough_frames += 1;
        }

        report.detached_sinks = self.publish();
        report.published = true;
        self.stats.record_cycle(dt, cycle_start.elapsed());
        self.seq = self.seq.next();
        Ok(report)
    }

    /// Pull the next frame into the input buffer. `Ok(false)` when the source is exhausted.
    fn capture(&mut self) -> FxResult<bool> {
        let Some(source) = self.source.as_mut() else {
            return Err(FxError::unavailable("no frame source attached"));
        };
        let Some(raw) = source.next_frame()? else {
            return Ok(false);
        };
        self.input = fit_to(raw, self.opts.working_size())?;
        if self.source_down {
            self.status.push(self.seq, Component::Source, "source recovered");
            self.source_down = false;
        }
        Ok(true)
    }

    fn poll_workers(&mut self) {
        if !self.detector_reported
            && let Some(msg) = self.tracker.as_ref().and_then(LandmarkTracker::failure)
        {
            self.status.push(self.seq, Component::Detector, msg.as_str());
            self.detector_reported = true;
        }
        if !self.audio_reported
            && let Some(msg) = self.audio.as_ref().and_then(AudioFeed::failure)
        {
            self.status.push(self.seq, Component::Audio, msg.as_str());
            self.audio_reported = true;
        }
    }

    /// Push the current frame to every sink, detaching the ones that fail.
    fn publish(&mut self) -> Vec<String> {
        let mut detached = Vec::new();
        let (seq, frame) = (self.seq, &self.frame);
        let status = &mut self.status;
        let stats = &mut self.stats;
        self.sinks.retain_mut(|sink| match sink.push_frame(seq, frame) {
            Ok(()) => true,
            Err(e) => {
                let name = sink.name().to_owned();
                tracing::warn!(sink = %name, error = %e, "sink failed, detached");
                if let Err(end_err) = sink.end() {
                    tracing::debug!(sink = %name, error = %end_err, "detached sink did not end cleanly");
                }
                stats.sink_failures += 1;
                status.push(seq, Component::Sink(name.clone()), e.to_string());
                detached.push(name);
                false
            }
        });
        detached
    }

    /// Start if needed, then tick until the source ends or `max_frames` frames are published,
    /// and stop.
    pub fn run(&mut self, max_frames: Option<u64>) -> FxResult<PipelineStats> {
        if self.source.is_none() && max_frames.is_none() {
            return Err(FxError::validation(
                "running without a source needs a frame limit",
            ));
        }
        self.start()?;
        let budget = self.opts.frame_budget();
        let mut published = 0u64;
        while max_frames.is_none_or(|max| published < max) {
            let cycle_start = Instant::now();
            let report = self.tick()?;
            if report.source_ended {
                break;
            }
            published += 1;
            if self.opts.realtime {
                let spent = cycle_start.elapsed();
                if spent < budget {
                    std::thread::sleep(budget - spent);
                }
            }
        }
        self.stop();
        Ok(self.stats.clone())
    }

    /// Stop capture, release effect resources, stop analysis workers, then end the sinks.
    ///
    /// Idempotent. Sink `end` failures are recorded in [`Pipeline::status`].
    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        if let Some(mut source) = self.source.take() {
            source.stop();
        }
        self.chain.release();
        self.painter.release();
        if let Some(mut tracker) = self.tracker.take() {
            tracker.stop();
        }
        if let Some(mut audio) = self.audio.take() {
            audio.stop();
        }
        if self.state == RunState::Running {
            for mut sink in self.sinks.drain(..) {
                if let Err(e) = sink.end() {
                    self.stats.sink_failures += 1;
                    self.status
                        .push(self.seq, Component::Sink(sink.name().to_owned()), e.to_string());
                }
            }
        }
        self.sinks.clear();
        self.state = RunState::Stopped;
        tracing::info!(
            frames = self.stats.frames,
            fps = self.stats.fps,
            effect_failures = self.stats.effect_failures,
            "pipeline stopped"
        );
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/scheduler.rs"]
mod tests;
