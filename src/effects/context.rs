use crate::audio::spectrum::Spectrum;
use crate::detect::detection::DetectionSet;
use crate::foundation::core::FrameSeq;
use crate::surface::painter::Painter;
use std::time::Duration;

/// Upper bound applied to the wall-clock step handed to simulations.
pub const MAX_DT: Duration = Duration::from_millis(250);

/// Per-cycle inputs lent to every effect in the chain.
#[derive(Debug)]
pub struct FrameContext<'a> {
    pub seq: FrameSeq,
    /// Wall-clock time since the previous cycle.
    pub dt: Duration,
    /// Time since the pipeline started.
    pub elapsed: Duration,
    /// Latest spectrum, if an analyzer is running.
    pub audio: Option<&'a Spectrum>,
    /// Latest fresh detections. Stale snapshots are filtered out before they get here.
    pub detections: Option<&'a DetectionSet>,
    pub painter: &'a mut Painter,
    /// Clamp applied by [`FrameContext::dt_secs`].
    pub max_dt: Duration,
}

impl<'a> FrameContext<'a> {
    pub fn new(painter: &'a mut Painter) -> Self {
        Self {
            seq: FrameSeq(0),
            dt: Duration::ZERO,
            elapsed: Duration::ZERO,
            audio: None,
            detections: None,
            painter,
            max_dt: MAX_DT,
        }
    }

    pub fn with_seq(mut self, seq: FrameSeq) -> Self {
        self.seq = seq;
        self
    }

    pub fn with_dt(mut self, dt: Duration) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_audio(mut self, audio: Option<&'a Spectrum>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_detections(mut self, detections: Option<&'a DetectionSet>) -> Self {
        self.detections = detections;
        self
    }

    pub fn with_max_dt(mut self, max_dt: Duration) -> Self {
        self.max_dt = max_dt;
        self
    }

    /// Step in seconds, clamped to `max_dt`.
    pub fn dt_secs(&self) -> f32 {
        self.dt.min(self.max_dt).as_secs_f32()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
