//! Output sinks: where processed frames go.
//!
//! Sinks see each frame by shared reference after the chain has run; they copy what they need
//! and never mutate it.

pub mod ffmpeg;
pub mod live;
pub mod recorder;

use crate::foundation::core::{Fps, FrameSeq};
use crate::foundation::error::FxResult;
use crate::surface::frame::Frame;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use live::{PreviewSink, StreamHandle, StreamSink};
pub use recorder::{PngSequenceSink, RecordingSink};

/// Configuration provided to a [`FrameSink`] when the pipeline starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Sink contract for consuming processed frames.
///
/// `push_frame` is called with strictly increasing [`FrameSeq`] values between `begin` and `end`.
pub trait FrameSink: Send {
    /// Short label used in logs and pipeline status.
    fn name(&self) -> &str;
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FxResult<()>;
    fn push_frame(&mut self, seq: FrameSeq, frame: &Frame) -> FxResult<()>;
    /// Called once after the last frame. Must tolerate being called without frames.
    fn end(&mut self) -> FxResult<()>;
}

/// Collects every frame; for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameSeq, Frame)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(FrameSeq, Frame)] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<(FrameSeq, Frame)> {
        self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn begin(&mut self, cfg: SinkConfig) -> FxResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, seq: FrameSeq, frame: &Frame) -> FxResult<()> {
        self.frames.push((seq, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FxResult<()> {
        self.ended = true;
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn begin(&mut self, cfg: SinkConfig) -> FxResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, seq: FrameSeq, frame: &Frame) -> FxResult<()> {
        (**self).push_frame(seq, frame)
    }

    fn end(&mut self) -> FxResult<()> {
        (**self).end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/mod.rs"]
mod tests;
