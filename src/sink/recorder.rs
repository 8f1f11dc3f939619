use crate::foundation::core::{Fps, FrameSeq};
use crate::foundation::error::{FxError, FxResult};
use crate::sink::ffmpeg::ensure_dir;
use crate::sink::{FrameSink, SinkConfig};
use crate::surface::frame::Frame;
use std::path::{Path, PathBuf};

/// Records every `sample_every`-th frame into an inner container sink.
///
/// The inner sink is told the effective rate (`fps / sample_every`) and receives its own dense
/// sequence numbers.
#[derive(Debug)]
pub struct RecordingSink<S> {
    inner: S,
    sample_every: u32,
    seen: u64,
    written: u64,
}

impl<S: FrameSink> RecordingSink<S> {
    pub fn new(inner: S, sample_every: u32) -> FxResult<Self> {
        if sample_every == 0 {
            return Err(FxError::validation("recorder sample_every must be >= 1"));
        }
        Ok(Self {
            inner,
            sample_every,
            seen: 0,
            written: 0,
        })
    }

    pub fn sample_every(&self) -> u32 {
        self.sample_every
    }

    /// Frames handed to the inner sink so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSink> FrameSink for RecordingSink<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn begin(&mut self, cfg: SinkConfig) -> FxResult<()> {
        self.seen = 0;
        self.written = 0;
        let fps = Fps::new(
            cfg.fps.num,
            cfg.fps.den.saturating_mul(self.sample_every),
        )?;
        self.inner.begin(SinkConfig { fps, ..cfg })
    }

    fn push_frame(&mut self, _seq: FrameSeq, frame: &Frame) -> FxResult<()> {
        let take = self.seen.is_multiple_of(u64::from(self.sample_every));
        self.seen += 1;
        if !take {
            return Ok(());
        }
        self.inner.push_frame(FrameSeq(self.written), frame)?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> FxResult<()> {
        tracing::debug!(sink = self.inner.name(), seen = self.seen, written = self.written, "recording finished");
        self.inner.end()
    }
}

/// Writes `frame_000000.png`, `frame_000001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, seq: FrameSeq) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", seq.0))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn name(&self) -> &str {
        "png-sequence"
    }

    fn begin(&mut self, cfg: SinkConfig) -> FxResult<()> {
        ensure_dir(&self.dir)?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, seq: FrameSeq, frame: &Frame) -> FxResult<()> {
        if self.cfg.is_none() {
            return Err(FxError::sink("png sequence sink not started"));
        }
        let path = self.frame_path(seq);
        frame
            .to_image()?
            .save(&path)
            .map_err(|e| FxError::sink(format!("failed to write '{}': {e}", path.display())))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> FxResult<()> {
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/recorder.rs"]
mod tests;
