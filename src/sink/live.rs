use crate::foundation::core::FrameSeq;
use crate::foundation::error::FxResult;
use crate::foundation::snapshot::SnapshotCell;
use crate::sink::{FrameSink, SinkConfig};
use crate::surface::frame::Frame;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Keeps the most recent frame for on-screen display. The last frame stays visible after `end`.
#[derive(Clone, Debug, Default)]
pub struct PreviewSink {
    latest: SnapshotCell<Frame>,
}

impl PreviewSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest.latest()
    }
}

impl FrameSink for PreviewSink {
    fn name(&self) -> &str {
        "preview"
    }

    fn begin(&mut self, _cfg: SinkConfig) -> FxResult<()> {
        self.latest.clear();
        Ok(())
    }

    fn push_frame(&mut self, _seq: FrameSeq, frame: &Frame) -> FxResult<()> {
        self.latest.publish(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> FxResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StreamShared {
    frame: SnapshotCell<(FrameSeq, Frame)>,
    cfg: SnapshotCell<SinkConfig>,
    published: AtomicU64,
}

/// Outbound stream track: a continuously replaced frame reference read by the transport.
#[derive(Debug, Default)]
pub struct StreamSink {
    shared: Arc<StreamShared>,
}

/// Reader side of a [`StreamSink`], cloned into the transport thread.
#[derive(Clone, Debug)]
pub struct StreamHandle {
    shared: Arc<StreamShared>,
}

impl StreamSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> StreamHandle {
        StreamHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl StreamHandle {
    /// Current frame and its sequence number; `None` before the first frame or after the
    /// stream ended.
    pub fn current(&self) -> Option<Arc<(FrameSeq, Frame)>> {
        self.shared.frame.latest()
    }

    /// Track settings, available while the stream is live.
    pub fn config(&self) -> Option<SinkConfig> {
        self.shared.cfg.latest().map(|c| *c)
    }

    pub fn is_live(&self) -> bool {
        !self.shared.cfg.is_empty()
    }

    /// Total frames published since the sink was created.
    pub fn published(&self) -> u64 {
        self.shared.published.load(Ordering::Acquire)
    }
}

impl FrameSink for StreamSink {
    fn name(&self) -> &str {
        "stream"
    }

    fn begin(&mut self, cfg: SinkConfig) -> FxResult<()> {
        self.shared.frame.clear();
        self.shared.cfg.publish(cfg);
        Ok(())
    }

    fn push_frame(&mut self, seq: FrameSeq, frame: &Frame) -> FxResult<()> {
        self.shared.frame.publish((seq, frame.clone()));
        self.shared.published.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn end(&mut self) -> FxResult<()> {
        self.shared.cfg.clear();
        self.shared.frame.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/live.rs"]
mod tests;
