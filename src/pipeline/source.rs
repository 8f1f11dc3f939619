//! Frame sources feeding the scheduler.

use crate::foundation::core::FrameSize;
use crate::foundation::error::{FxError, FxResult};
use crate::surface::frame::Frame;
use std::path::Path;

/// A capture device or stand-in.
///
/// `Ok(None)` means the source is exhausted and the pipeline should wind down.
/// [`FxError::ResourceUnavailable`] is a transient condition: the scheduler publishes a
/// pass-through frame and keeps polling.
pub trait FrameSource: Send {
    fn name(&self) -> &str;

    fn next_frame(&mut self) -> FxResult<Option<Frame>>;

    /// Release the device. Called once when the pipeline stops.
    fn stop(&mut self) {}
}

/// Resample `frame` to `size` unless it already matches.
pub fn fit_to(frame: Frame, size: FrameSize) -> FxResult<Frame> {
    if frame.size() == size {
        return Ok(frame);
    }
    if frame.is_empty() {
        return Err(FxError::unavailable("source produced an empty frame"));
    }
    frame.resized(size.width, size.height)
}

/// Animated test pattern: a gradient, a sweeping bar and a skin-toned face block.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    size: FrameSize,
    index: u64,
    limit: Option<u64>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: FrameSize::new(width, height),
            index: 0,
            limit: None,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Pattern for frame `index`; deterministic.
    pub fn render(&self, index: u64) -> Frame {
        let FrameSize { width: w, height: h } = self.size;
        let mut frame = Frame::new(w, h);
        if frame.is_empty() {
            return frame;
        }
        let bar_w = (w / 16).max(1);
        let bar_x = ((index * 4) % u64::from(w)) as u32;
        let (fx0, fx1) = (w * 3 / 8, w * 5 / 8);
        let (fy0, fy1) = (h / 5, h * 3 / 5);
        for y in 0..h {
            for x in 0..w {
                let px = if x >= bar_x && x < bar_x + bar_w {
                    [235, 235, 235, 255]
                } else if (fx0..fx1).contains(&x) && (fy0..fy1).contains(&y) {
                    [224, 172, 140, 255]
                } else {
                    [
                        20,
                        (30 + x * 180 / w) as u8,
                        (40 + y * 180 / h) as u8,
                        255,
                    ]
                };
                frame.set_pixel(x, y, px);
            }
        }
        frame
    }
}

impl FrameSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn next_frame(&mut self) -> FxResult<Option<Frame>> {
        if self.limit.is_some_and(|l| self.index >= l) {
            return Ok(None);
        }
        let frame = self.render(self.index);
        self.index += 1;
        Ok(Some(frame))
    }
}

/// Repeats one image.
#[derive(Clone, Debug)]
pub struct StillSource {
    frame: Frame,
    limit: Option<u64>,
    served: u64,
}

impl StillSource {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            limit: None,
            served: 0,
        }
    }

    pub fn open(path: &Path) -> FxResult<Self> {
        Ok(Self::new(Frame::load(path)?))
    }

    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }
}

impl FrameSource for StillSource {
    fn name(&self) -> &str {
        "still"
    }

    fn next_frame(&mut self) -> FxResult<Option<Frame>> {
        if self.limit.is_some_and(|l| self.served >= l) {
            return Ok(None);
        }
        self.served += 1;
        Ok(Some(self.frame.clone()))
    }
}

/// Plays a list of frames once, or forever when looping.
#[derive(Clone, Debug, Default)]
pub struct FrameListSource {
    frames: Vec<Frame>,
    next: usize,
    looping: bool,
}

impl FrameListSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            next: 0,
            looping: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }
}

impl FrameSource for FrameListSource {
    fn name(&self) -> &str {
        "frame-list"
    }

    fn next_frame(&mut self) -> FxResult<Option<Frame>> {
        if self.next >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            self.next = 0;
        }
        let frame = self.frames[self.next].clone();
        self.next += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/source.rs"]
mod tests;
