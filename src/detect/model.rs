//! Landmark models. Real face-landmark networks live outside this crate; they plug in through
//! [`LandmarkModel`].

use crate::detect::detection::{Detection, Landmarks};
use crate::foundation::core::Rect;
use crate::foundation::error::FxResult;
use crate::surface::frame::Frame;

/// A synchronous detector run on the tracker's worker thread.
pub trait LandmarkModel: Send {
    fn name(&self) -> &str;

    /// Detect faces in `frame`. Coordinates are in `frame` pixels.
    ///
    /// Return [`FxError::ResourceUnavailable`](crate::FxError::ResourceUnavailable) when the
    /// model can no longer run; the tracker then stops and reports it.
    fn detect(&mut self, frame: &Frame) -> FxResult<Vec<Detection>>;
}

/// Reports fixed face boxes given in normalized `0..1` coordinates.
#[derive(Clone, Debug, Default)]
pub struct FixedModel {
    pub faces: Vec<Rect>,
    pub confidence: f32,
}

impl FixedModel {
    pub fn new(faces: Vec<Rect>) -> Self {
        Self {
            faces,
            confidence: 1.0,
        }
    }
}

impl LandmarkModel for FixedModel {
    fn name(&self) -> &str {
        "fixed"
    }

    fn detect(&mut self, frame: &Frame) -> FxResult<Vec<Detection>> {
        let (w, h) = (f64::from(frame.width), f64::from(frame.height));
        Ok(self
            .faces
            .iter()
            .map(|n| {
                let bbox = Rect::new(n.x0 * w, n.y0 * h, n.x1 * w, n.y1 * h);
                Detection::new(bbox, self.confidence).with_landmarks(Landmarks::from_face_box(bbox))
            })
            .collect())
    }
}

/// Skin-tone bounding box heuristic: one face at most, placed over the upper part of the
/// skin-coloured region. Good enough for still images and demos; it is not a face detector.
#[derive(Clone, Debug)]
pub struct SkinToneModel {
    /// Sampling stride in pixels.
    pub stride: u32,
    /// Minimum fraction of sampled pixels that must be skin-coloured.
    pub min_coverage: f32,
}

impl Default for SkinToneModel {
    fn default() -> Self {
        Self {
            stride: 4,
            min_coverage: 0.02,
        }
    }
}

/// Classic RGB skin rule (daylight illumination).
pub fn is_skin(r: u8, g: u8, b: u8) -> bool {
    let (ri, gi, bi) = (i32::from(r), i32::from(g), i32::from(b));
    let max = ri.max(gi).max(bi);
    let min = ri.min(gi).min(bi);
    ri > 95 && gi > 40 && bi > 20 && max - min > 15 && (ri - gi).abs() > 15 && ri > gi && ri > bi
}

impl LandmarkModel for SkinToneModel {
    fn name(&self) -> &str {
        "skin-tone"
    }

    fn detect(&mut self, frame: &Frame) -> FxResult<Vec<Detection>> {
        let stride = self.stride.max(1);
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
        let (mut hits, mut samples) = (0u32, 0u32);
        for y in (0..frame.height).step_by(stride as usize) {
            for x in (0..frame.width).step_by(stride as usize) {
                samples += 1;
                let [r, g, b, _] = frame.pixel(x, y);
                if is_skin(r, g, b) {
                    hits += 1;
                    x0 = x0.min(x);
                    y0 = y0.min(y);
                    x1 = x1.max(x + stride);
                    y1 = y1.max(y + stride);
                }
            }
        }
        if samples == 0 || (hits as f32 / samples as f32) < self.min_coverage {
            return Ok(Vec::new());
        }
        let region = Rect::new(
            f64::from(x0),
            f64::from(y0),
            f64::from(x1.min(frame.width)),
            f64::from(y1.min(frame.height)),
        );
        // Faces are roughly 3:4; keep the top of a taller region (shoulders, arms).
        let face_h = region.height().min(region.width() * 4.0 / 3.0);
        let face = Rect::new(region.x0, region.y0, region.x1, region.y0 + face_h);
        let region_samples = ((region.area() / f64::from(stride * stride)).max(1.0)) as f32;
        let confidence = (hits as f32 / region_samples).clamp(0.0, 1.0);
        Ok(vec![
            Detection::new(face, confidence).with_landmarks(Landmarks::from_face_box(face)),
        ])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/model.rs"]
mod tests;
