use crate::foundation::core::{Point, Rect, Vec2};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

/// Points of one facial feature.
pub type Cluster = SmallVec<[Point; 20]>;

/// Facial landmark clusters in frame pixel coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Landmarks {
    pub jaw: Cluster,
    pub left_brow: Cluster,
    pub right_brow: Cluster,
    pub nose: Cluster,
    pub left_eye: Cluster,
    pub right_eye: Cluster,
    pub mouth: Cluster,
}

fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

fn arc(center: Point, radii: Vec2, from: f64, to: f64, n: usize) -> Cluster {
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            let a = from + (to - from) * t;
            Point::new(center.x + radii.x * a.cos(), center.y + radii.y * a.sin())
        })
        .collect()
}

impl Landmarks {
    /// Canonical 68-point layout fitted to a face box.
    ///
    /// Used by model stand-ins and tests; real models supply measured points.
    pub fn from_face_box(face: Rect) -> Self {
        let (x, y, w, h) = (face.x0, face.y0, face.width(), face.height());
        let at = |fx: f64, fy: f64| Point::new(x + w * fx, y + h * fy);
        let pi = std::f64::consts::PI;
        let eye_r = Vec2::new(w * 0.09, h * 0.04);
        let eye = |c: Point| arc(c, eye_r, 0.0, 2.0 * pi * 5.0 / 6.0, 6);
        Self {
            jaw: arc(at(0.5, 0.45), Vec2::new(w * 0.5, h * 0.55), pi, 0.0, 17),
            left_brow: (0..5).map(|i| at(0.18 + 0.06 * i as f64, 0.28)).collect(),
            right_brow: (0..5).map(|i| at(0.58 + 0.06 * i as f64, 0.28)).collect(),
            nose: (0..4)
                .map(|i| at(0.5, 0.4 + 0.06 * i as f64))
                .chain((0..5).map(|i| at(0.42 + 0.04 * i as f64, 0.62)))
                .collect(),
            left_eye: eye(at(0.32, 0.4)),
            right_eye: eye(at(0.68, 0.4)),
            mouth: arc(at(0.5, 0.78), Vec2::new(w * 0.18, h * 0.07), 0.0, 2.0 * pi * 19.0 / 20.0, 20),
        }
    }

    pub fn left_eye_center(&self) -> Option<Point> {
        centroid(&self.left_eye)
    }

    pub fn right_eye_center(&self) -> Option<Point> {
        centroid(&self.right_eye)
    }

    /// Eye centres, distance between them and the roll angle (radians) of the eye line.
    pub fn eye_line(&self) -> Option<(Point, Point, f64, f64)> {
        let l = self.left_eye_center()?;
        let r = self.right_eye_center()?;
        let d = r - l;
        Some((l, r, d.hypot(), d.y.atan2(d.x)))
    }

    pub fn mouth_center(&self) -> Option<Point> {
        centroid(&self.mouth)
    }

    pub fn nose_tip(&self) -> Option<Point> {
        self.nose.get(3).copied().or_else(|| self.nose.last().copied())
    }

    /// First, middle and last jaw points.
    pub fn jaw_anchors(&self) -> Option<(Point, Point, Point)> {
        let first = *self.jaw.first()?;
        let last = *self.jaw.last()?;
        let mid = self.jaw[self.jaw.len() / 2];
        Some((first, mid, last))
    }
}

/// One detected face.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: Rect,
    pub confidence: f32,
    pub landmarks: Option<Landmarks>,
}

impl Detection {
    pub fn new(bbox: Rect, confidence: f32) -> Self {
        Self {
            bbox,
            confidence,
            landmarks: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: Landmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }
}

/// Timestamped snapshot published by the landmark tracker.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionSet {
    pub detections: Vec<Detection>,
    pub captured_at: Instant,
    /// Dimensions of the frame the detections refer to.
    pub frame_width: u32,
    pub frame_height: u32,
}

impl DetectionSet {
    pub fn new(detections: Vec<Detection>, frame_width: u32, frame_height: u32) -> Self {
        Self {
            detections,
            captured_at: Instant::now(),
            frame_width,
            frame_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.captured_at)
    }

    pub fn is_stale(&self, now: Instant, max_age: Duration) -> bool {
        self.age(now) > max_age
    }

    /// Detections rescaled to a frame of the given size.
    ///
    /// Snapshots taken on a differently sized frame are mapped proportionally.
    pub fn scaled_to(&self, width: u32, height: u32) -> Vec<Detection> {
        if self.frame_width == width && self.frame_height == height
            || self.frame_width == 0
            || self.frame_height == 0
        {
            return self.detections.clone();
        }
        let sx = f64::from(width) / f64::from(self.frame_width);
        let sy = f64::from(height) / f64::from(self.frame_height);
        let map = |p: Point| Point::new(p.x * sx, p.y * sy);
        let map_cluster = |c: &Cluster| c.iter().map(|p| map(*p)).collect::<Cluster>();
        self.detections
            .iter()
            .map(|d| Detection {
                bbox: Rect::new(d.bbox.x0 * sx, d.bbox.y0 * sy, d.bbox.x1 * sx, d.bbox.y1 * sy),
                confidence: d.confidence,
                landmarks: d.landmarks.as_ref().map(|l| Landmarks {
                    jaw: map_cluster(&l.jaw),
                    left_brow: map_cluster(&l.left_brow),
                    right_brow: map_cluster(&l.right_brow),
                    nose: map_cluster(&l.nose),
                    left_eye: map_cluster(&l.left_eye),
                    right_eye: map_cluster(&l.right_eye),
                    mouth: map_cluster(&l.mouth),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/detection.rs"]
mod tests;
