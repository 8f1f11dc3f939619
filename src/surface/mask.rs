//! Single-channel coverage masks used by the keying and segmentation effects.
//!
//! Masks built here are heuristics (gradient edges, expanded boxes), not real segmentation.

use crate::foundation::math::avg3;
use crate::surface::frame::{Frame, PixelRect};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    /// 0 = background, 255 = foreground.
    pub data: Vec<u8>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize)],
        }
    }

    pub fn from_rect(width: u32, height: u32, rect: PixelRect) -> Self {
        let mut m = Self::new(width, height);
        m.fill_rect(rect, 255);
        m
    }

    pub fn fill_rect(&mut self, rect: PixelRect, value: u8) {
        let x1 = rect.x1.min(self.width);
        let y1 = rect.y1.min(self.height);
        for y in rect.y0..y1 {
            let row = (y as usize) * (self.width as usize);
            for x in rect.x0..x1 {
                let i = row + x as usize;
                self.data[i] = self.data[i].max(value);
            }
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn coverage(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&v| u64::from(v)).sum();
        sum as f32 / (self.data.len() as f32 * 255.0)
    }

    /// Square max-filter of `radius` pixels.
    pub fn dilate(&mut self, radius: u32) {
        if radius == 0 || self.data.is_empty() {
            return;
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let r = radius as usize;
        let mut tmp = vec![0u8; self.data.len()];
        for y in 0..h {
            for x in 0..w {
                let lo = x.saturating_sub(r);
                let hi = (x + r).min(w - 1);
                let row = &self.data[y * w..y * w + w];
                tmp[y * w + x] = row[lo..=hi].iter().copied().max().unwrap_or(0);
            }
        }
        for y in 0..h {
            let lo = y.saturating_sub(r);
            let hi = (y + r).min(h - 1);
            for x in 0..w {
                let mut m = 0u8;
                for yy in lo..=hi {
                    m = m.max(tmp[yy * w + x]);
                }
                self.data[y * w + x] = m;
            }
        }
    }

    /// Outward feather: background pixels within `radius` of the foreground get
    /// `255 * (1 - d/radius)` where `d` is an approximate euclidean distance.
    pub fn feather(&mut self, radius: f32) {
        if radius <= 0.0 || self.data.is_empty() {
            return;
        }
        let dist = self.distance_to_foreground();
        for (v, &d) in self.data.iter_mut().zip(dist.iter()) {
            if d > 0.0 && d < radius {
                let ramp = (255.0 * (1.0 - d / radius)).round() as u8;
                *v = (*v).max(ramp);
            }
        }
    }

    /// Two-pass chamfer transform (1, sqrt 2) from pixels >= 128.
    fn distance_to_foreground(&self) -> Vec<f32> {
        const DIAG: f32 = std::f32::consts::SQRT_2;
        let (w, h) = (self.width as usize, self.height as usize);
        let mut d: Vec<f32> = self
            .data
            .iter()
            .map(|&v| if v >= 128 { 0.0 } else { f32::INFINITY })
            .collect();
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                let mut best = d[i];
                if x > 0 {
                    best = best.min(d[i - 1] + 1.0);
                }
                if y > 0 {
                    best = best.min(d[i - w] + 1.0);
                    if x > 0 {
                        best = best.min(d[i - w - 1] + DIAG);
                    }
                    if x + 1 < w {
                        best = best.min(d[i - w + 1] + DIAG);
                    }
                }
                d[i] = best;
            }
        }
        for y in (0..h).rev() {
            for x in (0..w).rev() {
                let i = y * w + x;
                let mut best = d[i];
                if x + 1 < w {
                    best = best.min(d[i + 1] + 1.0);
                }
                if y + 1 < h {
                    best = best.min(d[i + w] + 1.0);
                    if x + 1 < w {
                        best = best.min(d[i + w + 1] + DIAG);
                    }
                    if x > 0 {
                        best = best.min(d[i + w - 1] + DIAG);
                    }
                }
                d[i] = best;
            }
        }
        d
    }
}

/// Sobel gradient magnitude of the channel average; border pixels are 0.
pub fn sobel_magnitude(frame: &Frame) -> Vec<f32> {
    let (w, h) = (frame.width as usize, frame.height as usize);
    let mut out = vec![0.0f32; w * h];
    if w < 3 || h < 3 {
        return out;
    }
    let gray: Vec<f32> = frame
        .data
        .chunks_exact(4)
        .map(|px| avg3(px[0], px[1], px[2]))
        .collect();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let g = |dx: isize, dy: isize| -> f32 {
                gray[((y as isize + dy) as usize) * w + (x as isize + dx) as usize]
            };
            let gx = -g(-1, -1) - 2.0 * g(-1, 0) - g(-1, 1) + g(1, -1) + 2.0 * g(1, 0) + g(1, 1);
            let gy = -g(-1, -1) - 2.0 * g(0, -1) - g(1, -1) + g(-1, 1) + 2.0 * g(0, 1) + g(1, 1);
            out[y * w + x] = (gx * gx + gy * gy).sqrt();
        }
    }
    out
}

/// Foreground where the Sobel magnitude exceeds `threshold`.
pub fn edge_mask(frame: &Frame, threshold: f32) -> Mask {
    let mag = sobel_magnitude(frame);
    Mask {
        width: frame.width,
        height: frame.height,
        data: mag
            .iter()
            .map(|&m| if m > threshold { 255 } else { 0 })
            .collect(),
    }
}

/// Foreground where the gray value differs from its right or lower neighbour by more than
/// `threshold`.
pub fn neighbour_diff_mask(frame: &Frame, threshold: f32) -> Mask {
    let (w, h) = (frame.width as usize, frame.height as usize);
    let gray: Vec<f32> = frame
        .data
        .chunks_exact(4)
        .map(|px| avg3(px[0], px[1], px[2]))
        .collect();
    let mut m = Mask::new(frame.width, frame.height);
    for y in 0..h {
        for x in 0..w {
            let c = gray[y * w + x];
            let right = if x + 1 < w { gray[y * w + x + 1] } else { c };
            let down = if y + 1 < h { gray[(y + 1) * w + x] } else { c };
            if (c - right).abs() > threshold || (c - down).abs() > threshold {
                m.data[y * w + x] = 255;
            }
        }
    }
    m
}

#[cfg(test)]
#[path = "../../tests/unit/surface/mask.rs"]
mod tests;
