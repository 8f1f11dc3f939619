use crate::foundation::core::{FrameSize, Rect};
use crate::foundation::error::{FxError, FxResult};
use std::path::Path;

/// One raster frame: straight-alpha RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Transparent black frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; FrameSize::new(width, height).byte_len()],
        }
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut f = Self::new(width, height);
        f.fill(rgba);
        f
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> FxResult<Self> {
        if data.len() != FrameSize::new(width, height).byte_len() {
            return Err(FxError::validation(format!(
                "frame data length {} does not match {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode any format supported by `image` into a frame.
    pub fn load(path: &Path) -> FxResult<Self> {
        let img = image::open(path).map_err(|e| {
            FxError::unavailable(format!("failed to decode image '{}': {e}", path.display()))
        })?;
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            data: rgba.into_raw(),
        }
    }

    pub fn to_image(&self) -> FxResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| FxError::validation("frame buffer does not match its dimensions"))
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn same_size(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Pixel with coordinates clamped into the frame.
    #[inline]
    pub fn pixel_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as u32;
        let y = y.clamp(0, i64::from(self.height) - 1) as u32;
        self.pixel(x, y)
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Copy pixels from `src` when both frames have the same size.
    pub fn copy_from(&mut self, src: &Frame) -> FxResult<()> {
        if !self.same_size(src) {
            return Err(FxError::validation(format!(
                "cannot copy {}x{} frame into {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    /// Resample to `width` x `height` with a triangle filter.
    pub fn resized(&self, width: u32, height: u32) -> FxResult<Frame> {
        if self.width == width && self.height == height {
            return Ok(self.clone());
        }
        if width == 0 || height == 0 || self.is_empty() {
            return Ok(Frame::new(width, height));
        }
        let img = self.to_image()?;
        let out = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Ok(Frame {
            width,
            height,
            data: out.into_raw(),
        })
    }
}

/// Integer pixel rectangle `[x0, x1) x [y0, y1)` clipped to a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Clip a floating-point rectangle to `width` x `height`; `None` when nothing remains.
    pub fn clip(rect: Rect, width: u32, height: u32) -> Option<Self> {
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(f64::from(width));
        let y1 = rect.y1.ceil().min(f64::from(height));
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }

    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    pub fn contains(self, x: u32, y: u32) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/frame.rs"]
mod tests;
