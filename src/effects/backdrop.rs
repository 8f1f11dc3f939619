use crate::effects::params::ParamMap;
use crate::foundation::core::Rgb;
use crate::foundation::error::FxResult;
use crate::surface::blur::box_blur_rgba8;
use crate::surface::frame::Frame;
use std::sync::Arc;

/// Replacement background shared by the keying and segmentation effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BackgroundPolicy {
    Blur,
    Color,
    Image,
    Transparent,
}

impl BackgroundPolicy {
    pub(crate) fn from_params(params: &ParamMap) -> Self {
        match params.str_or("background", "blur") {
            "color" => Self::Color,
            "image" => Self::Image,
            "transparent" => Self::Transparent,
            _ => Self::Blur,
        }
    }
}

/// Background image plus a copy resampled to the current frame size.
#[derive(Debug, Default)]
pub(crate) struct Backdrop {
    source: Option<Arc<Frame>>,
    fitted: Option<Frame>,
}

impl Backdrop {
    pub(crate) fn set(&mut self, image: Option<Arc<Frame>>) {
        self.source = image;
        self.fitted = None;
    }

    /// The image resampled to `width x height`; resampling happens once per size.
    pub(crate) fn fitted(&mut self, width: u32, height: u32) -> FxResult<Option<&Frame>> {
        let Some(src) = self.source.as_ref() else {
            return Ok(None);
        };
        let stale = self
            .fitted
            .as_ref()
            .is_none_or(|f| f.width != width || f.height != height);
        if stale {
            let fitted = if src.width == width && src.height == height {
                (**src).clone()
            } else {
                src.resized(width, height)?
            };
            self.fitted = Some(fitted);
        }
        Ok(self.fitted.as_ref())
    }

    /// Drops the resampled copy; the image itself stays until replaced.
    pub(crate) fn release(&mut self) {
        self.fitted = None;
    }
}

/// Build the replacement layer for `frame` under `policy`.
///
/// `Image` without a loaded image falls back to `Blur`. `Transparent` has no layer.
pub(crate) fn background_layer(
    policy: BackgroundPolicy,
    frame: &Frame,
    params: &ParamMap,
    color_default: Rgb,
    blur_default: f32,
    backdrop: &mut Backdrop,
) -> FxResult<Option<Vec<u8>>> {
    let blur = |frame: &Frame| {
        let radius = params.f32_or("blurAmount", blur_default).round().max(1.0) as u32;
        box_blur_rgba8(&frame.data, frame.width, frame.height, radius)
    };
    match policy {
        BackgroundPolicy::Transparent => Ok(None),
        BackgroundPolicy::Color => {
            let c = params.color_or("backgroundColor", color_default);
            Ok(Some(Frame::filled(frame.width, frame.height, c.with_alpha(255)).data))
        }
        BackgroundPolicy::Image => match backdrop.fitted(frame.width, frame.height)? {
            Some(img) => Ok(Some(img.data.clone())),
            None => {
                tracing::debug!("background image not set, using blur");
                blur(frame).map(Some)
            }
        },
        BackgroundPolicy::Blur => blur(frame).map(Some),
    }
}

/// Scale a foreground mask so that `intensity` 0 keeps the frame and 1 applies the full key.
pub(crate) fn soften_mask(mask: &mut [u8], intensity: f32) {
    let i = intensity.clamp(0.0, 1.0);
    if i >= 1.0 {
        return;
    }
    for m in mask {
        let bg = f32::from(255 - *m) * i;
        *m = 255 - bg.round() as u8;
    }
}
