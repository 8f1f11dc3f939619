//! Effects driven by the latest spectrum snapshot. Without a snapshot they draw nothing.

use crate::audio::spectrum::{Spectrum, response_above};
use crate::effects::context::FrameContext;
use crate::effects::kind::EffectKind;
use crate::effects::params::ParamMap;
use crate::foundation::core::{BezPath, Point, Rect, Rgb};
use crate::foundation::error::{FxError, FxResult};
use crate::surface::frame::Frame;
use crate::surface::painter::Pen;
use kurbo::Shape as _;

/// Smoothed bar levels kept between cycles by the visualizer.
#[derive(Debug, Default)]
pub(crate) struct AudioState {
    levels: Vec<f32>,
}

impl AudioState {
    fn smooth(&mut self, bins: &[u8], smoothing: f32) -> &[f32] {
        if self.levels.len() != bins.len() {
            self.levels = bins.iter().map(|&b| f32::from(b)).collect();
        } else {
            let s = smoothing.clamp(0.0, 1.0);
            for (l, &b) in self.levels.iter_mut().zip(bins) {
                *l = s * *l + (1.0 - s) * f32::from(b);
            }
        }
        &self.levels
    }

    pub(crate) fn release(&mut self) {
        self.levels = Vec::new();
    }
}

pub(crate) fn apply(
    kind: EffectKind,
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &mut FrameContext<'_>,
    state: &mut AudioState,
) -> FxResult<()> {
    let Some(spectrum) = ctx.audio else {
        return Ok(());
    };
    if frame.is_empty() || spectrum.frequency.is_empty() {
        return Ok(());
    }
    let (w, h) = (f64::from(frame.width), f64::from(frame.height));
    match kind {
        EffectKind::AudioVisualizer => {
            let levels = state.smooth(&spectrum.frequency, params.f32_or("smoothing", 0.8));
            ctx.painter.draw(frame, |pen| {
                visualizer(pen, params, intensity, levels, spectrum, w, h)
            })
        }
        EffectKind::BassReactive => {
            let strength =
                response_above(spectrum.bass_level(), params.f32_or("threshold", 150.0));
            if strength <= 0.0 {
                return Ok(());
            }
            let color = params.color_or("color", Rgb::new(255, 0, 102));
            let alpha = (strength * 100.0 * intensity).floor() as u8;
            ctx.painter.draw(frame, |pen| {
                pen.glow(Point::new(w / 2.0, h / 2.0), w.max(h) / 2.0, color.with_alpha(alpha), 8);
            })
        }
        EffectKind::VoiceReactive => {
            let strength =
                response_above(spectrum.voice_level(), params.f32_or("threshold", 100.0));
            if strength <= 0.0 {
                return Ok(());
            }
            let color = params.color_or("highlightColor", Rgb::new(0, 255, 255));
            let alpha = (255.0 * intensity).round() as u8;
            let border = Rect::new(5.0, 5.0, w - 5.0, h - 5.0).to_path(0.1);
            ctx.painter.draw(frame, |pen| {
                pen.stroke_path(&border, 10.0 * f64::from(strength), color.with_alpha(alpha));
            })
        }
        other => Err(FxError::effect(format!("{other} is not an audio effect"))),
    }
}

fn visualizer(
    pen: &mut Pen<'_>,
    params: &ParamMap,
    intensity: f32,
    levels: &[f32],
    spectrum: &Spectrum,
    w: f64,
    h: f64,
) {
    let color = params.color_or("color", Rgb::new(0, 255, 136));
    let rgba = color.with_alpha((255.0 * intensity).round() as u8);
    let sensitivity = f64::from(params.f32_or("sensitivity", 1.0));
    let n = levels.len();
    let bar_w = w / n as f64;
    match params.str_or("style", "bars") {
        "waveform" => {
            let wave = &spectrum.waveform;
            if wave.len() < 2 {
                return;
            }
            let slice = w / wave.len() as f64;
            let mut path = BezPath::new();
            for (i, &v) in wave.iter().enumerate() {
                let p = Point::new(i as f64 * slice, f64::from(v) / 128.0 * h / 2.0);
                if i == 0 {
                    path.move_to(p);
                } else {
                    path.line_to(p);
                }
            }
            pen.stroke_path(&path, 3.0, rgba);
        }
        "circle" => {
            let center = Point::new(w / 2.0, h / 2.0);
            let radius = w.min(h) * 0.3;
            let mut path = BezPath::new();
            for (i, &l) in levels.iter().enumerate() {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                let r = radius + f64::from(l) / 255.0 * radius * sensitivity * 0.5;
                let p = Point::new(center.x + a.cos() * r, center.y + a.sin() * r);
                if i == 0 {
                    path.move_to(p);
                } else {
                    path.line_to(p);
                }
            }
            path.close_path();
            pen.stroke_path(&path, 3.0, rgba);
        }
        "spectrum" => {
            for (i, &l) in levels.iter().enumerate() {
                let v = l / 255.0;
                let bar_h = f64::from(v) * h * sensitivity * 0.5;
                let hue = i as f32 / n as f32 * 360.0;
                let alpha = (v * 255.0 * intensity).round() as u8;
                let x = i as f64 * bar_w;
                pen.fill_rect(
                    Rect::new(x, h - bar_h, x + (bar_w - 2.0).max(1.0), h),
                    hue_to_rgb(hue).with_alpha(alpha),
                );
            }
        }
        _ => {
            for (i, &l) in levels.iter().enumerate() {
                let bar_h = f64::from(l) / 255.0 * h * sensitivity * 0.5;
                let x = i as f64 * bar_w;
                pen.fill_rect(
                    Rect::new(x, h - bar_h, x + (bar_w - 2.0).max(1.0), h),
                    rgba,
                );
            }
        }
    }
}

/// Fully saturated, half-lightness colour for `hue` in degrees.
pub fn hue_to_rgb(hue: f32) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let to = |c: f32| (c * 255.0).round() as u8;
    Rgb::new(to(r), to(g), to(b))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/audio.rs"]
mod tests;
