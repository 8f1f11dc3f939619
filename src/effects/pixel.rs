//! Per-pixel transforms. Each kernel computes the full-strength result and blends it into the
//! frame at the effect intensity; alpha is never touched.

use crate::effects::kind::EffectKind;
use crate::effects::params::ParamMap;
use crate::foundation::core::Rgb;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::{luma, mix_channel};
use crate::surface::composite::mix_in_place;
use crate::surface::frame::Frame;
use crate::surface::mask::sobel_magnitude;
use rand::Rng as _;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];
const NEON_GAIN: [f32; 3] = [1.3, 1.7, 2.2];
const NEON_LIFT: [f32; 3] = [30.0, 50.0, 80.0];
const GLITCH_ROWS: usize = 5;
const GLITCH_MAX_SLICE: u32 = 20;

pub(crate) fn apply(
    kind: EffectKind,
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
) -> FxResult<()> {
    if frame.is_empty() {
        return Ok(());
    }
    match kind {
        EffectKind::Grayscale => {
            map_rgb(frame, intensity, |[r, g, b]| {
                let y = luma(r, g, b);
                [y, y, y]
            });
            Ok(())
        }
        EffectKind::Brightness => {
            let brightness = params.f32_or("brightness", 0.0);
            let contrast = params.f32_or("contrast", 0.0) + 1.0;
            map_rgb(frame, intensity, |px| {
                px.map(|c| (f32::from(c) - 128.0) * contrast + 128.0 + brightness)
            });
            Ok(())
        }
        EffectKind::ColorTint => {
            let tint = params.color_or("color", Rgb::new(255, 200, 150));
            let k = [tint.r, tint.g, tint.b].map(|c| f32::from(c) / 255.0);
            map_rgb(frame, intensity, |[r, g, b]| {
                [
                    f32::from(r) * k[0],
                    f32::from(g) * k[1],
                    f32::from(b) * k[2],
                ]
            });
            Ok(())
        }
        EffectKind::NeonGlow => {
            let tint = params.color_or("color", Rgb::WHITE);
            let t = [tint.r, tint.g, tint.b].map(|c| f32::from(c) / 255.0);
            map_rgb(frame, intensity, |px| {
                let mut out = [0.0; 3];
                for c in 0..3 {
                    out[c] = (f32::from(px[c]) * NEON_GAIN[c] + NEON_LIFT[c] * t[c]).min(255.0);
                }
                out
            });
            Ok(())
        }
        EffectKind::Vintage => {
            map_rgb(frame, intensity, |[r, g, b]| {
                let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
                SEPIA.map(|m| m[0] * r + m[1] * g + m[2] * b)
            });
            Ok(())
        }
        EffectKind::FilmGrain => {
            let amount = params.f32_or("amount", 0.1) * 255.0;
            let mut rng = rand::rng();
            map_rgb(frame, intensity, |px| {
                let noise = (rng.random::<f32>() - 0.5) * 2.0 * amount;
                px.map(|c| f32::from(c) + noise)
            });
            Ok(())
        }
        EffectKind::Pixelate => pixelate(frame, params, intensity),
        EffectKind::EdgeDetect => edge_detect(frame, params, intensity),
        EffectKind::RgbSplit => rgb_split(frame, params, intensity),
        EffectKind::Glitch => glitch(frame, params, intensity),
        EffectKind::Mirror => mirror(frame, params, intensity),
        other => Err(FxError::effect(format!("{other} is not a pixel effect"))),
    }
}

/// Apply `f` to every pixel's colour channels and mix the unrounded result in.
fn map_rgb(frame: &mut Frame, intensity: f32, mut f: impl FnMut([u8; 3]) -> [f32; 3]) {
    let i = intensity.clamp(0.0, 1.0);
    for px in frame.data.chunks_exact_mut(4) {
        let out = f([px[0], px[1], px[2]]);
        for c in 0..3 {
            px[c] = mix_channel(px[c], out[c], i);
        }
    }
}

/// Block side used at a given intensity. Never below 2.
pub fn pixel_block_size(block_size: f32, intensity: f32) -> u32 {
    ((block_size * intensity).floor() as u32).max(2)
}

fn pixelate(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let n = pixel_block_size(params.f32_or("blockSize", 10.0), intensity);
    let (w, h) = (frame.width, frame.height);
    let mut out = frame.data.clone();
    for by in (0..h).step_by(n as usize) {
        for bx in (0..w).step_by(n as usize) {
            let x1 = (bx + n).min(w);
            let y1 = (by + n).min(h);
            let mut sum = [0u64; 3];
            for y in by..y1 {
                for x in bx..x1 {
                    let i = frame.index(x, y);
                    for c in 0..3 {
                        sum[c] += u64::from(frame.data[i + c]);
                    }
                }
            }
            let count = u64::from((x1 - bx) * (y1 - by));
            let avg = sum.map(|s| (s / count) as u8);
            for y in by..y1 {
                for x in bx..x1 {
                    let i = frame.index(x, y);
                    out[i..i + 3].copy_from_slice(&avg);
                }
            }
        }
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

fn edge_detect(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let threshold = params.f32_or("threshold", 50.0);
    let invert = params.bool_or("invert", false);
    let (edge, background) = if invert { (0u8, 255u8) } else { (255, 0) };
    let mag = sobel_magnitude(frame);
    let mut out = frame.data.clone();
    for (px, m) in out.chunks_exact_mut(4).zip(mag) {
        let v = if m > threshold { edge } else { background };
        px[..3].fill(v);
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

fn rgb_split(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let amount = params.f32_or("amount", 5.0) * intensity;
    let angle = params.f32_or("angle", 0.0).to_radians();
    let dx = (angle.cos() * amount).round() as i64;
    let dy = (angle.sin() * amount).round() as i64;
    if dx == 0 && dy == 0 {
        return Ok(());
    }
    let mut out = frame.data.clone();
    for y in 0..frame.height {
        for x in 0..frame.width {
            let (xi, yi) = (i64::from(x), i64::from(y));
            let i = frame.index(x, y);
            out[i] = frame.pixel_clamped(xi + dx, yi + dy)[0];
            out[i + 2] = frame.pixel_clamped(xi - dx, yi - dy)[2];
        }
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

fn glitch(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let frequency = params.f32_or("frequency", 0.1);
    let amount = params.f32_or("amount", 20.0) * intensity;
    let mut rng = rand::rng();
    if rng.random::<f32>() >= frequency * intensity {
        return Ok(());
    }
    let (w, h) = (frame.width, frame.height);
    let shifts: [i64; 3] =
        std::array::from_fn(|_| (rng.random::<f32>() * amount - amount / 2.0).round() as i64);
    let mut out = frame.data.clone();
    for y in 0..h {
        for x in 0..w {
            let i = frame.index(x, y);
            for c in 0..3 {
                out[i + c] = frame.pixel_clamped(i64::from(x) + shifts[c], i64::from(y))[c];
            }
        }
    }

    let row_len = w as usize * 4;
    let mut row = vec![0u8; row_len];
    for _ in 0..GLITCH_ROWS {
        let y0 = rng.random_range(0..h);
        let slice = rng.random_range(1..=GLITCH_MAX_SLICE);
        let shift = (rng.random::<f32>() * 2.0 * amount - amount).floor() as i64;
        for y in y0..(y0 + slice).min(h) {
            let start = y as usize * row_len;
            row.copy_from_slice(&out[start..start + row_len]);
            for x in 0..w as usize {
                let sx = (x as i64 + shift).clamp(0, i64::from(w) - 1) as usize;
                out[start + x * 4..start + x * 4 + 3].copy_from_slice(&row[sx * 4..sx * 4 + 3]);
            }
        }
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

fn mirror(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let horizontal = params.bool_or("horizontal", true);
    let vertical = params.bool_or("vertical", false);
    if !horizontal && !vertical {
        return Ok(());
    }
    let (w, h) = (frame.width, frame.height);
    let mut out = frame.data.clone();
    for y in 0..h {
        let sy = if vertical { h - 1 - y } else { y };
        for x in 0..w {
            let sx = if horizontal { w - 1 - x } else { x };
            let (i, s) = (frame.index(x, y), frame.index(sx, sy));
            out[i..i + 3].copy_from_slice(&frame.data[s..s + 3]);
        }
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/pixel.rs"]
mod tests;
