//! Whole-frame operations: geometry remaps, keying, temporal blending and mask-driven
//! background treatment.

use crate::effects::backdrop::{Backdrop, BackgroundPolicy, background_layer, soften_mask};
use crate::effects::kind::EffectKind;
use crate::effects::params::ParamMap;
use crate::foundation::core::Rgb;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::mix_channel;
use crate::surface::blur::{gaussian_blur_rgba8, sigma_for_radius};
use crate::surface::composite::{mask_mix_in_place, mix_in_place};
use crate::surface::frame::Frame;
use crate::surface::history::FrameHistory;
use crate::surface::mask::{edge_mask, neighbour_diff_mask};

/// Private state of a surface effect.
#[derive(Debug, Default)]
pub(crate) struct SurfaceState {
    pub(crate) history: Option<FrameHistory>,
    pub(crate) backdrop: Backdrop,
}

impl SurfaceState {
    pub(crate) fn release(&mut self) {
        if let Some(h) = self.history.as_mut() {
            h.release();
        }
        self.backdrop.release();
    }
}

pub(crate) fn apply(
    kind: EffectKind,
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    state: &mut SurfaceState,
) -> FxResult<()> {
    if frame.is_empty() {
        return Ok(());
    }
    match kind {
        EffectKind::Vignette => {
            vignette(frame, params, intensity);
            Ok(())
        }
        EffectKind::Kaleidoscope => kaleidoscope(frame, params, intensity),
        EffectKind::ChromaKey => chroma_key(frame, params, intensity, &mut state.backdrop),
        EffectKind::MotionBlur => motion_blur(frame, params, intensity, state),
        EffectKind::BackgroundBlur => background_blur(frame, params, intensity),
        EffectKind::BackgroundReplace => {
            background_replace(frame, params, intensity, &mut state.backdrop)
        }
        EffectKind::Outline => outline(frame, params, intensity),
        other => Err(FxError::effect(format!("{other} is not a surface effect"))),
    }
}

/// Darkening factor in `[0, strength]` at normalized centre distance `r` (0 centre, 1 corner).
pub fn vignette_darkness(r: f32, size: f32, strength: f32) -> f32 {
    let size = size.clamp(0.0, 0.99);
    ((r - size) / (1.0 - size)).clamp(0.0, 1.0) * strength
}

fn vignette(frame: &mut Frame, params: &ParamMap, intensity: f32) {
    let strength = params.f32_or("strength", 0.5);
    let size = params.f32_or("size", 0.7);
    let cx = frame.width as f32 / 2.0;
    let cy = frame.height as f32 / 2.0;
    let max_d = cx.hypot(cy).max(f32::EPSILON);
    let w = frame.width as usize;
    for (i, px) in frame.data.chunks_exact_mut(4).enumerate() {
        let x = (i % w) as f32 + 0.5;
        let y = (i / w) as f32 + 0.5;
        let k = 1.0 - vignette_darkness((x - cx).hypot(y - cy) / max_d, size, strength);
        for c in 0..3 {
            px[c] = mix_channel(px[c], f32::from(px[c]) * k, intensity);
        }
    }
}

fn kaleidoscope(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let segments = params.u32_or("segments", 6).clamp(2, 12);
    let rotation = params.f32_or("rotation", 0.0).to_radians();
    let zoom = params.f32_or("zoom", 1.0).clamp(0.5, 3.0);
    let mirror = params.bool_or("mirror", true);
    let wedge = std::f32::consts::TAU / segments as f32;
    let cx = frame.width as f32 / 2.0;
    let cy = frame.height as f32 / 2.0;

    let mut out = frame.data.clone();
    for y in 0..frame.height {
        for x in 0..frame.width {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let r = dx.hypot(dy) / zoom;
            let a = (dy.atan2(dx) - rotation).rem_euclid(std::f32::consts::TAU);
            let idx = (a / wedge).floor();
            let mut local = a - idx * wedge;
            if mirror && (idx as u32) % 2 == 1 {
                local = wedge - local;
            }
            let sa = local + rotation;
            let sx = (cx + r * sa.cos()).floor() as i64;
            let sy = (cy + r * sa.sin()).floor() as i64;
            let src = frame.pixel_clamped(sx, sy);
            let i = frame.index(x, y);
            out[i..i + 3].copy_from_slice(&src[..3]);
        }
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

/// Key alpha for colour distance `d`: 0 below `threshold`, a `floor` ramp across `smoothness`,
/// 255 beyond. `smoothness == 0` is a hard key.
pub fn chroma_alpha(d: f32, threshold: f32, smoothness: f32) -> u8 {
    if d < threshold {
        return 0;
    }
    if smoothness <= 0.0 || d >= threshold + smoothness {
        return 255;
    }
    ((d - threshold) / smoothness * 255.0).floor().clamp(0.0, 255.0) as u8
}

fn chroma_key(
    frame: &mut Frame,
    params: &ParamMap,
    intensity: f32,
    backdrop: &mut Backdrop,
) -> FxResult<()> {
    let key = params.color_or("keyColor", Rgb::GREEN);
    let threshold = params.f32_or("threshold", 40.0);
    let smoothness = params.f32_or("smoothness", 10.0);
    let mut mask: Vec<u8> = frame
        .data
        .chunks_exact(4)
        .map(|px| chroma_alpha(key.distance(px[0], px[1], px[2]), threshold, smoothness))
        .collect();
    soften_mask(&mut mask, intensity);

    let policy = BackgroundPolicy::from_params(params);
    match background_layer(policy, frame, params, Rgb::BLACK, 20.0, backdrop)? {
        Some(bg) => mask_mix_in_place(&mut frame.data, &bg, &mask),
        None => {
            for (px, &m) in frame.data.chunks_exact_mut(4).zip(&mask) {
                px[3] = ((u16::from(px[3]) * u16::from(m) + 127) / 255) as u8;
            }
            Ok(())
        }
    }
}

/// Blend weight of the `k`-th newest history frame (`k = 0` is the current frame).
pub fn motion_blur_weight(k: usize, samples: usize, strength: f32) -> f32 {
    if k == 0 {
        return 1.0;
    }
    if k >= samples {
        return 0.0;
    }
    let n = samples as f32;
    strength / n * (n - k as f32) / n
}

fn motion_blur(
    frame: &mut Frame,
    params: &ParamMap,
    intensity: f32,
    state: &mut SurfaceState,
) -> FxResult<()> {
    let samples = params.u32_or("samples", 5).clamp(2, 10) as usize;
    let strength = params.f32_or("strength", 0.8);
    let history = state
        .history
        .get_or_insert_with(|| FrameHistory::new(samples));
    if history.capacity() != samples {
        history.set_capacity(samples);
    }
    history.push(frame);
    if history.len() < 2 {
        return Ok(());
    }

    let mut acc = vec![0f32; frame.data.len()];
    let mut total = 0.0f32;
    for (k, buf) in history.iter_newest_first().enumerate() {
        let w = motion_blur_weight(k, samples, strength);
        if w <= 0.0 {
            continue;
        }
        total += w;
        for (a, &v) in acc.iter_mut().zip(buf) {
            *a += f32::from(v) * w;
        }
    }
    for (px, a) in frame.data.chunks_exact_mut(4).zip(acc.chunks_exact(4)) {
        for c in 0..3 {
            px[c] = mix_channel(px[c], a[c] / total, intensity);
        }
    }
    Ok(())
}

/// Heuristic foreground: strong gradients, grown by `expand` and feathered outward.
fn foreground_mask(frame: &Frame, params: &ParamMap, feather_default: f32) -> Vec<u8> {
    let mut mask = edge_mask(frame, params.f32_or("threshold", 30.0));
    mask.dilate(params.u32_or("expand", 6));
    mask.feather(params.f32_or("feather", feather_default));
    mask.data
}

fn background_blur(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let radius = params.f32_or("amount", 15.0).round().max(1.0) as u32;
    let mut mask = foreground_mask(frame, params, 10.0);
    soften_mask(&mut mask, intensity);
    let bg = gaussian_blur_rgba8(
        &frame.data,
        frame.width,
        frame.height,
        radius,
        sigma_for_radius(radius),
    )?;
    mask_mix_in_place(&mut frame.data, &bg, &mask)
}

fn background_replace(
    frame: &mut Frame,
    params: &ParamMap,
    intensity: f32,
    backdrop: &mut Backdrop,
) -> FxResult<()> {
    let mut mask = foreground_mask(frame, params, 5.0);
    soften_mask(&mut mask, intensity);
    let policy = BackgroundPolicy::from_params(params);
    match background_layer(policy, frame, params, Rgb::GREEN, 20.0, backdrop)? {
        Some(bg) => mask_mix_in_place(&mut frame.data, &bg, &mask),
        None => Ok(()),
    }
}

fn outline(frame: &mut Frame, params: &ParamMap, intensity: f32) -> FxResult<()> {
    let color = params.color_or("color", Rgb::WHITE);
    let thickness = params.u32_or("thickness", 3).max(1);
    let mut mask = neighbour_diff_mask(frame, params.f32_or("threshold", 128.0));
    mask.dilate(thickness - 1);
    let mut out = frame.data.clone();
    for (px, &m) in out.chunks_exact_mut(4).zip(&mask.data) {
        if m > 0 {
            px[..3].copy_from_slice(&[color.r, color.g, color.b]);
        }
    }
    mix_in_place(&mut frame.data, &out, intensity)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/surface.rs"]
mod tests;
