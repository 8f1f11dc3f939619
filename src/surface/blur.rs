use crate::foundation::error::{FxError, FxResult};
use crate::surface::frame::PixelRect;

/// Separable gaussian blur over an RGBA8 buffer (edge pixels clamp).
pub fn gaussian_blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FxResult<Vec<u8>> {
    let expected_len = checked_len(width, height)?;
    if src.len() != expected_len {
        return Err(FxError::effect(
            "gaussian_blur_rgba8 expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Sigma matching the usual "blur(px)" radius convention.
pub fn sigma_for_radius(radius: u32) -> f32 {
    (radius as f32 / 2.0).max(0.5)
}

/// Box blur with a sliding-window sum; cost is independent of `radius`.
pub fn box_blur_rgba8(src: &[u8], width: u32, height: u32, radius: u32) -> FxResult<Vec<u8>> {
    let expected_len = checked_len(width, height)?;
    if src.len() != expected_len {
        return Err(FxError::effect(
            "box_blur_rgba8 expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    box_pass(src, &mut tmp, width as usize, height as usize, radius as usize, true);
    box_pass(&tmp, &mut out, width as usize, height as usize, radius as usize, false);
    Ok(out)
}

/// Block-average blur confined to `region`; samples never leave the region.
pub fn box_blur_region(
    data: &mut [u8],
    width: u32,
    height: u32,
    region: PixelRect,
    radius: u32,
) -> FxResult<()> {
    if data.len() != checked_len(width, height)? {
        return Err(FxError::effect("box_blur_region buffer size mismatch"));
    }
    if radius == 0 || region.x1 > width || region.y1 > height {
        return Ok(());
    }
    let (rw, rh) = (region.width(), region.height());
    let mut sub = Vec::with_capacity((rw as usize) * (rh as usize) * 4);
    for y in region.y0..region.y1 {
        let start = ((y as usize) * (width as usize) + region.x0 as usize) * 4;
        sub.extend_from_slice(&data[start..start + (rw as usize) * 4]);
    }
    let blurred = box_blur_rgba8(&sub, rw, rh, radius)?;
    for (row, y) in (region.y0..region.y1).enumerate() {
        let start = ((y as usize) * (width as usize) + region.x0 as usize) * 4;
        let src_start = row * (rw as usize) * 4;
        data[start..start + (rw as usize) * 4]
            .copy_from_slice(&blurred[src_start..src_start + (rw as usize) * 4]);
    }
    Ok(())
}

fn checked_len(width: u32, height: u32) -> FxResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FxError::effect("blur buffer size overflow"))
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FxResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FxError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Fold the rounding remainder into the centre tap so constant images stay constant.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn box_pass(src: &[u8], dst: &mut [u8], w: usize, h: usize, r: usize, horizontal: bool) {
    let (lines, len) = if horizontal { (h, w) } else { (w, h) };
    let at = |line: usize, i: usize| -> usize {
        if horizontal {
            (line * w + i) * 4
        } else {
            (i * w + line) * 4
        }
    };
    let window = (2 * r + 1) as u32;
    for line in 0..lines {
        let mut acc = [0u32; 4];
        // Prime the window for position 0 with clamped edges.
        for k in 0..=2 * r {
            let i = k.saturating_sub(r).min(len - 1);
            let idx = at(line, i);
            for c in 0..4 {
                acc[c] += u32::from(src[idx + c]);
            }
        }
        for i in 0..len {
            let out = at(line, i);
            for c in 0..4 {
                dst[out + c] = ((acc[c] + window / 2) / window) as u8;
            }
            let leaving = at(line, i.saturating_sub(r));
            let entering = at(line, (i + r + 1).min(len - 1));
            for c in 0..4 {
                acc[c] = acc[c] + u32::from(src[entering + c]) - u32::from(src[leaving + c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/surface/blur.rs"]
mod tests;
