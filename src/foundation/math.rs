pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Clamp to `0..=255` and round half away from zero.
pub fn clamp_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Linear intensity mix of one channel: `round(orig*(1-i) + transformed*i)`.
///
/// `transformed` is the unrounded full-strength value; it is clamped to `0..=255` before mixing.
pub fn mix_channel(orig: u8, transformed: f32, intensity: f32) -> u8 {
    let t = transformed.clamp(0.0, 255.0);
    clamp_u8(f32::from(orig) * (1.0 - intensity) + t * intensity)
}

/// ITU-R BT.601 luma, unrounded.
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

/// Plain channel average used by the gradient kernels.
pub(crate) fn avg3(r: u8, g: u8, b: u8) -> f32 {
    (f32::from(r) + f32::from(g) + f32::from(b)) / 3.0
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
