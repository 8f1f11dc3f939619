use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::{mix_channel, mul_div255_u8};

pub type PremulRgba8 = [u8; 4];

/// Source-over of a premultiplied pixel onto a premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }
    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Composite a premultiplied overlay (as produced by the rasterizer) onto a straight frame.
pub fn over_premul_onto_straight(dst: &mut [u8], src_premul: &[u8]) -> FxResult<()> {
    check_pair(dst.len(), src_premul.len(), "over_premul_onto_straight")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let dp = premultiply([d[0], d[1], d[2], d[3]]);
        let out = over(dp, [s[0], s[1], s[2], s[3]], 1.0);
        d.copy_from_slice(&unpremultiply(out));
    }
    Ok(())
}

/// Intensity mix of a whole buffer: `orig = orig*(1-i) + transformed*i`, alpha untouched.
pub fn mix_in_place(orig: &mut [u8], transformed: &[u8], intensity: f32) -> FxResult<()> {
    check_pair(orig.len(), transformed.len(), "mix_in_place")?;
    let i = intensity.clamp(0.0, 1.0);
    if i >= 1.0 {
        for (o, t) in orig.chunks_exact_mut(4).zip(transformed.chunks_exact(4)) {
            o[..3].copy_from_slice(&t[..3]);
        }
        return Ok(());
    }
    for (o, t) in orig.chunks_exact_mut(4).zip(transformed.chunks_exact(4)) {
        for c in 0..3 {
            o[c] = mix_channel(o[c], f32::from(t[c]), i);
        }
    }
    Ok(())
}

/// Same as [`mix_in_place`] but also mixes the alpha channel.
pub fn mix_rgba_in_place(orig: &mut [u8], transformed: &[u8], intensity: f32) -> FxResult<()> {
    check_pair(orig.len(), transformed.len(), "mix_rgba_in_place")?;
    let i = intensity.clamp(0.0, 1.0);
    for (o, t) in orig.iter_mut().zip(transformed.iter()) {
        *o = mix_channel(*o, f32::from(*t), i);
    }
    Ok(())
}

/// Straight-alpha keyed mix: `fg = fg*m + bg*(1-m)` per pixel with `m` from an 8-bit mask.
pub fn mask_mix_in_place(fg: &mut [u8], bg: &[u8], mask: &[u8]) -> FxResult<()> {
    check_pair(fg.len(), bg.len(), "mask_mix_in_place")?;
    if mask.len() * 4 != fg.len() {
        return Err(FxError::effect("mask_mix_in_place mask length mismatch"));
    }
    for ((f, b), &m) in fg.chunks_exact_mut(4).zip(bg.chunks_exact(4)).zip(mask) {
        if m == 255 {
            continue;
        }
        let mf = f32::from(m) / 255.0;
        for c in 0..3 {
            f[c] = mix_channel(b[c], f32::from(f[c]), mf);
        }
        if m == 0 {
            f[3] = b[3];
        }
    }
    Ok(())
}

fn check_pair(a: usize, b: usize, what: &str) -> FxResult<()> {
    if a != b || !a.is_multiple_of(4) {
        return Err(FxError::effect(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/surface/composite.rs"]
mod tests;
