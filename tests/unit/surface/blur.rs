use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(gaussian_blur_rgba8(&src, 1, 2, 0, 1.0).unwrap(), src);
    assert_eq!(box_blur_rgba8(&src, 1, 2, 0).unwrap(), src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(gaussian_blur_rgba8(&src, w, h, 3, 2.0).unwrap(), src);
    assert_eq!(box_blur_rgba8(&src, w, h, 5).unwrap(), src);
}

#[test]
fn gaussian_spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = gaussian_blur_rgba8(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn box_blur_averages_neighbourhood() {
    // 3x1 row: 0, 90, 0 with radius 1 -> centre becomes 30.
    let src = vec![0, 0, 0, 255, 90, 90, 90, 255, 0, 0, 0, 255];
    let out = box_blur_rgba8(&src, 3, 1, 1).unwrap();
    assert_eq!(out[4], 30);
}

#[test]
fn region_blur_leaves_outside_untouched() {
    let (w, h) = (6u32, 6u32);
    let mut data = vec![0u8; (w * h * 4) as usize];
    for (i, px) in data.chunks_exact_mut(4).enumerate() {
        let v = if i % 2 == 0 { 255 } else { 0 };
        px.copy_from_slice(&[v, v, v, 255]);
    }
    let before = data.clone();
    let region = PixelRect { x0: 1, y0: 1, x1: 4, y1: 4 };
    box_blur_region(&mut data, w, h, region, 1).unwrap();
    for y in 0..h {
        for x in 0..w {
            let i = ((y * w + x) * 4) as usize;
            if !region.contains(x, y) {
                assert_eq!(data[i..i + 4], before[i..i + 4]);
            }
        }
    }
    assert_ne!(data, before);
}

#[test]
fn rejects_mismatched_buffers() {
    assert!(gaussian_blur_rgba8(&[0; 7], 1, 2, 1, 1.0).is_err());
    assert!(box_blur_rgba8(&[0; 7], 1, 2, 1).is_err());
}
