use super::*;

fn split_frame(w: u32, h: u32) -> Frame {
    let mut f = Frame::filled(w, h, [0, 0, 0, 255]);
    for y in 0..h {
        for x in w / 2..w {
            f.set_pixel(x, y, [255, 255, 255, 255]);
        }
    }
    f
}

#[test]
fn sobel_marks_only_the_boundary() {
    let f = split_frame(8, 5);
    let m = edge_mask(&f, 50.0);
    for y in 1..4 {
        for x in 0..8 {
            let expected = if x == 3 || x == 4 { 255 } else { 0 };
            assert_eq!(m.get(x, y), expected, "x={x} y={y}");
        }
    }
    for x in 0..8 {
        assert_eq!(m.get(x, 0), 0);
        assert_eq!(m.get(x, 4), 0);
    }
}

#[test]
fn dilate_grows_square() {
    let mut m = Mask::new(7, 7);
    m.data[3 * 7 + 3] = 255;
    m.dilate(1);
    assert_eq!(m.data.iter().filter(|&&v| v == 255).count(), 9);
}

#[test]
fn feather_ramps_linearly_outward() {
    let mut m = Mask::from_rect(20, 1, PixelRect { x0: 0, y0: 0, x1: 5, y1: 1 });
    m.feather(4.0);
    assert_eq!(m.get(4, 0), 255);
    // d = 1, 2, 3 -> 191, 128, 64; d >= 4 -> 0.
    assert_eq!(m.get(5, 0), 191);
    assert_eq!(m.get(6, 0), 128);
    assert_eq!(m.get(7, 0), 64);
    assert_eq!(m.get(8, 0), 0);
}

#[test]
fn neighbour_diff_finds_step() {
    let f = split_frame(6, 2);
    let m = neighbour_diff_mask(&f, 128.0);
    assert_eq!(m.get(2, 0), 255);
    assert_eq!(m.get(0, 0), 0);
    assert_eq!(m.get(5, 1), 0);
}

#[test]
fn coverage_of_full_rect() {
    let m = Mask::from_rect(4, 4, PixelRect { x0: 0, y0: 0, x1: 2, y1: 4 });
    assert!((m.coverage() - 0.5).abs() < 1e-6);
}
