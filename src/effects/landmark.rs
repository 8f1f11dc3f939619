//! Overlays anchored to the latest face detections.

use crate::detect::detection::{Detection, Landmarks};
use crate::effects::backdrop::{Backdrop, BackgroundPolicy, background_layer, soften_mask};
use crate::effects::context::FrameContext;
use crate::effects::kind::EffectKind;
use crate::effects::params::ParamMap;
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgb, Vec2};
use crate::foundation::error::{FxError, FxResult};
use crate::surface::blur::box_blur_region;
use crate::surface::composite::{mask_mix_in_place, mix_in_place};
use crate::surface::frame::{Frame, PixelRect};
use crate::surface::mask::Mask;
use crate::surface::painter::{Pen, star_path};

const LENS_DARK: [u8; 4] = [12, 12, 16, 225];
const MUSTACHE: [u8; 4] = [45, 28, 14, 255];
const HAT: [u8; 4] = [20, 20, 24, 255];
const EAR_BROWN: [u8; 4] = [121, 85, 61, 255];
const EAR_INNER: [u8; 4] = [230, 160, 160, 255];
const NOSE_BLACK: [u8; 4] = [25, 20, 20, 255];
const CAT_PINK: [u8; 4] = [255, 150, 180, 255];
const GOLD: [u8; 4] = [255, 200, 40, 255];

pub(crate) fn apply(
    kind: EffectKind,
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &mut FrameContext<'_>,
    backdrop: &mut Backdrop,
) -> FxResult<()> {
    let Some(set) = ctx.detections else {
        return Ok(());
    };
    if set.is_empty() || frame.is_empty() {
        return Ok(());
    }
    let faces = set.scaled_to(frame.width, frame.height);
    match kind {
        EffectKind::ArMask => {
            let style = params.str_or("mask", "sunglasses");
            let scale = f64::from(params.f32_or("scale", 1.0));
            let color = params.color_or("color", Rgb::WHITE);
            let alpha = (255.0 * intensity).round() as u8;
            ctx.painter.draw(frame, |pen| {
                for face in &faces {
                    let marks = landmarks_of(face);
                    draw_mask(pen, style, face.bbox, &marks, scale, color, alpha);
                }
            })
        }
        EffectKind::FaceBeautify => {
            for face in &faces {
                beautify(frame, params, intensity, face)?;
            }
            Ok(())
        }
        EffectKind::SmartSegment => segment(frame, params, intensity, &faces, backdrop),
        other => Err(FxError::effect(format!("{other} is not a landmark effect"))),
    }
}

fn landmarks_of(face: &Detection) -> Landmarks {
    face.landmarks
        .clone()
        .unwrap_or_else(|| Landmarks::from_face_box(face.bbox))
}

fn with_alpha(rgba: [u8; 4], alpha: u8) -> [u8; 4] {
    let a = (u16::from(rgba[3]) * u16::from(alpha) + 127) / 255;
    [rgba[0], rgba[1], rgba[2], a as u8]
}

fn draw_mask(
    pen: &mut Pen<'_>,
    style: &str,
    face: Rect,
    marks: &Landmarks,
    scale: f64,
    color: Rgb,
    alpha: u8,
) {
    let Some((left, right, eye_dist, angle)) = marks.eye_line() else {
        return;
    };
    let mid = left.midpoint(right);
    let c = |rgba: [u8; 4]| with_alpha(rgba, alpha);
    let tint = c(color.with_alpha(255));
    let s = eye_dist * scale;
    // Face-local frame: origin between the eyes, x along the eye line.
    let local = Affine::translate(mid.to_vec2()) * Affine::rotate(angle);
    let half = eye_dist / 2.0;

    match style {
        "glasses" => pen.with_transform(local, |pen| {
            let (x, r) = (s * 0.25, s * 0.25);
            let w = (s * 0.05).max(2.0);
            pen.stroke_circle(Point::new(-x, 0.0), r, w, tint);
            pen.stroke_circle(Point::new(x, 0.0), r, w, tint);
            pen.stroke_line(Point::new(-s * 0.1, 0.0), Point::new(s * 0.1, 0.0), w, tint);
        }),
        "sunglasses" => pen.with_transform(local, |pen| {
            let (x, r) = (s * 0.25, s * 0.25);
            let w = (s * 0.04).max(2.0);
            for cx in [-x, x] {
                pen.fill_circle(Point::new(cx, 0.0), r, c(LENS_DARK));
                pen.stroke_circle(Point::new(cx, 0.0), r, w, tint);
                pen.fill_ellipse(
                    Point::new(cx - r * 0.35, -r * 0.3),
                    Vec2::new(r * 0.25, r * 0.12),
                    -0.5,
                    c([255, 255, 255, 90]),
                );
            }
            pen.stroke_line(Point::new(-s * 0.1, 0.0), Point::new(s * 0.1, 0.0), w, tint);
        }),
        "mustache" => {
            let (Some(nose), Some(mouth)) = (marks.nose_tip(), marks.mouth_center()) else {
                return;
            };
            let anchor = nose.midpoint(mouth);
            let t = Affine::translate(anchor.to_vec2()) * Affine::rotate(angle) * Affine::scale(s);
            pen.with_transform(t, |pen| pen.fill_path(&mustache_path(), c(MUSTACHE)));
        }
        "hat" => {
            let top = Point::new(mid.x, face.y0);
            let t = Affine::translate(top.to_vec2()) * Affine::rotate(angle);
            let fw = face.width() * scale;
            let fh = face.height() * scale;
            pen.with_transform(t, |pen| {
                pen.fill_rect(Rect::new(-fw * 0.6, -fh * 0.08, fw * 0.6, 0.0), c(HAT));
                pen.fill_rect(Rect::new(-fw * 0.35, -fh * 0.6, fw * 0.35, -fh * 0.08), c(HAT));
                pen.fill_rect(Rect::new(-fw * 0.35, -fh * 0.2, fw * 0.35, -fh * 0.12), tint);
            });
        }
        "animeeyes" => pen.with_transform(local, |pen| {
            let r = s * 0.28;
            for x in [-half, half] {
                pen.fill_ellipse(Point::new(x, 0.0), Vec2::new(r, r * 1.25), 0.0, c([255, 255, 255, 255]));
                pen.fill_ellipse(Point::new(x, r * 0.15), Vec2::new(r * 0.7, r * 0.95), 0.0, c([40, 60, 160, 255]));
                pen.fill_circle(Point::new(x, r * 0.2), r * 0.4, c([0, 0, 0, 255]));
                pen.fill_circle(Point::new(x - r * 0.3, -r * 0.35), r * 0.22, c([255, 255, 255, 255]));
            }
        }),
        "dogears" => {
            let Some((jaw_l, _, jaw_r)) = marks.jaw_anchors() else {
                return;
            };
            let r = Vec2::new(s * 0.35, s * 0.6);
            for (base, tilt) in [(jaw_l, -0.35), (jaw_r, 0.35)] {
                let ear = Point::new(base.x, face.y0);
                pen.fill_ellipse(ear, r, angle + tilt, c(EAR_BROWN));
                pen.fill_ellipse(ear, r * 0.55, angle + tilt, c(EAR_INNER));
            }
            if let Some(nose) = marks.nose_tip() {
                pen.fill_ellipse(nose, Vec2::new(s * 0.22, s * 0.15), angle, c(NOSE_BLACK));
            }
        }
        "cat" => {
            let Some((jaw_l, _, jaw_r)) = marks.jaw_anchors() else {
                return;
            };
            for (base, dir) in [(jaw_l, 1.0), (jaw_r, -1.0)] {
                let x = base.x + dir * s * 0.15;
                let ear = [
                    Point::new(x, face.y0 + s * 0.1),
                    Point::new(x + dir * s * 0.2, face.y0 - s * 0.6),
                    Point::new(x + dir * s * 0.6, face.y0),
                ];
                pen.fill_polygon(&ear, c(EAR_BROWN));
            }
            if let Some(nose) = marks.nose_tip() {
                pen.fill_circle(nose, 10.0 * scale, c(CAT_PINK));
                let w = (s * 0.02).max(1.0);
                for dir in [-1.0, 1.0] {
                    for dy in [-0.12, 0.0, 0.12] {
                        let from = Point::new(nose.x + dir * s * 0.15, nose.y + s * dy * 0.3);
                        let to = Point::new(nose.x + dir * s * 0.8, nose.y + s * dy);
                        pen.stroke_line(from, to, w, c([30, 30, 30, 255]));
                    }
                }
            }
        }
        "crown" => {
            let Some((_, chin, _)) = marks.jaw_anchors() else {
                return;
            };
            let base = Point::new(chin.x, face.y0);
            let t = Affine::translate(base.to_vec2()) * Affine::rotate(angle);
            let w = face.width() * 0.8 * scale;
            let h = face.height() * 0.35 * scale;
            pen.with_transform(t, |pen| {
                pen.fill_polygon(&crown_outline(w, h), c(GOLD));
                let gem = star_path(4, 0.5);
                for k in [-1.0, 0.0, 1.0] {
                    let g = Affine::translate((k * w * 0.3, -h * 0.25)) * Affine::scale(h * 0.12);
                    pen.with_transform(g, |pen| pen.fill_path(&gem, tint));
                }
            });
        }
        _ => {}
    }
}

/// Two-lobed moustache of unit width centred at the origin.
fn mustache_path() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((0.0, -0.05));
    p.curve_to((0.15, -0.15), (0.4, -0.1), (0.5, 0.08));
    p.curve_to((0.35, 0.02), (0.2, 0.1), (0.0, 0.05));
    p.curve_to((-0.2, 0.1), (-0.35, 0.02), (-0.5, 0.08));
    p.curve_to((-0.4, -0.1), (-0.15, -0.15), (0.0, -0.05));
    p.close_path();
    p
}

/// Five-spike crown sitting on the origin, spanning `width` and rising `height`.
fn crown_outline(width: f64, height: f64) -> Vec<Point> {
    let hw = width / 2.0;
    let mut pts = vec![Point::new(-hw, 0.0)];
    for k in 0..5 {
        let x0 = -hw + width * f64::from(k) / 5.0;
        pts.push(Point::new(x0 + width / 10.0, -height));
        pts.push(Point::new(x0 + width / 5.0, -height * 0.45));
    }
    pts.pop();
    pts.push(Point::new(hw, 0.0));
    pts
}

fn beautify(frame: &mut Frame, params: &ParamMap, intensity: f32, face: &Detection) -> FxResult<()> {
    let Some(region) = PixelRect::clip(face.bbox, frame.width, frame.height) else {
        return Ok(());
    };
    let smoothing = params.f32_or("smoothing", 0.5);
    let brighten = params.f32_or("brighten", 0.2);
    let eye_enhance = params.f32_or("eyeEnhance", 0.3);

    if smoothing > 0.0 {
        let radius = (smoothing * 3.0).ceil() as u32;
        let mut smoothed = frame.data.clone();
        box_blur_region(&mut smoothed, frame.width, frame.height, region, radius)?;
        mix_in_place(&mut frame.data, &smoothed, smoothing * intensity)?;
    }

    if brighten > 0.0 {
        let boost = brighten * 30.0 * intensity;
        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                let i = frame.index(x, y);
                for c in 0..3 {
                    frame.data[i + c] = (f32::from(frame.data[i + c]) + boost).min(255.0).round() as u8;
                }
            }
        }
    }

    if eye_enhance > 0.0 {
        let marks = landmarks_of(face);
        let radius = marks
            .eye_line()
            .map_or(15.0, |(_, _, d, _)| (d * 0.2).max(4.0));
        for eye in [marks.left_eye_center(), marks.right_eye_center()].into_iter().flatten() {
            enhance_eye(frame, eye, radius, eye_enhance * intensity);
        }
    }
    Ok(())
}

fn enhance_eye(frame: &mut Frame, center: Point, radius: f64, amount: f32) {
    let rect = Rect::from_center_size(center, (radius * 2.0, radius * 2.0));
    let Some(region) = PixelRect::clip(rect, frame.width, frame.height) else {
        return;
    };
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            let d = (Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5) - center).hypot();
            if d >= radius {
                continue;
            }
            let k = 1.0 + (1.0 - d / radius) as f32 * amount * 0.3;
            let i = frame.index(x, y);
            for c in 0..3 {
                frame.data[i + c] = (f32::from(frame.data[i + c]) * k).min(255.0).round() as u8;
            }
        }
    }
}

/// Person box grown from a face box: `x - 0.5w, y - 0.3h, 2w, h * expansion * 2.5`.
pub fn person_box(face: Rect, expansion: f64) -> Rect {
    let (w, h) = (face.width(), face.height());
    let x0 = face.x0 - 0.5 * w;
    let y0 = face.y0 - 0.3 * h;
    Rect::new(x0, y0, x0 + 2.0 * w, y0 + h * expansion * 2.5)
}

fn segment(
    frame: &mut Frame,
    params: &ParamMap,
    intensity: f32,
    faces: &[Detection],
    backdrop: &mut Backdrop,
) -> FxResult<()> {
    let expansion = f64::from(params.f32_or("expansion", 1.5));
    let mut mask = Mask::new(frame.width, frame.height);
    for face in faces {
        if let Some(r) = PixelRect::clip(person_box(face.bbox, expansion), frame.width, frame.height) {
            mask.fill_rect(r, 255);
        }
    }
    mask.feather(params.f32_or("feather", 10.0));
    soften_mask(&mut mask.data, intensity);
    let policy = BackgroundPolicy::from_params(params);
    match background_layer(policy, frame, params, Rgb::BLACK, 15.0, backdrop)? {
        Some(bg) => mask_mix_in_place(&mut frame.data, &bg, &mask.data),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/landmark.rs"]
mod tests;
