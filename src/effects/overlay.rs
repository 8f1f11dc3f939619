//! Animated overlays drawn over the frame: captions, name badges and simple 3-D figures.
//!
//! Animation time is the sum of the cycle steps seen by the effect, so a paused or disabled
//! overlay resumes where it stopped.

use crate::effects::context::FrameContext;
use crate::effects::kind::EffectKind;
use crate::effects::params::ParamMap;
use crate::foundation::core::{Point, Rect, Rgb, Vec2};
use crate::foundation::error::{FxError, FxResult};
use crate::surface::frame::Frame;
use crate::surface::painter::{Pen, star_path};
use crate::surface::text::{TextEngine, TextLine, wrap_words};
use kurbo::Shape as _;
use rand::Rng;
use std::f64::consts::{FRAC_PI_4, TAU};

const SHADOW: [u8; 4] = [0, 0, 0, 128];
const SHADOW_OFFSET: f64 = 3.0;
const SUBTITLE_MARGIN: f64 = 40.0;
const LOWER_THIRD_W: f64 = 300.0;
const LOWER_THIRD_H: f64 = 80.0;
const NAME_SIZE: f32 = 24.0;
const TITLE_SIZE: f32 = 16.0;
/// Advance of one character, relative to the font size, when no font is loaded.
const FALLBACK_ADVANCE: f32 = 0.55;
/// Camera distance from the cube centre, in cube edges.
const CAMERA_DISTANCE: f64 = 5.0;

type V3 = [f64; 3];

const CUBE_CORNERS: [V3; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];
const CUBE_FACES: [([usize; 4], V3); 6] = [
    ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
    ([1, 0, 3, 2], [0.0, 0.0, -1.0]),
    ([5, 1, 2, 6], [1.0, 0.0, 0.0]),
    ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
    ([7, 6, 2, 3], [0.0, 1.0, 0.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
];

#[derive(Debug, Default)]
enum FontSlot {
    #[default]
    Unresolved,
    Ready(TextEngine),
    Missing,
}

#[derive(Clone, Copy, Debug)]
struct Star {
    angle: f64,
    /// Radians per second.
    speed: f64,
    /// Depth in `[-1, 1]`; positive is nearer the viewer.
    depth: f64,
}

/// Animation clock, text engine and star ring of an overlay effect.
#[derive(Debug, Default)]
pub(crate) struct OverlayState {
    age: f64,
    font: FontSlot,
    stars: Vec<Star>,
}

impl OverlayState {
    fn engine(&mut self) -> Option<&mut TextEngine> {
        if matches!(self.font, FontSlot::Unresolved) {
            self.font = match TextEngine::system() {
                Ok(engine) => FontSlot::Ready(engine),
                Err(e) => {
                    tracing::warn!(error = %e, "text overlay has no font, drawing boxes only");
                    FontSlot::Missing
                }
            };
        }
        match &mut self.font {
            FontSlot::Ready(engine) => Some(engine),
            _ => None,
        }
    }

    pub(crate) fn release(&mut self) {
        self.font = FontSlot::Unresolved;
        self.stars = Vec::new();
    }
}

pub(crate) fn apply(
    kind: EffectKind,
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &mut FrameContext<'_>,
    state: &mut OverlayState,
) -> FxResult<()> {
    if frame.is_empty() {
        return Ok(());
    }
    let dt = f64::from(ctx.dt_secs());
    state.age += dt;
    let (w, h) = (f64::from(frame.width), f64::from(frame.height));
    match kind {
        EffectKind::TextOverlay => text_overlay(params, intensity, frame, ctx, state),
        EffectKind::Subtitles => subtitles(params, intensity, frame, ctx, state),
        EffectKind::LowerThird => lower_third(params, intensity, frame, ctx, state),
        EffectKind::GlowingRing => {
            let t = state.age * f64::from(params.f32_or("speed", 1.0));
            ctx.painter
                .draw(frame, |pen| glowing_ring(pen, params, intensity, t, w, h))
        }
        EffectKind::SpinningStars => {
            advance_stars(state, params, dt);
            let stars = &state.stars;
            ctx.painter
                .draw(frame, |pen| spinning_stars(pen, params, intensity, stars, w, h))
        }
        EffectKind::FloatingCube => {
            let t = state.age * f64::from(params.f32_or("speed", 1.0));
            ctx.painter
                .draw(frame, |pen| floating_cube(pen, params, intensity, t, w, h))
        }
        other => Err(FxError::effect(format!("{other} is not an overlay effect"))),
    }
}

/// Visible characters, opacity and vertical offset of animated text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextAnimation {
    pub shown: usize,
    pub alpha: f64,
    pub offset_y: f64,
}

/// Animation state `age_ms` into a `duration_ms` intro of a `chars`-long text.
pub fn animate_text(animation: &str, age_ms: f64, duration_ms: f64, chars: usize) -> TextAnimation {
    let progress = (age_ms / duration_ms.max(1.0)).clamp(0.0, 1.0);
    let mut out = TextAnimation {
        shown: chars,
        alpha: 1.0,
        offset_y: 0.0,
    };
    match animation {
        "fade" => out.alpha = progress,
        "bounce" => out.offset_y = (age_ms / 200.0).sin() * 10.0,
        "typewriter" => out.shown = (progress * chars as f64).floor() as usize,
        _ => {}
    }
    out
}

fn outline_offsets(radius: f64) -> impl Iterator<Item = Vec2> {
    (0..8u8).map(move |k| {
        let a = f64::from(k) * FRAC_PI_4;
        Vec2::new(a.cos() * radius, a.sin() * radius)
    })
}

fn text_overlay(
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &mut FrameContext<'_>,
    state: &mut OverlayState,
) -> FxResult<()> {
    let text = params.str_or("text", "Hello World");
    let anim = animate_text(
        params.str_or("animation", "none"),
        state.age * 1000.0,
        f64::from(params.f32_or("animationDuration", 2000.0)),
        text.chars().count(),
    );
    let shown: String = text.chars().take(anim.shown).collect();
    let opacity = anim.alpha as f32 * intensity;
    if shown.trim().is_empty() || opacity <= 0.0 {
        return Ok(());
    }
    let Some(engine) = state.engine() else {
        return Ok(());
    };
    let line = engine.layout(&shown, params.f32_or("fontSize", 48.0))?;

    let center = Point::new(
        f64::from(params.f32_or("x", 50.0)) / 100.0 * f64::from(frame.width),
        f64::from(params.f32_or("y", 50.0)) / 100.0 * f64::from(frame.height) + anim.offset_y,
    );
    let origin = center - Vec2::new(f64::from(line.width()), f64::from(line.height())) / 2.0;
    let fill = params.color_or("color", Rgb::WHITE).with_alpha(255);
    let stroke = params.color_or("outlineColor", Rgb::BLACK).with_alpha(255);
    let stroke_w = if params.bool_or("outline", true) {
        f64::from(params.f32_or("outlineWidth", 3.0))
    } else {
        0.0
    };
    let shadow = params.bool_or("shadow", true);

    ctx.painter.draw(frame, |pen| {
        pen.with_opacity(opacity, |pen| {
            if shadow {
                let offset = Vec2::new(SHADOW_OFFSET, SHADOW_OFFSET);
                pen.fill_text(&line, origin + offset, SHADOW);
            }
            if stroke_w > 0.0 {
                for offset in outline_offsets(stroke_w / 2.0) {
                    pen.fill_text(&line, origin + offset, stroke);
                }
            }
            pen.fill_text(&line, origin, fill);
        });
    })
}

/// Caption box centred at the bottom of a `width x height` frame for `lines` lines of text.
pub fn subtitle_box(
    width: f64,
    height: f64,
    lines: usize,
    font_size: f64,
    padding: f64,
    max_width: f64,
) -> Rect {
    let box_h = lines as f64 * font_size * 1.2 + padding * 2.0;
    let box_w = (max_width + padding * 2.0).min(width);
    let x = (width - box_w) / 2.0;
    let y = height - box_h - SUBTITLE_MARGIN;
    Rect::new(x, y, x + box_w, y + box_h)
}

fn subtitles(
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &mut FrameContext<'_>,
    state: &mut OverlayState,
) -> FxResult<()> {
    let text = params.str_or("text", "");
    if text.trim().is_empty() {
        return Ok(());
    }
    let size = params.f32_or("fontSize", 32.0);
    let padding = f64::from(params.f32_or("padding", 15.0));
    let max_width = params.f32_or("maxWidth", 80.0) / 100.0 * frame.width as f32;
    let (w, h) = (f64::from(frame.width), f64::from(frame.height));

    let mut engine = state.engine();
    let lines = wrap_words(text, max_width, |s| match engine.as_deref_mut() {
        Some(e) => e.measure(s, size).unwrap_or(0.0),
        None => s.chars().count() as f32 * size * FALLBACK_ADVANCE,
    });
    let shaped: Vec<TextLine> = match engine {
        Some(e) => lines
            .iter()
            .map(|l| e.layout(l, size))
            .collect::<FxResult<_>>()?,
        None => Vec::new(),
    };

    let bg = subtitle_box(w, h, lines.len(), f64::from(size), padding, f64::from(max_width));
    let bg_alpha = (params.f32_or("backgroundOpacity", 0.8) * 255.0).round() as u8;
    let bg_rgba = params.color_or("backgroundColor", Rgb::BLACK).with_alpha(bg_alpha);
    let fg = params.color_or("textColor", Rgb::WHITE).with_alpha(255);
    let line_h = f64::from(size) * 1.2;
    ctx.painter.draw(frame, |pen| {
        pen.with_opacity(intensity, |pen| {
            pen.fill_rect(bg, bg_rgba);
            for (i, line) in shaped.iter().enumerate() {
                let origin = Point::new(
                    (w - f64::from(line.width())) / 2.0,
                    bg.y0 + padding + i as f64 * line_h,
                );
                pen.fill_text(line, origin, fg);
            }
        });
    })
}

/// Name badge rectangle for `position` (`bottom-left`, `bottom-right`, `bottom-center`).
pub fn lower_third_box(position: &str, padding: f64, width: f64, height: f64) -> Rect {
    let y = height - LOWER_THIRD_H - padding;
    let x = match position {
        "bottom-right" => width - LOWER_THIRD_W - padding,
        "bottom-center" => (width - LOWER_THIRD_W) / 2.0,
        _ => padding,
    };
    Rect::new(x, y, x + LOWER_THIRD_W, y + LOWER_THIRD_H)
}

fn lower_third(
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &mut FrameContext<'_>,
    state: &mut OverlayState,
) -> FxResult<()> {
    let (w, h) = (f64::from(frame.width), f64::from(frame.height));
    let badge = lower_third_box(
        params.str_or("position", "bottom-left"),
        f64::from(params.f32_or("padding", 20.0)),
        w,
        h,
    );
    let mut labels = Vec::new();
    if let Some(engine) = state.engine() {
        for (key, size, baseline) in [("name", NAME_SIZE, 30.0), ("title", TITLE_SIZE, 55.0)] {
            let text = params.str_or(key, "");
            if text.trim().is_empty() {
                continue;
            }
            let line = engine.layout(text, size)?;
            let top = badge.y0 + baseline - f64::from(line.ascent());
            labels.push((line, Point::new(badge.x0 + 15.0, top)));
        }
    }
    let bg_alpha = (params.f32_or("backgroundOpacity", 0.9) * 255.0).round() as u8;
    let bg = params
        .color_or("backgroundColor", Rgb::new(102, 126, 234))
        .with_alpha(bg_alpha);
    let fg = params.color_or("textColor", Rgb::WHITE).with_alpha(255);
    ctx.painter.draw(frame, |pen| {
        pen.with_opacity(intensity, |pen| {
            pen.fill_rect(badge, bg);
            for (line, origin) in &labels {
                pen.fill_text(line, *origin, fg);
            }
        });
    })
}

/// Scale and opacity of the ring `t` seconds in.
pub fn ring_pulse(t: f64) -> (f64, f64) {
    let phase = t * 1.2;
    (1.0 + (phase * 3.0).sin() * 0.1, 0.5 + (phase * 2.0).sin() * 0.2)
}

fn glowing_ring(pen: &mut Pen<'_>, params: &ParamMap, intensity: f32, t: f64, w: f64, h: f64) {
    let (scale, opacity) = ring_pulse(t);
    let r = f64::from(params.f32_or("radius", 0.4)) * w.min(h) / 2.0 * scale;
    let thickness = f64::from(params.f32_or("thickness", 6.0));
    let color = params.color_or("color", Rgb::new(0, 255, 255));
    // Seen from 45 degrees above its plane.
    let ring = kurbo::Ellipse::new((w / 2.0, h / 2.0), (r, r * FRAC_PI_4.cos()), 0.0).to_path(0.1);
    pen.with_opacity(opacity as f32 * intensity, |pen| {
        for k in (1..=3u8).rev() {
            let halo = thickness * (1.0 + f64::from(k) * 1.5);
            pen.stroke_path(&ring, halo, color.with_alpha(255 / (k + 2)));
        }
        pen.stroke_path(&ring, thickness, color.with_alpha(255));
    });
}

fn advance_stars(state: &mut OverlayState, params: &ParamMap, dt: f64) {
    let count = params.u32_or("starCount", 50) as usize;
    if state.stars.len() != count {
        let mut rng = rand::rng();
        state.stars = (0..count)
            .map(|i| Star {
                angle: i as f64 / count as f64 * TAU,
                speed: 0.6 + rng.random::<f64>() * 0.6,
                depth: rng.random::<f64>() * 2.0 - 1.0,
            })
            .collect();
    }
    for star in &mut state.stars {
        star.angle = (star.angle + star.speed * dt) % TAU;
    }
}

/// Twinkle opacity of a star at `angle` on the ring.
pub fn star_twinkle(angle: f64) -> f64 {
    0.5 + (angle * 5.0).sin() * 0.5
}

fn spinning_stars(
    pen: &mut Pen<'_>,
    params: &ParamMap,
    intensity: f32,
    stars: &[Star],
    w: f64,
    h: f64,
) {
    let radius = f64::from(params.f32_or("radius", 0.78)) * w.min(h) / 2.0;
    let size = f64::from(params.f32_or("size", 4.0));
    let color = params.color_or("color", Rgb::new(255, 255, 0));
    let center = Point::new(w / 2.0, h / 2.0);
    let shape = star_path(5, 0.45);
    pen.with_opacity(intensity, |pen| {
        for star in stars {
            let near = CAMERA_DISTANCE / (CAMERA_DISTANCE - star.depth);
            let at = center
                + Vec2::new(star.angle.cos(), -star.angle.sin()) * radius * near;
            let alpha = (star_twinkle(star.angle) * 255.0).round() as u8;
            if alpha == 0 {
                continue;
            }
            let s = size * near;
            pen.glow(at, s * 2.0, color.with_alpha(alpha / 3), 3);
            let t = kurbo::Affine::translate(at.to_vec2()) * kurbo::Affine::scale(s);
            pen.with_transform(t, |pen| pen.fill_path(&shape, color.with_alpha(alpha)));
        }
    });
}

fn rotate(v: V3, rx: f64, ry: f64) -> V3 {
    let (sy, cy) = ry.sin_cos();
    let (x, z) = (v[0] * cy + v[2] * sy, -v[0] * sy + v[2] * cy);
    let (sx, cx) = rx.sin_cos();
    [x, v[1] * cx - z * sx, v[1] * sx + z * cx]
}

/// Camera-facing faces of the unit cube rotated by `rx` then `ry`, far to near. Each face is
/// its rotated corners and rotated normal.
pub(crate) fn visible_faces(rx: f64, ry: f64) -> Vec<([V3; 4], V3)> {
    let corners = CUBE_CORNERS.map(|c| rotate(c, rx, ry));
    let mut faces: Vec<([V3; 4], V3)> = CUBE_FACES
        .iter()
        .map(|&(idx, n)| (idx.map(|i| corners[i]), rotate(n, rx, ry)))
        .filter(|(_, n)| n[2] > 1e-9)
        .collect();
    let depth = |q: &[V3; 4]| q.iter().map(|p| p[2]).sum::<f64>();
    faces.sort_by(|a, b| depth(&a.0).total_cmp(&depth(&b.0)));
    faces
}

fn floating_cube(pen: &mut Pen<'_>, params: &ParamMap, intensity: f32, t: f64, w: f64, h: f64) {
    let phase = t * 0.6;
    let edge = f64::from(params.f32_or("size", 0.13)) * w.min(h);
    let bob = (phase * 2.0).sin() * 0.5;
    let color = params.color_or("color", Rgb::new(102, 126, 234));
    let light = {
        let l = 1.0 / 3f64.sqrt();
        [l, l, l]
    };
    let project = |p: V3| {
        let near = CAMERA_DISTANCE / (CAMERA_DISTANCE - p[2]);
        Point::new(w / 2.0 + p[0] * edge * near, h / 2.0 - (p[1] + bob) * edge * near)
    };
    pen.with_opacity(0.8 * intensity, |pen| {
        for (quad, n) in visible_faces(phase, phase * 1.5) {
            let diffuse = (n[0] * light[0] + n[1] * light[1] + n[2] * light[2]).max(0.0);
            let k = (0.8 + diffuse).min(1.4);
            let shade = |c: u8| (f64::from(c) * k).round().min(255.0) as u8;
            let rgba = [shade(color.r), shade(color.g), shade(color.b), 255];
            let pts = quad.map(&project);
            pen.fill_polygon(&pts, rgba);
            for i in 0..4 {
                pen.stroke_line(pts[i], pts[(i + 1) % 4], 1.0, [255, 255, 255, 70]);
            }
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/effects/overlay.rs"]
mod tests;
