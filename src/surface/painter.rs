//! Imperative vector drawing onto a [`Frame`].
//!
//! Draw calls are recorded into a `vello_cpu` render context, rasterized into a transparent
//! premultiplied layer and composited (source-over) onto the straight-alpha frame.

use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::error::{FxError, FxResult};
use crate::surface::composite::over_premul_onto_straight;
use crate::surface::frame::Frame;
use crate::surface::text::TextLine;
use kurbo::Shape as _;

const TOLERANCE: f64 = 0.1;

/// Reusable rasterizer state. Owned by the scheduler and lent to effects each cycle.
#[derive(Default)]
pub struct Painter {
    ctx: Option<vello_cpu::RenderContext>,
    layer: Option<(u16, u16, vello_cpu::Pixmap)>,
}

impl std::fmt::Debug for Painter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Painter")
            .field("has_ctx", &self.ctx.is_some())
            .field("layer", &self.layer.as_ref().map(|(w, h, _)| (*w, *h)))
            .finish()
    }
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record draw calls with `f` and composite them over `frame`.
    pub fn draw(&mut self, frame: &mut Frame, f: impl FnOnce(&mut Pen<'_>)) -> FxResult<()> {
        if frame.is_empty() {
            return Ok(());
        }
        let w: u16 = frame
            .width
            .try_into()
            .map_err(|_| FxError::effect("frame width exceeds painter limit (u16)"))?;
        let h: u16 = frame
            .height
            .try_into()
            .map_err(|_| FxError::effect("frame height exceeds painter limit (u16)"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let mut pen = Pen {
            ctx: &mut ctx,
            transform: Affine::IDENTITY,
            drew: false,
        };
        f(&mut pen);
        let drew = pen.drew;

        if drew {
            ctx.flush();
            let mut layer = match self.layer.take() {
                Some((lw, lh, pixmap)) if lw == w && lh == h => pixmap,
                _ => vello_cpu::Pixmap::new(w, h),
            };
            layer.data_as_u8_slice_mut().fill(0);
            ctx.render_to_pixmap(&mut layer);
            let res = over_premul_onto_straight(&mut frame.data, layer.data_as_u8_slice());
            self.layer = Some((w, h, layer));
            res?;
        }
        self.ctx = Some(ctx);
        Ok(())
    }

    /// Drop the render context and layer buffers.
    pub fn release(&mut self) {
        self.ctx = None;
        self.layer = None;
    }
}

/// Drawing handle passed to [`Painter::draw`] callbacks. Colors are straight RGBA8.
pub struct Pen<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    transform: Affine,
    drew: bool,
}

impl Pen<'_> {
    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn set_transform(&mut self, t: Affine) {
        self.transform = t;
        self.ctx.set_transform(affine_to_cpu(t));
    }

    /// Run `f` with `t` applied on top of the current transform.
    pub fn with_transform(&mut self, t: Affine, f: impl FnOnce(&mut Self)) {
        let saved = self.transform;
        self.set_transform(saved * t);
        f(self);
        self.set_transform(saved);
    }

    /// Run `f` inside a group composited at `opacity`.
    pub fn with_opacity(&mut self, opacity: f32, f: impl FnOnce(&mut Self)) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        if opacity >= 1.0 {
            f(self);
            return;
        }
        self.ctx.push_opacity_layer(opacity);
        f(self);
        self.ctx.pop_layer();
    }

    pub fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        if rgba[3] == 0 || rect.area() <= 0.0 {
            return;
        }
        self.set_color(rgba);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
        self.drew = true;
    }

    pub fn fill_path(&mut self, path: &BezPath, rgba: [u8; 4]) {
        if rgba[3] == 0 || path.elements().is_empty() {
            return;
        }
        self.set_color(rgba);
        self.ctx.fill_path(&bezpath_to_cpu(path));
        self.drew = true;
    }

    pub fn stroke_path(&mut self, path: &BezPath, width: f64, rgba: [u8; 4]) {
        if width <= 0.0 {
            return;
        }
        let style = kurbo::Stroke::new(width);
        let outline = kurbo::stroke(path.iter(), &style, &kurbo::StrokeOpts::default(), TOLERANCE);
        self.fill_path(&outline, rgba);
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, rgba: [u8; 4]) {
        if radius <= 0.0 {
            return;
        }
        let path = kurbo::Circle::new(center, radius).to_path(TOLERANCE);
        self.fill_path(&path, rgba);
    }

    pub fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, rgba: [u8; 4]) {
        if radius <= 0.0 {
            return;
        }
        let path = kurbo::Circle::new(center, radius).to_path(TOLERANCE);
        self.stroke_path(&path, width, rgba);
    }

    pub fn fill_ellipse(&mut self, center: Point, radii: Vec2, rotation: f64, rgba: [u8; 4]) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let path = kurbo::Ellipse::new(center, radii, rotation).to_path(TOLERANCE);
        self.fill_path(&path, rgba);
    }

    pub fn stroke_line(&mut self, a: Point, b: Point, width: f64, rgba: [u8; 4]) {
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        self.stroke_path(&path, width, rgba);
    }

    pub fn fill_polygon(&mut self, points: &[Point], rgba: [u8; 4]) {
        if let Some(path) = polygon(points) {
            self.fill_path(&path, rgba);
        }
    }

    /// Soft radial glow approximated by concentric discs with decreasing alpha.
    pub fn glow(&mut self, center: Point, radius: f64, rgba: [u8; 4], rings: u32) {
        let rings = rings.max(1);
        for k in 0..rings {
            let t = f64::from(k + 1) / f64::from(rings);
            let r = radius * (1.0 - t) + radius / f64::from(rings);
            let a = (f64::from(rgba[3]) / f64::from(rings)).round().clamp(0.0, 255.0) as u8;
            self.fill_circle(center, r, [rgba[0], rgba[1], rgba[2], a]);
        }
    }

    /// Fill the glyphs of `text` with the layout's top-left corner at `origin`.
    pub fn fill_text(&mut self, text: &TextLine, origin: Point, rgba: [u8; 4]) {
        if rgba[3] == 0 {
            return;
        }
        self.set_color(rgba);
        self.ctx
            .set_transform(affine_to_cpu(self.transform * Affine::translate(origin.to_vec2())));
        for line in text.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&text.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
                self.drew = true;
            }
        }
        self.ctx.set_transform(affine_to_cpu(self.transform));
    }

    fn set_color(&mut self, rgba: [u8; 4]) {
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            rgba[0], rgba[1], rgba[2], rgba[3],
        ));
    }
}

/// Closed polygon path; `None` for fewer than three points.
pub fn polygon(points: &[Point]) -> Option<BezPath> {
    if points.len() < 3 {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for &p in &points[1..] {
        path.line_to(p);
    }
    path.close_path();
    Some(path)
}

/// Heart outline centred at the origin with unit half-width.
pub fn heart_path() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.35));
    p.curve_to((0.0, 0.0), (-0.5, 0.0), (-0.5, 0.35));
    p.curve_to((-0.5, 0.7), (0.0, 0.85), (0.0, 1.0));
    p.curve_to((0.0, 0.85), (0.5, 0.7), (0.5, 0.35));
    p.curve_to((0.5, 0.0), (0.0, 0.0), (0.0, 0.35));
    p.close_path();
    p.apply_affine(Affine::translate((0.0, -0.5)));
    p.apply_affine(Affine::scale(2.0));
    p
}

/// Regular star centred at the origin with outer radius 1.
pub fn star_path(points: u32, inner_ratio: f64) -> BezPath {
    let n = points.max(3);
    let verts: Vec<Point> = (0..2 * n)
        .map(|i| {
            let r = if i % 2 == 0 { 1.0 } else { inner_ratio };
            let a = std::f64::consts::PI * f64::from(i) / f64::from(n) - std::f64::consts::FRAC_PI_2;
            Point::new(r * a.cos(), r * a.sin())
        })
        .collect();
    polygon(&verts).unwrap_or_default()
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/surface/painter.rs"]
mod tests;
