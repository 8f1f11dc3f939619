//! Spawn, integration and drawing rules of each particle kind.

use crate::effects::kind::EffectKind;
use crate::effects::particles::pool::{MAX_PARTICLES, Particle, ParticlePool};
use crate::effects::params::ParamMap;
use crate::foundation::core::{Affine, Point, Rect, Rgb};
use crate::surface::painter::{Pen, heart_path, star_path};
use rand::Rng;

const CONFETTI_COLORS: [Rgb; 6] = [
    Rgb::new(255, 0, 102),
    Rgb::new(0, 255, 136),
    Rgb::new(0, 102, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 102, 0),
    Rgb::new(255, 0, 255),
];
const RAIN_COLOR: [u8; 4] = [174, 194, 224, 128];
const FIREFLY_COLOR: Rgb = Rgb::new(255, 255, 100);
const CONFETTI_BURST: usize = 30;
const SPARKLE_BURST: usize = 8;
const HEART_BURST: usize = 5;
const EMOJI_CAP: usize = 200;
/// Rain drops never expire on their own; they leave through the bottom edge.
const RAIN_LIFE: f32 = 60.0;

const GLYPH_HEART: u8 = 0;
const GLYPH_STAR: u8 = 1;
const GLYPH_SMILE: u8 = 2;
const GLYPH_FIRE: u8 = 3;

/// Pool capacity for `kind` under `params`.
pub(crate) fn capacity(kind: EffectKind, params: &ParamMap) -> usize {
    let count = |default: u32| params.u32_or("count", default) as usize;
    let cap = match kind {
        EffectKind::Snow => count(100),
        EffectKind::Rain => count(100),
        EffectKind::Confetti => count(50) + CONFETTI_BURST * 4,
        EffectKind::Fireflies => count(30),
        EffectKind::Sparkles => params.u32_or("density", 20) as usize * 10,
        EffectKind::FloatingHearts => count(15) + HEART_BURST * 4,
        EffectKind::EmojiReaction => EMOJI_CAP,
        _ => 0,
    };
    cap.min(MAX_PARTICLES)
}

/// Number of continuously maintained particles (bursts come on top, up to the cap).
fn steady_count(kind: EffectKind, params: &ParamMap) -> usize {
    match kind {
        EffectKind::Snow | EffectKind::Rain => params.u32_or("count", 100) as usize,
        EffectKind::Confetti => params.u32_or("count", 50) as usize,
        EffectKind::Fireflies => params.u32_or("count", 30) as usize,
        EffectKind::FloatingHearts => params.u32_or("count", 15) as usize,
        _ => 0,
    }
}

pub(crate) fn accepts_bursts(kind: EffectKind) -> bool {
    matches!(
        kind,
        EffectKind::Confetti
            | EffectKind::Sparkles
            | EffectKind::FloatingHearts
            | EffectKind::EmojiReaction
    )
}

fn heart(params: &ParamMap, x: f32, y: f32, rng: &mut impl Rng) -> Particle {
    let color = params.color_or("color", Rgb::new(255, 105, 180));
    Particle {
        x,
        y,
        vy: -(params.f32_or("speed", 40.0) + rng.random::<f32>() * 20.0),
        life: 1.0,
        max_life: 0.0,
        color: color.with_alpha(204),
        size: 20.0 + rng.random::<f32>() * 30.0,
        phase: rng.random::<f32>() * std::f32::consts::TAU,
        ..Particle::default()
    }
}

fn confetti(x: f32, y: f32, vx: f32, vy: f32, rng: &mut impl Rng) -> Particle {
    let color = CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())];
    Particle {
        x,
        y,
        vx,
        vy,
        life: 1.0,
        max_life: 0.0,
        color: color.with_alpha(255),
        size: 5.0 + rng.random::<f32>() * 5.0,
        rotation: rng.random::<f32>() * 360.0,
        spin: (rng.random::<f32>() - 0.5) * 360.0,
        ..Particle::default()
    }
}

fn sparkle(params: &ParamMap, x: f32, y: f32, rng: &mut impl Rng) -> Particle {
    let fade = 1.0 + rng.random::<f32>();
    Particle {
        x,
        y,
        life: 1.0 / fade,
        max_life: 1.0 / fade,
        color: params.color_or("color", Rgb::WHITE).with_alpha(255),
        size: params.f32_or("size", 3.0),
        ..Particle::default()
    }
}

fn glyph_index(params: &ParamMap) -> u8 {
    match params.str_or("emoji", "heart") {
        "star" => GLYPH_STAR,
        "smile" => GLYPH_SMILE,
        "fire" => GLYPH_FIRE,
        _ => GLYPH_HEART,
    }
}

/// Queue-driven spawn at `(x, y)`.
pub(crate) fn burst(
    kind: EffectKind,
    params: &ParamMap,
    pool: &mut ParticlePool,
    x: f32,
    y: f32,
    height: f32,
    rng: &mut impl Rng,
) {
    match kind {
        EffectKind::Confetti => {
            for _ in 0..CONFETTI_BURST {
                let a = rng.random::<f32>() * std::f32::consts::TAU;
                let speed = 100.0 + rng.random::<f32>() * 200.0;
                let p = confetti(x, y, a.cos() * speed, a.sin() * speed - 100.0, rng);
                pool.spawn(p);
            }
        }
        EffectKind::Sparkles => {
            let spread = params.f32_or("size", 3.0) * 6.0;
            for _ in 0..SPARKLE_BURST {
                let dx = (rng.random::<f32>() - 0.5) * 2.0 * spread;
                let dy = (rng.random::<f32>() - 0.5) * 2.0 * spread;
                let p = sparkle(params, x + dx, y + dy, rng);
                pool.spawn(p);
            }
        }
        EffectKind::FloatingHearts => {
            for _ in 0..HEART_BURST {
                let p = heart(params, x + (rng.random::<f32>() - 0.5) * 40.0, y, rng);
                pool.spawn(p);
            }
        }
        EffectKind::EmojiReaction => {
            let duration = params.f32_or("duration", 3000.0) / 1000.0;
            let scale = 0.5 + rng.random::<f32>() * 0.5;
            pool.spawn(Particle {
                x,
                y,
                vy: -(0.2 + rng.random::<f32>() * 0.2) * height,
                life: duration,
                max_life: duration,
                color: [255, 255, 255, 255],
                size: params.f32_or("size", 60.0) * scale,
                rotation: rng.random::<f32>() * 360.0,
                spin: (rng.random::<f32>() - 0.5) * 180.0,
                glyph: glyph_index(params),
                ..Particle::default()
            });
        }
        _ => {}
    }
}

/// Continuous spawning for one cycle.
pub(crate) fn spawn(
    kind: EffectKind,
    params: &ParamMap,
    pool: &mut ParticlePool,
    width: f32,
    height: f32,
    rng: &mut impl Rng,
) {
    if kind == EffectKind::Sparkles {
        if rng.random::<f32>() < params.f32_or("density", 20.0) / 100.0 {
            let p = sparkle(
                params,
                rng.random::<f32>() * width,
                rng.random::<f32>() * height,
                rng,
            );
            pool.spawn(p);
        }
        return;
    }
    let target = steady_count(kind, params).min(pool.cap());
    while pool.len() < target {
        let p = match kind {
            EffectKind::Snow => {
                let life = 5.0 + rng.random::<f32>() * 5.0;
                Particle {
                    x: rng.random::<f32>() * width,
                    y: -10.0,
                    vx: params.f32_or("wind", 0.0),
                    vy: params.f32_or("speed", 50.0) + rng.random::<f32>() * 20.0,
                    life,
                    max_life: life,
                    color: [255, 255, 255, 255],
                    size: 2.0 + rng.random::<f32>() * 3.0,
                    phase: rng.random::<f32>() * std::f32::consts::TAU,
                    ..Particle::default()
                }
            }
            EffectKind::Rain => {
                let angle = params.f32_or("angle", 0.0).to_radians();
                let speed = params.f32_or("speed", 300.0);
                Particle {
                    x: rng.random::<f32>() * width,
                    y: -10.0,
                    vx: angle.sin() * speed,
                    vy: angle.cos() * speed,
                    life: RAIN_LIFE,
                    max_life: RAIN_LIFE,
                    color: RAIN_COLOR,
                    size: 10.0 + rng.random::<f32>() * 20.0,
                    ..Particle::default()
                }
            }
            EffectKind::Confetti => confetti(
                rng.random::<f32>() * width,
                -20.0,
                (rng.random::<f32>() - 0.5) * 100.0,
                rng.random::<f32>() * 50.0 + 50.0,
                rng,
            ),
            EffectKind::Fireflies => {
                let speed = params.f32_or("speed", 30.0);
                Particle {
                    x: rng.random::<f32>() * width,
                    y: rng.random::<f32>() * height,
                    vx: (rng.random::<f32>() - 0.5) * speed,
                    vy: (rng.random::<f32>() - 0.5) * speed,
                    life: 1.0,
                    max_life: 0.0,
                    color: FIREFLY_COLOR.with_alpha(255),
                    phase: rng.random::<f32>(),
                    spin: 1.0,
                    ..Particle::default()
                }
            }
            EffectKind::FloatingHearts => heart(
                params,
                rng.random::<f32>() * width,
                height + rng.random::<f32>() * 200.0,
                rng,
            ),
            _ => return,
        };
        if !pool.spawn(p) {
            return;
        }
    }
}

/// Integrate one step of `dt` seconds and cull dead or departed particles.
pub(crate) fn step(
    kind: EffectKind,
    params: &ParamMap,
    pool: &mut ParticlePool,
    width: f32,
    height: f32,
    dt: f32,
) {
    match kind {
        EffectKind::Snow => pool.retain(|p| {
            p.phase += dt;
            p.x += (p.vx + p.phase.sin() * 5.0) * dt;
            p.y += p.vy * dt;
            p.life -= dt;
            p.life > 0.0 && p.y < height
        }),
        EffectKind::Rain => pool.retain(|p| {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.life -= dt;
            p.life > 0.0 && p.y < height
        }),
        EffectKind::Confetti => {
            let gravity = params.f32_or("gravity", 100.0);
            pool.retain(|p| {
                p.x += p.vx * dt;
                p.y += p.vy * dt;
                p.vy += gravity * dt;
                p.rotation += p.spin * dt;
                p.y < height + 50.0
            });
        }
        EffectKind::Fireflies => {
            for p in pool.iter_mut() {
                p.x += p.vx * dt;
                p.y += p.vy * dt;
                if p.x < 0.0 || p.x > width {
                    p.vx = -p.vx;
                    p.x = p.x.clamp(0.0, width);
                }
                if p.y < 0.0 || p.y > height {
                    p.vy = -p.vy;
                    p.y = p.y.clamp(0.0, height);
                }
                // phase is brightness, spin its direction
                p.phase += p.spin * dt * 2.0;
                if p.phase > 1.0 {
                    p.phase = 1.0;
                    p.spin = -1.0;
                } else if p.phase < 0.0 {
                    p.phase = 0.0;
                    p.spin = 1.0;
                }
            }
        }
        EffectKind::Sparkles | EffectKind::EmojiReaction => pool.retain(|p| {
            p.y += p.vy * dt;
            p.rotation += p.spin * dt;
            p.life -= dt;
            p.life > 0.0
        }),
        EffectKind::FloatingHearts => pool.retain(|p| {
            p.y += p.vy * dt;
            p.phase += 3.0 * dt;
            p.y > -p.size
        }),
        _ => {}
    }
}

fn faded(color: [u8; 4], factor: f32) -> [u8; 4] {
    let a = (f32::from(color[3]) * factor.clamp(0.0, 1.0)).floor() as u8;
    [color[0], color[1], color[2], a]
}

/// Draw every live particle. `intensity` scales opacity.
pub(crate) fn draw(
    kind: EffectKind,
    params: &ParamMap,
    pool: &ParticlePool,
    intensity: f32,
    pen: &mut Pen<'_>,
) {
    let pt = |p: &Particle| Point::new(f64::from(p.x), f64::from(p.y));
    match kind {
        EffectKind::Snow => {
            for p in pool.iter() {
                pen.fill_circle(
                    pt(p),
                    f64::from(p.size),
                    faded(p.color, p.life_ratio() * intensity),
                );
            }
        }
        EffectKind::Rain => {
            for p in pool.iter() {
                let tail = Point::new(
                    f64::from(p.x - p.vx * 0.02),
                    f64::from(p.y - p.vy * 0.02),
                );
                pen.stroke_line(pt(p), tail, 1.0, faded(p.color, intensity));
            }
        }
        EffectKind::Confetti => {
            for p in pool.iter() {
                let s = f64::from(p.size);
                let t = Affine::translate((f64::from(p.x), f64::from(p.y)))
                    * Affine::rotate(f64::from(p.rotation).to_radians());
                let color = faded(p.color, intensity);
                pen.with_transform(t, |pen| {
                    pen.fill_rect(Rect::new(-s / 2.0, -s / 2.0, s / 2.0, s * 1.5), color);
                });
            }
        }
        EffectKind::Fireflies => {
            let glow = f64::from(params.f32_or("glowSize", 15.0));
            for p in pool.iter() {
                let color = faded(p.color, p.phase * 0.8 * intensity);
                pen.glow(pt(p), glow, color, 4);
            }
        }
        EffectKind::Sparkles => {
            let star = star_path(4, 1.0 / 3.0);
            for p in pool.iter() {
                let t = Affine::translate((f64::from(p.x), f64::from(p.y)))
                    * Affine::scale(f64::from(p.size));
                let color = faded(p.color, p.life_ratio() * intensity);
                pen.with_transform(t, |pen| pen.fill_path(&star, color));
            }
        }
        EffectKind::FloatingHearts => {
            let shape = heart_path();
            for p in pool.iter() {
                let x = p.x + p.phase.sin() * 10.0;
                let t = Affine::translate((f64::from(x), f64::from(p.y)))
                    * Affine::scale(f64::from(p.size) / 2.0);
                let color = faded(p.color, intensity);
                pen.with_transform(t, |pen| pen.fill_path(&shape, color));
            }
        }
        EffectKind::EmojiReaction => {
            for p in pool.iter() {
                let t = Affine::translate((f64::from(p.x), f64::from(p.y)))
                    * Affine::rotate(f64::from(p.rotation).to_radians())
                    * Affine::scale(f64::from(p.size) / 2.0);
                let alpha = p.life_ratio() * intensity;
                pen.with_transform(t, |pen| draw_glyph(pen, p.glyph, alpha));
            }
        }
        _ => {}
    }
}

/// Unit-sized reaction glyph centred at the origin.
fn draw_glyph(pen: &mut Pen<'_>, glyph: u8, alpha: f32) {
    let a = |rgb: Rgb| faded(rgb.with_alpha(255), alpha);
    match glyph {
        GLYPH_STAR => pen.fill_path(&star_path(5, 0.5), a(Rgb::new(255, 215, 0))),
        GLYPH_SMILE => {
            pen.fill_circle(Point::ZERO, 1.0, a(Rgb::new(255, 204, 51)));
            pen.fill_circle(Point::new(-0.35, -0.25), 0.12, a(Rgb::BLACK));
            pen.fill_circle(Point::new(0.35, -0.25), 0.12, a(Rgb::BLACK));
            let mut mouth = kurbo::BezPath::new();
            mouth.move_to((-0.5, 0.2));
            mouth.quad_to((0.0, 0.75), (0.5, 0.2));
            pen.stroke_path(&mouth, 0.12, a(Rgb::BLACK));
        }
        GLYPH_FIRE => {
            let mut flame = kurbo::BezPath::new();
            flame.move_to((0.0, -1.0));
            flame.curve_to((0.6, -0.3), (0.8, 0.3), (0.5, 0.7));
            flame.quad_to((0.0, 1.1), (-0.5, 0.7));
            flame.curve_to((-0.8, 0.3), (-0.6, -0.3), (0.0, -1.0));
            flame.close_path();
            pen.fill_path(&flame, a(Rgb::new(255, 87, 34)));
            pen.fill_circle(Point::new(0.0, 0.45), 0.35, a(Rgb::new(255, 193, 7)));
        }
        _ => pen.fill_path(&heart_path(), a(Rgb::new(255, 23, 68))),
    }
}
