//! Stateful particle simulations drawn through the shared painter.

pub mod pool;

mod kinds;

use crate::effects::context::FrameContext;
use crate::effects::kind::EffectKind;
use crate::effects::params::ParamMap;
use crate::foundation::error::FxResult;
use crate::surface::frame::Frame;
use pool::ParticlePool;
use std::collections::VecDeque;

/// Bursts waiting for the next cycle; further triggers are dropped.
pub const MAX_PENDING_BURSTS: usize = 64;

/// Pool, burst queue and the frame size the pool was seeded for.
#[derive(Debug, Default)]
pub struct ParticleSystem {
    pool: ParticlePool,
    bursts: VecDeque<(f32, f32)>,
    size: (u32, u32),
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pending_bursts(&self) -> usize {
        self.bursts.len()
    }

    /// Queue a burst at `(x, y)` for the next cycle. Returns `false` if the kind has no bursts
    /// or the queue is full.
    pub fn trigger(&mut self, kind: EffectKind, x: f32, y: f32) -> bool {
        if !kinds::accepts_bursts(kind) || self.bursts.len() >= MAX_PENDING_BURSTS {
            return false;
        }
        self.bursts.push_back((x, y));
        true
    }

    /// One simulation cycle: bursts, spawn, integrate, cull, draw.
    pub fn apply(
        &mut self,
        kind: EffectKind,
        params: &ParamMap,
        intensity: f32,
        frame: &mut Frame,
        ctx: &mut FrameContext<'_>,
    ) -> FxResult<()> {
        if frame.is_empty() {
            return Ok(());
        }
        if self.size != (frame.width, frame.height) {
            if self.size != (0, 0) {
                tracing::debug!(kind = %kind, "frame size changed, reseeding particles");
            }
            self.pool.clear();
            self.size = (frame.width, frame.height);
        }
        self.pool.set_cap(kinds::capacity(kind, params));

        let (w, h) = (frame.width as f32, frame.height as f32);
        let dt = ctx.dt_secs();
        let mut rng = rand::rng();
        while let Some((x, y)) = self.bursts.pop_front() {
            kinds::burst(kind, params, &mut self.pool, x, y, h, &mut rng);
        }
        kinds::spawn(kind, params, &mut self.pool, w, h, &mut rng);
        kinds::step(kind, params, &mut self.pool, w, h, dt);

        let pool = &self.pool;
        ctx.painter
            .draw(frame, |pen| kinds::draw(kind, params, pool, intensity, pen))
    }

    /// Drop particles, pending bursts and pool storage. Idempotent.
    pub fn release(&mut self) {
        self.pool.release();
        self.bursts.clear();
        self.size = (0, 0);
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/effects/particles/mod.rs"]
mod tests;
