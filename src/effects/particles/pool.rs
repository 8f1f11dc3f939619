/// Hard ceiling on live particles per effect, whatever its count parameter says.
pub const MAX_PARTICLES: usize = 1000;

/// One simulated particle. Units are pixels, seconds and degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: [u8; 4],
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
    pub phase: f32,
    /// Kind-specific shape selector.
    pub glyph: u8,
}

impl Particle {
    /// Remaining life as a fraction of the initial life, in `[0, 1]`.
    pub fn life_ratio(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 1.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    particle: Particle,
    alive: bool,
}

/// Fixed-capacity particle arena. Dead slots go on a free list and are reused by later spawns;
/// storage only grows up to the largest capacity ever requested.
#[derive(Clone, Debug, Default)]
pub struct ParticlePool {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
    cap: usize,
    dropped: u64,
}

impl ParticlePool {
    pub fn with_cap(cap: usize) -> Self {
        let mut p = Self::default();
        p.set_cap(cap);
        p
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Spawns refused because the pool was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn is_full(&self) -> bool {
        self.live >= self.cap
    }

    /// Change the capacity (clamped to [`MAX_PARTICLES`]); excess live particles are killed.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap.min(MAX_PARTICLES);
        if self.live > self.cap {
            let mut excess = self.live - self.cap;
            for (i, slot) in self.slots.iter_mut().enumerate().rev() {
                if excess == 0 {
                    break;
                }
                if slot.alive {
                    slot.alive = false;
                    self.free.push(i);
                    excess -= 1;
                }
            }
            self.live = self.cap;
        }
    }

    /// Insert a particle, reusing a dead slot when one exists. Returns `false` when full.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            self.dropped += 1;
            return false;
        }
        let slot = Slot {
            particle,
            alive: true,
        };
        match self.free.pop() {
            Some(i) => self.slots[i] = slot,
            None => self.slots.push(slot),
        }
        self.live += 1;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|s| s.alive).map(|s| &s.particle)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.slots
            .iter_mut()
            .filter(|s| s.alive)
            .map(|s| &mut s.particle)
    }

    /// Keep live particles for which `keep` returns true; the rest are freed.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut Particle) -> bool) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.alive && !keep(&mut slot.particle) {
                slot.alive = false;
                self.free.push(i);
                self.live -= 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.alive = false;
            self.free.push(i);
        }
        self.live = 0;
    }

    /// Drop the backing storage. Idempotent.
    pub fn release(&mut self) {
        self.slots = Vec::new();
        self.free = Vec::new();
        self.live = 0;
    }

    /// Allocated slots, live or dead.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/effects/particles/pool.rs"]
mod tests;
