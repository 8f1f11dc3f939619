use super::*;

fn p(x: f32) -> Particle {
    Particle {
        x,
        life: 1.0,
        max_life: 1.0,
        ..Particle::default()
    }
}

#[test]
fn spawns_beyond_cap_are_dropped() {
    let mut pool = ParticlePool::with_cap(3);
    for i in 0..5 {
        pool.spawn(p(i as f32));
    }
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.dropped(), 2);
}

#[test]
fn dead_slots_are_recycled() {
    let mut pool = ParticlePool::with_cap(4);
    for i in 0..4 {
        pool.spawn(p(i as f32));
    }
    pool.retain(|q| q.x < 2.0);
    assert_eq!(pool.len(), 2);
    pool.spawn(p(10.0));
    pool.spawn(p(11.0));
    assert_eq!(pool.len(), 4);
    assert_eq!(pool.allocated(), 4);
}

#[test]
fn shrinking_cap_kills_excess() {
    let mut pool = ParticlePool::with_cap(10);
    for i in 0..10 {
        pool.spawn(p(i as f32));
    }
    pool.set_cap(4);
    assert_eq!(pool.len(), 4);
    assert_eq!(pool.iter().count(), 4);
    assert!(!pool.spawn(p(0.0)));
}

#[test]
fn cap_is_hard_limited() {
    let pool = ParticlePool::with_cap(50_000);
    assert_eq!(pool.cap(), MAX_PARTICLES);
}

#[test]
fn release_is_idempotent() {
    let mut pool = ParticlePool::with_cap(2);
    pool.spawn(p(0.0));
    pool.release();
    pool.release();
    assert!(pool.is_empty());
    assert_eq!(pool.allocated(), 0);
    assert!(pool.spawn(p(1.0)));
}

#[test]
fn life_ratio_is_clamped() {
    let mut q = p(0.0);
    q.life = 2.0;
    assert_eq!(q.life_ratio(), 1.0);
    q.life = -1.0;
    assert_eq!(q.life_ratio(), 0.0);
    q.max_life = 0.0;
    assert_eq!(q.life_ratio(), 1.0);
}
