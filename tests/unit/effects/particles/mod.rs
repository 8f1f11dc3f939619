use super::*;
use crate::effects::params::defaults;
use crate::surface::painter::Painter;
use std::time::Duration;

fn cycle(sys: &mut ParticleSystem, kind: EffectKind, params: &ParamMap, frame: &mut Frame, dt_ms: u64) {
    let mut painter = Painter::new();
    let mut ctx = FrameContext::new(&mut painter).with_dt(Duration::from_millis(dt_ms));
    sys.apply(kind, params, 1.0, frame, &mut ctx).unwrap();
}

#[test]
fn snow_fills_to_count_and_draws() {
    let kind = EffectKind::Snow;
    let params: ParamMap = [("count", 40.0)].into_iter().collect();
    let mut sys = ParticleSystem::new();
    let mut frame = Frame::filled(64, 48, [0, 0, 0, 255]);
    for _ in 0..30 {
        cycle(&mut sys, kind, &params, &mut frame, 33);
    }
    assert!(sys.pool().len() <= 40);
    assert!(sys.pool().len() > 0);
    assert!(frame.data.chunks_exact(4).any(|px| px[0] > 0));
}

#[test]
fn confetti_bursts_queue_and_respect_cap() {
    let kind = EffectKind::Confetti;
    let params = defaults(kind.param_specs());
    let mut sys = ParticleSystem::new();
    let mut frame = Frame::new(100, 100);
    for _ in 0..(MAX_PENDING_BURSTS + 10) {
        sys.trigger(kind, 50.0, 50.0);
    }
    assert_eq!(sys.pending_bursts(), MAX_PENDING_BURSTS);
    cycle(&mut sys, kind, &params, &mut frame, 16);
    assert_eq!(sys.pending_bursts(), 0);
    assert!(sys.pool().len() <= sys.pool().cap());
    assert!(sys.pool().dropped() > 0);
}

#[test]
fn trigger_is_ignored_by_ambient_kinds() {
    let mut sys = ParticleSystem::new();
    assert!(!sys.trigger(EffectKind::Snow, 1.0, 1.0));
    assert!(!sys.trigger(EffectKind::Rain, 1.0, 1.0));
    assert!(sys.trigger(EffectKind::EmojiReaction, 1.0, 1.0));
}

#[test]
fn emoji_reactions_expire_after_duration() {
    let kind = EffectKind::EmojiReaction;
    let params: ParamMap = [("duration", 500.0)].into_iter().collect();
    let mut sys = ParticleSystem::new();
    let mut frame = Frame::new(80, 80);
    sys.trigger(kind, 40.0, 70.0);
    cycle(&mut sys, kind, &params, &mut frame, 100);
    assert_eq!(sys.pool().len(), 1);
    for _ in 0..3 {
        cycle(&mut sys, kind, &params, &mut frame, 250);
    }
    assert_eq!(sys.pool().len(), 0);
}

#[test]
fn long_dt_is_clamped() {
    let kind = EffectKind::Rain;
    let params: ParamMap = [("count", 10.0), ("speed", 1000.0)].into_iter().collect();
    let mut sys = ParticleSystem::new();
    let mut frame = Frame::new(50, 1000);
    cycle(&mut sys, kind, &params, &mut frame, 0);
    // A 10 s stall would carry drops 10000 px; the clamp keeps it to 250 px.
    cycle(&mut sys, kind, &params, &mut frame, 10_000);
    assert_eq!(sys.pool().len(), 10);
    assert!(sys.pool().iter().all(|p| p.y <= 240.0 + 1e-3));
}

#[test]
fn resize_reseeds_and_release_is_idempotent() {
    let kind = EffectKind::Fireflies;
    let params = defaults(kind.param_specs());
    let mut sys = ParticleSystem::new();
    let mut big = Frame::new(200, 200);
    cycle(&mut sys, kind, &params, &mut big, 16);
    let mut small = Frame::new(20, 20);
    cycle(&mut sys, kind, &params, &mut small, 16);
    assert!(sys.pool().iter().all(|p| p.x <= 20.0 && p.y <= 20.0));
    sys.release();
    sys.release();
    assert!(sys.pool().is_empty());
}
