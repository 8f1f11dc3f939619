use super::*;
use crate::effects::kind::EffectKind;
use crate::surface::painter::Painter;

fn run(chain: &mut EffectChain, frame: &mut Frame) -> ChainReport {
    let mut painter = Painter::new();
    let mut ctx = FrameContext::new(&mut painter);
    chain.process(frame, &mut ctx)
}

/// Custom effect whose green program fails evaluation whenever `expr` is non-finite.
fn failing(expr: &str) -> Effect {
    let mut fx = Effect::new(EffectKind::Custom);
    fx.set_param("g", expr).unwrap();
    fx
}

#[test]
fn ids_are_unique_and_duplicates_are_allowed() {
    let mut chain = EffectChain::new();
    let a = chain.push(Effect::new(EffectKind::Grayscale));
    let b = chain.push(Effect::new(EffectKind::Grayscale));
    assert_ne!(a, b);
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.ids(), vec![a, b]);
}

#[test]
fn remove_by_identity() {
    let mut chain = EffectChain::new();
    let a = chain.push(Effect::new(EffectKind::Grayscale));
    let b = chain.push(Effect::new(EffectKind::Vintage));
    assert_eq!(chain.remove(a).map(|fx| fx.kind()), Some(EffectKind::Grayscale));
    assert!(chain.remove(a).is_none());
    assert_eq!(chain.ids(), vec![b]);
}

#[test]
fn move_and_insert_reorder() {
    let mut chain = EffectChain::new();
    let a = chain.push(Effect::new(EffectKind::Grayscale));
    let b = chain.push(Effect::new(EffectKind::Vintage));
    let c = chain.insert(0, Effect::new(EffectKind::Mirror));
    assert_eq!(chain.ids(), vec![c, a, b]);
    assert!(chain.move_to(c, 99));
    assert_eq!(chain.ids(), vec![a, b, c]);
    assert!(!chain.move_to(EffectId(999), 0));
}

#[test]
fn mutations_on_unknown_ids_are_validation_errors() {
    let mut chain = EffectChain::new();
    assert!(matches!(
        chain.set_intensity(EffectId(7), 0.5),
        Err(FxError::Validation(_))
    ));
    assert!(chain.toggle(EffectId(7)).is_err());
}

#[test]
fn failing_effect_is_rolled_back_and_auto_disabled() {
    let mut chain = EffectChain::new().with_failure_limit(3);
    let bad = chain.push(failing("1 / (r - r)"));
    let good = chain.push(Effect::new(EffectKind::Brightness));
    chain.set_param(good, "brightness", 10.0).unwrap();

    let mut frame = Frame::filled(4, 4, [0, 50, 50, 255]);
    for cycle in 1..=3 {
        let report = run(&mut chain, &mut frame);
        assert_eq!(report.failures.len(), 1, "cycle {cycle}");
        assert_eq!(report.failures[0].id, bad);
        assert_eq!(report.applied, 1);
        if cycle < 3 {
            assert!(report.auto_disabled.is_empty());
        } else {
            assert_eq!(report.auto_disabled, vec![bad]);
        }
    }
    assert!(!chain.get(bad).unwrap().is_enabled());
    // Only the brightness effect touched the frame: 3 cycles of +10.
    assert_eq!(frame.pixel(0, 0), [30, 80, 80, 255]);

    let report = run(&mut chain, &mut frame);
    assert!(report.is_clean());

    assert!(chain.toggle(bad).unwrap());
    let report = run(&mut chain, &mut frame);
    assert_eq!(report.failures.len(), 1);
    assert!(report.auto_disabled.is_empty());
}

#[test]
fn success_resets_failure_streak() {
    let mut chain = EffectChain::new().with_failure_limit(2);
    let id = chain.push(failing("1 / r"));
    let mut black = Frame::filled(2, 2, [0, 0, 0, 255]);
    let mut red = Frame::filled(2, 2, [10, 0, 0, 255]);
    run(&mut chain, &mut black);
    run(&mut chain, &mut red);
    let report = run(&mut chain, &mut black);
    assert!(report.auto_disabled.is_empty());
    assert!(chain.get(id).unwrap().is_enabled());
}

#[test]
fn handle_commands_apply_on_drain_in_order() {
    let mut chain = EffectChain::new();
    let handle = chain.handle();
    let id = handle.push(Effect::new(EffectKind::Grayscale)).unwrap();
    handle.set_intensity(id, 0.5).unwrap();
    handle.toggle(id).unwrap();
    assert!(chain.is_empty());

    assert_eq!(chain.drain_commands(), 3);
    let fx = chain.get(id).unwrap();
    assert_eq!(fx.intensity(), 0.5);
    assert!(!fx.is_enabled());

    handle.remove(EffectId(12345)).unwrap();
    assert_eq!(chain.drain_commands(), 0);
}

#[test]
fn handle_works_across_threads() {
    let mut chain = EffectChain::new();
    let handle = chain.handle();
    let t = std::thread::spawn(move || handle.push(Effect::new(EffectKind::Snow)).unwrap());
    let id = t.join().unwrap();
    chain.drain_commands();
    assert_eq!(chain.get(id).map(Effect::kind), Some(EffectKind::Snow));
}

#[test]
fn snapshot_follows_chain_order() {
    let mut chain = EffectChain::new();
    chain.push(Effect::new(EffectKind::Vintage));
    chain.push(Effect::new(EffectKind::Grayscale));
    let ids: Vec<String> = chain.snapshot().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["vintage", "grayscale"]);
}
