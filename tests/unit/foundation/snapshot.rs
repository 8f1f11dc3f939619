use super::*;

#[test]
fn readers_see_latest_publish() {
    let cell = SnapshotCell::new();
    assert!(cell.latest().is_none());
    let reader = cell.clone();
    cell.publish(1u32);
    cell.publish(2u32);
    assert_eq!(reader.latest().as_deref(), Some(&2));
    assert!(!reader.is_empty());
}

#[test]
fn held_snapshot_survives_replacement() {
    let cell = SnapshotCell::new();
    cell.publish(String::from("old"));
    let held = cell.latest().unwrap();
    cell.publish(String::from("new"));
    assert_eq!(*held, "old");
    cell.clear();
    assert!(cell.latest().is_none());
}

#[test]
fn publishes_across_threads() {
    let cell = SnapshotCell::new();
    let writer = cell.clone();
    std::thread::spawn(move || writer.publish(42u64)).join().unwrap();
    assert_eq!(cell.latest().as_deref(), Some(&42));
}
