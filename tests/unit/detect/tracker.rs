use super::*;
use crate::detect::detection::Detection;
use crate::detect::model::FixedModel;
use crate::foundation::core::Rect;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

fn wait_for<T>(mut f: impl FnMut() -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(v) = f() {
            return Some(v);
        }
        thread::sleep(Duration::from_millis(2));
    }
    None
}

fn config(interval_ms: u64) -> TrackerConfig {
    TrackerConfig {
        interval: Duration::from_millis(interval_ms),
        max_age: Duration::from_millis(500),
        max_width: 320,
    }
}

/// Blocks inside `detect` until the test releases it.
struct Gated {
    gate: mpsc::Receiver<()>,
    calls: Arc<AtomicUsize>,
}

impl LandmarkModel for Gated {
    fn name(&self) -> &str {
        "gated"
    }

    fn detect(&mut self, _frame: &Frame) -> FxResult<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.gate.recv();
        Ok(Vec::new())
    }
}

struct Unavailable;

impl LandmarkModel for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn detect(&mut self, _frame: &Frame) -> FxResult<Vec<Detection>> {
        Err(FxError::unavailable("model weights missing"))
    }
}

#[test]
fn publishes_detections_in_downscaled_space() {
    let model = FixedModel::new(vec![Rect::new(0.25, 0.25, 0.75, 0.75)]);
    let mut tracker = LandmarkTracker::start(Box::new(model), config(0)).unwrap();
    let frame = Frame::new(640, 480);
    let t0 = Instant::now();
    assert!(tracker.submit(&frame, t0));

    let set = wait_for(|| tracker.latest()).unwrap();
    assert_eq!((set.frame_width, set.frame_height), (320, 240));
    assert_eq!(set.captured_at, t0);
    let full = set.scaled_to(640, 480);
    assert_eq!(full[0].bbox, Rect::new(160.0, 120.0, 480.0, 360.0));

    tracker.stop();
    tracker.stop();
    assert!(tracker.latest().is_none());
    assert!(!tracker.submit(&frame, Instant::now()));
}

#[test]
fn submissions_are_throttled_by_interval() {
    let model = FixedModel::new(Vec::new());
    let mut tracker = LandmarkTracker::start(Box::new(model), config(100)).unwrap();
    let frame = Frame::new(32, 32);
    let t0 = Instant::now();
    assert!(tracker.submit(&frame, t0));
    assert!(!tracker.submit(&frame, t0 + Duration::from_millis(50)));
    assert!(wait_for(|| tracker.latest()).is_some());
    assert!(tracker.submit(&frame, t0 + Duration::from_millis(150)));
}

#[test]
fn busy_worker_drops_frames_without_blocking() {
    let (release, gate) = mpsc::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let model = Gated {
        gate,
        calls: Arc::clone(&calls),
    };
    let mut tracker = LandmarkTracker::start(Box::new(model), config(0)).unwrap();
    let frame = Frame::new(16, 16);

    assert!(tracker.submit(&frame, Instant::now()));
    // Worker is now parked inside detect.
    assert!(wait_for(|| (calls.load(Ordering::SeqCst) == 1).then_some(())).is_some());
    assert!(tracker.submit(&frame, Instant::now()));

    let started = Instant::now();
    for _ in 0..10 {
        assert!(!tracker.submit(&frame, Instant::now()));
    }
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(tracker.dropped(), 10);

    release.send(()).unwrap();
    release.send(()).unwrap();
    tracker.stop();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn stale_snapshots_are_ignored() {
    let model = FixedModel::new(vec![Rect::new(0.1, 0.1, 0.5, 0.5)]);
    let mut tracker = LandmarkTracker::start(Box::new(model), config(0)).unwrap();
    let t0 = Instant::now();
    tracker.submit(&Frame::new(64, 64), t0);
    assert!(wait_for(|| tracker.latest()).is_some());

    assert!(tracker.latest_fresh(t0 + Duration::from_millis(100)).is_some());
    assert!(tracker.latest_fresh(t0 + Duration::from_secs(2)).is_none());
}

#[test]
fn unavailable_model_stops_worker() {
    let mut tracker = LandmarkTracker::start(Box::new(Unavailable), config(0)).unwrap();
    tracker.submit(&Frame::new(8, 8), Instant::now());
    let failure = wait_for(|| tracker.failure()).unwrap();
    assert!(failure.contains("weights"));
    assert!(wait_for(|| (!tracker.is_running()).then_some(())).is_some());
    assert!(tracker.latest().is_none());
}

#[test]
fn config_serializes_durations_as_millis() {
    let json = serde_json::to_value(TrackerConfig::default()).unwrap();
    assert_eq!(json["interval"], 100);
    assert_eq!(json["maxAge"], 500);
    let cfg: TrackerConfig = serde_json::from_str(r#"{"interval": 40}"#).unwrap();
    assert_eq!(cfg.interval, Duration::from_millis(40));
    assert_eq!(cfg.max_width, 320);
}
