//! Throttled landmark detection on a worker thread.
//!
//! The frame loop hands frames to [`LandmarkTracker::submit`], which never blocks: when the
//! worker is still busy with an earlier frame the new one is dropped. Results are published as
//! [`DetectionSet`] snapshots.

use crate::detect::detection::DetectionSet;
use crate::detect::model::LandmarkModel;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::snapshot::SnapshotCell;
use crate::surface::frame::Frame;
use crossbeam_channel::{Sender, TrySendError, bounded};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Minimum time between submitted frames.
    #[serde(with = "millis")]
    pub interval: Duration,
    /// Snapshots older than this are treated as absent.
    #[serde(with = "millis")]
    pub max_age: Duration,
    /// Frames wider than this are downscaled before detection (`0` disables).
    pub max_width: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_age: Duration::from_millis(500),
            max_width: 320,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

type Job = (Arc<Frame>, Instant);

pub struct LandmarkTracker {
    config: TrackerConfig,
    model_name: String,
    jobs: Option<Sender<Job>>,
    snapshot: SnapshotCell<DetectionSet>,
    failed: SnapshotCell<String>,
    last_submit: Option<Instant>,
    dropped: u64,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for LandmarkTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandmarkTracker")
            .field("model", &self.model_name)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl LandmarkTracker {
    pub fn start(mut model: Box<dyn LandmarkModel>, config: TrackerConfig) -> FxResult<Self> {
        let model_name = model.name().to_owned();
        let (tx, rx) = bounded::<Job>(1);
        let snapshot = SnapshotCell::new();
        let failed = SnapshotCell::new();

        let out = snapshot.clone();
        let fail_out = failed.clone();
        let worker = thread::Builder::new()
            .name("livefx-detect".into())
            .spawn(move || {
                // Detections stay in the downscaled frame's space; readers map them with
                // `DetectionSet::scaled_to`.
                for (frame, captured_at) in rx.iter() {
                    match model.detect(&frame) {
                        Ok(dets) => {
                            let mut set = DetectionSet::new(dets, frame.width, frame.height);
                            set.captured_at = captured_at;
                            out.publish(set);
                        }
                        Err(e) if e.is_resource_unavailable() => {
                            tracing::warn!(error = %e, "landmark model unavailable, tracking stopped");
                            fail_out.publish(e.to_string());
                            break;
                        }
                        Err(e) => tracing::warn!(error = %e, "landmark detection failed"),
                    }
                }
            })
            .map_err(|e| FxError::unavailable(format!("spawn detection worker: {e}")))?;

        tracing::debug!(model = %model_name, "landmark tracker started");
        Ok(Self {
            config,
            model_name,
            jobs: Some(tx),
            snapshot,
            failed,
            last_submit: None,
            dropped: 0,
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Offer `frame` for detection. Returns `true` when it was queued; frames are skipped when
    /// the interval has not elapsed or the worker is busy.
    pub fn submit(&mut self, frame: &Frame, now: Instant) -> bool {
        let Some(tx) = &self.jobs else {
            return false;
        };
        if frame.is_empty() {
            return false;
        }
        if let Some(last) = self.last_submit
            && now.saturating_duration_since(last) < self.config.interval
        {
            return false;
        }
        if tx.is_full() {
            self.dropped += 1;
            return false;
        }

        let small = match self.downscaled(frame) {
            Ok(small) => small,
            Err(e) => {
                tracing::warn!(error = %e, "detection downscale failed");
                return false;
            }
        };
        match tx.try_send((Arc::new(small), now)) {
            Ok(()) => {
                self.last_submit = Some(now);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.jobs = None;
                false
            }
        }
    }

    fn downscaled(&self, frame: &Frame) -> FxResult<Frame> {
        let max_w = self.config.max_width;
        if max_w == 0 || frame.width <= max_w {
            return Ok(frame.clone());
        }
        let h = ((u64::from(frame.height) * u64::from(max_w)) / u64::from(frame.width)).max(1);
        frame.resized(max_w, h as u32)
    }

    /// Latest snapshot regardless of age.
    pub fn latest(&self) -> Option<Arc<DetectionSet>> {
        self.snapshot.latest()
    }

    /// Latest snapshot if it is younger than `max_age`.
    pub fn latest_fresh(&self, now: Instant) -> Option<Arc<DetectionSet>> {
        self.snapshot
            .latest()
            .filter(|s| !s.is_stale(now, self.config.max_age))
    }

    pub fn cell(&self) -> SnapshotCell<DetectionSet> {
        self.snapshot.clone()
    }

    /// Frames dropped because the worker was busy.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn failure(&self) -> Option<Arc<String>> {
        self.failed.latest()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Close the job queue, join the worker and clear the snapshot. Idempotent.
    pub fn stop(&mut self) {
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("detection worker panicked");
            }
            tracing::debug!(model = %self.model_name, dropped = self.dropped, "landmark tracker stopped");
        }
        self.snapshot.clear();
    }
}

impl Drop for LandmarkTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/tracker.rs"]
mod tests;
