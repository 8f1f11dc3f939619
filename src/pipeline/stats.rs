use crate::foundation::core::FrameSeq;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

const FPS_SMOOTHING: f64 = 0.9;
const MAX_STATUS_ENTRIES: usize = 64;

/// Frame-rate and timing bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    /// Cycles that published a frame.
    pub frames: u64,
    /// Cycles that published an unprocessed frame because the source was unavailable.
    pub passthrough_frames: u64,
    pub effect_failures: u64,
    pub sink_failures: u64,
    /// Exponentially smoothed frames per second, from wall-clock cycle spacing.
    pub fps: f64,
    pub last_cycle: Duration,
    pub max_cycle: Duration,
    pub total_cycle: Duration,
}

impl PipelineStats {
    pub(crate) fn record_cycle(&mut self, dt: Duration, cycle: Duration) {
        self.frames += 1;
        self.last_cycle = cycle;
        self.max_cycle = self.max_cycle.max(cycle);
        self.total_cycle += cycle;
        if dt > Duration::ZERO {
            let inst = 1.0 / dt.as_secs_f64();
            self.fps = if self.fps == 0.0 {
                inst
            } else {
                FPS_SMOOTHING * self.fps + (1.0 - FPS_SMOOTHING) * inst
            };
        }
    }

    /// Mean processing time per published frame.
    pub fn avg_cycle(&self) -> Duration {
        match u32::try_from(self.frames) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_cycle / n,
            Err(_) => Duration::from_secs_f64(self.total_cycle.as_secs_f64() / self.frames as f64),
        }
    }
}

/// Component a status entry refers to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum Component {
    Source,
    Detector,
    Audio,
    Sink(String),
    Effect(String),
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Detector => f.write_str("detector"),
            Self::Audio => f.write_str("audio"),
            Self::Sink(name) => write!(f, "sink '{name}'"),
            Self::Effect(name) => write!(f, "effect '{name}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub seq: FrameSeq,
    pub component: Component,
    pub message: String,
}

/// User-visible degradation notices, most recent last. Older entries are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    entries: VecDeque<StatusEntry>,
}

impl PipelineStatus {
    pub(crate) fn push(&mut self, seq: FrameSeq, component: Component, message: impl Into<String>) {
        let entry = StatusEntry {
            seq,
            component,
            message: message.into(),
        };
        tracing::info!(seq = entry.seq.0, component = %entry.component, message = %entry.message, "pipeline status");
        if self.entries.len() == MAX_STATUS_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&StatusEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mentions(&self, component: &Component) -> bool {
        self.entries.iter().any(|e| &e.component == component)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/stats.rs"]
mod tests;
