use crate::audio::analyzer::AnalyzerConfig;
use crate::chain::DEFAULT_FAILURE_LIMIT;
use crate::detect::tracker::TrackerConfig;
use crate::effects::context::MAX_DT;
use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{FxError, FxResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration. Every field has a default, so partial JSON documents are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineOpts {
    /// Working surface width; captured frames are resampled to it.
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Consecutive failures before an effect is disabled (`0` never disables).
    pub failure_limit: u32,
    /// Upper bound on the simulation step, in milliseconds.
    pub max_dt_ms: u64,
    /// Sleep out the remainder of each frame budget in [`Pipeline::run`](super::Pipeline::run).
    pub realtime: bool,
    /// Recorders keep every n-th frame.
    pub record_every: u32,
    pub detection: TrackerConfig,
    pub audio: AnalyzerConfig,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: Fps::default(),
            failure_limit: DEFAULT_FAILURE_LIMIT,
            max_dt_ms: MAX_DT.as_millis() as u64,
            realtime: false,
            record_every: 1,
            detection: TrackerConfig::default(),
            audio: AnalyzerConfig::default(),
        }
    }
}

impl PipelineOpts {
    pub fn from_json(json: &str) -> FxResult<Self> {
        let opts: Self = serde_json::from_str(json)
            .map_err(|e| FxError::serde(format!("invalid pipeline options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn load(path: &Path) -> FxResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FxError::unavailable(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> FxResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FxError::validation("working size must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(FxError::validation("working size must fit in 65535x65535"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.max_dt_ms == 0 {
            return Err(FxError::validation("maxDtMs must be > 0"));
        }
        if self.record_every == 0 {
            return Err(FxError::validation("recordEvery must be >= 1"));
        }
        self.audio.validate()
    }

    pub fn working_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    pub fn max_dt(&self) -> Duration {
        Duration::from_millis(self.max_dt_ms)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(self.fps.frame_duration_secs())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/opts.rs"]
mod tests;
