//! The frame loop and its configuration.

pub mod opts;
pub mod scheduler;
pub mod source;
pub mod stats;

pub use opts::PipelineOpts;
pub use scheduler::{CycleReport, Pipeline, RunState};
pub use source::{FrameListSource, FrameSource, StillSource, SyntheticSource, fit_to};
pub use stats::{Component, PipelineStats, PipelineStatus, StatusEntry};
