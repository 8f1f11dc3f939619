//! livefx is a real-time video effects pipeline.
//!
//! Frames flow from a [`FrameSource`] through an ordered [`EffectChain`] and out to
//! [`FrameSink`]s, one cooperative [`Pipeline::tick`] at a time:
//!
//! - Build effects from the [`EffectRegistry`] or a [`Preset`]
//! - Mutate the chain live through a [`ChainHandle`]
//! - Feed landmark and spectrum snapshots from background workers
#![forbid(unsafe_code)]

mod foundation;

pub mod audio;
pub mod chain;
pub mod detect;
pub mod effects;
pub mod expression;
pub mod pipeline;
pub mod preset;
pub mod sink;
pub mod surface;

pub use crate::foundation::core::{
    Affine, BezPath, Fps, FrameSeq, FrameSize, Point, Rect, Rgb, Vec2,
};
pub use crate::foundation::error::{FxError, FxResult};
pub use crate::foundation::snapshot::SnapshotCell;

pub use crate::audio::analyzer::{AnalyzerConfig, SpectrumAnalyzer};
pub use crate::audio::feed::{AudioFeed, PcmSource, ToneSource};
pub use crate::audio::spectrum::Spectrum;
pub use crate::chain::command::{ChainCommand, ChainHandle};
pub use crate::chain::{ChainReport, EffectChain, EffectFailure, EffectId};
pub use crate::detect::detection::{Detection, DetectionSet, Landmarks};
pub use crate::detect::model::{FixedModel, LandmarkModel, SkinToneModel};
pub use crate::detect::tracker::{LandmarkTracker, TrackerConfig};
pub use crate::effects::context::FrameContext;
pub use crate::effects::kind::{Category, EffectKind};
pub use crate::effects::params::{ParamDefault, ParamKind, ParamMap, ParamSpec, ParamValue};
pub use crate::effects::registry::EffectRegistry;
pub use crate::effects::Effect;
pub use crate::pipeline::{
    CycleReport, FrameListSource, FrameSource, Pipeline, PipelineOpts, PipelineStats,
    PipelineStatus, RunState, StillSource, SyntheticSource,
};
pub use crate::preset::{Catalog, EffectEntry, Preset};
pub use crate::sink::{
    FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, PngSequenceSink, PreviewSink,
    RecordingSink, SinkConfig, StreamHandle, StreamSink,
};
pub use crate::surface::frame::Frame;
pub use crate::surface::painter::Painter;
