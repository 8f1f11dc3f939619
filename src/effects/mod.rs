//! The effect contract and its category kernels.
//!
//! An [`Effect`] is a closed [`EffectKind`] plus mutable parameters, intensity and enabled flag.
//! Category-specific state (frame history, particle pools, compiled programs, overlay clocks)
//! is private to the effect and dropped by [`Effect::release`]. A background image set with
//! [`Effect::set_image`] survives a release.

pub mod audio;
pub mod backdrop;
pub mod context;
pub mod custom;
pub mod kind;
pub mod landmark;
pub mod overlay;
pub mod params;
pub mod particles;
pub mod pixel;
pub mod registry;
pub mod surface;

use crate::foundation::error::{FxError, FxResult};
use crate::preset::EffectEntry;
use crate::surface::frame::Frame;
use audio::AudioState;
use backdrop::Backdrop;
use context::FrameContext;
use custom::CustomState;
use kind::{Category, EffectKind};
use overlay::OverlayState;
use params::{ParamMap, ParamSpec, ParamValue, defaults};
use particles::ParticleSystem;
use std::sync::Arc;
use surface::SurfaceState;

#[derive(Debug)]
enum EffectState {
    Stateless,
    Surface(SurfaceState),
    Particles(ParticleSystem),
    Audio(AudioState),
    Landmark(Backdrop),
    Overlay(OverlayState),
    Custom(CustomState),
}

impl EffectState {
    fn for_category(category: Category) -> Self {
        match category {
            Category::Pixel => Self::Stateless,
            Category::Surface => Self::Surface(SurfaceState::default()),
            Category::Particle => Self::Particles(ParticleSystem::new()),
            Category::Audio => Self::Audio(AudioState::default()),
            Category::Landmark => Self::Landmark(Backdrop::default()),
            Category::Overlay => Self::Overlay(OverlayState::default()),
            Category::Custom => Self::Custom(CustomState::default()),
        }
    }

    fn release(&mut self) {
        match self {
            Self::Stateless => {}
            Self::Surface(s) => s.release(),
            Self::Particles(p) => p.release(),
            Self::Audio(a) => a.release(),
            Self::Landmark(b) => b.release(),
            Self::Overlay(o) => o.release(),
            Self::Custom(c) => c.release(),
        }
    }
}

/// One configured transformation in a chain.
#[derive(Debug)]
pub struct Effect {
    kind: EffectKind,
    enabled: bool,
    intensity: f32,
    params: ParamMap,
    state: EffectState,
}

impl Effect {
    /// Enabled effect at full intensity with default parameters.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            enabled: true,
            intensity: 1.0,
            params: defaults(kind.param_specs()),
            state: EffectState::for_category(kind.category()),
        }
    }

    /// Build from a parameter map, validating every entry with [`Effect::set_param`].
    pub fn with_params<'a>(
        kind: EffectKind,
        params: impl IntoIterator<Item = (&'a str, &'a ParamValue)>,
    ) -> FxResult<Self> {
        let mut fx = Self::new(kind);
        for (key, value) in params {
            fx.set_param(key, value.clone())?;
        }
        Ok(fx)
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Stable id of the kind, e.g. `"grayscale"`.
    pub fn name(&self) -> &'static str {
        self.kind.id()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn param_specs(&self) -> &'static [ParamSpec] {
        self.kind.param_specs()
    }

    /// Transform `frame` in place. Disabled effects and zero intensity leave it untouched.
    pub fn apply(&mut self, frame: &mut Frame, ctx: &mut FrameContext<'_>) -> FxResult<()> {
        if !self.enabled || self.intensity <= 0.0 {
            return Ok(());
        }
        let (kind, params, intensity) = (self.kind, &self.params, self.intensity);
        match &mut self.state {
            EffectState::Stateless => pixel::apply(kind, params, intensity, frame),
            EffectState::Surface(s) => surface::apply(kind, params, intensity, frame, s),
            EffectState::Particles(p) => p.apply(kind, params, intensity, frame, ctx),
            EffectState::Audio(a) => audio::apply(kind, params, intensity, frame, ctx, a),
            EffectState::Landmark(b) => landmark::apply(kind, params, intensity, frame, ctx, b),
            EffectState::Overlay(o) => overlay::apply(kind, params, intensity, frame, ctx, o),
            EffectState::Custom(c) => custom::apply(params, intensity, frame, ctx, c),
        }
    }

    /// Set one parameter. Numbers are clamped into range and unknown choices fall back to the
    /// default; unknown keys and values of the wrong shape are rejected and the previous value
    /// is kept. The key `"intensity"` is routed to [`Effect::set_intensity`].
    pub fn set_param(&mut self, key: &str, value: impl Into<ParamValue>) -> FxResult<()> {
        let value = value.into();
        if key == params::INTENSITY_SPEC.key {
            let v = params::INTENSITY_SPEC.coerce(value)?;
            return self.set_intensity(v.as_f64().unwrap_or(1.0) as f32);
        }
        let spec = self.kind.param_spec(key).ok_or_else(|| {
            FxError::validation(format!("{} has no parameter '{key}'", self.kind.id()))
        })?;
        let value = spec.coerce(value)?;
        if let EffectState::Custom(state) = &mut self.state {
            if let Some(src) = value.as_str() {
                custom::compile_channel(src)?;
            }
            state.invalidate();
        }
        self.params.insert(spec.key, value);
        Ok(())
    }

    /// Clamp to `[0, 1]`. NaN is rejected.
    pub fn set_intensity(&mut self, intensity: f32) -> FxResult<()> {
        if intensity.is_nan() {
            return Err(FxError::validation("intensity must be a number"));
        }
        self.intensity = intensity.clamp(0.0, 1.0);
        Ok(())
    }

    /// Flip the enabled flag and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Queue a particle burst at `(x, y)`. `false` for kinds without bursts.
    pub fn trigger(&mut self, x: f32, y: f32) -> bool {
        match &mut self.state {
            EffectState::Particles(p) => p.trigger(self.kind, x, y),
            _ => false,
        }
    }

    /// Background image for the keying, replacement and segmentation effects.
    pub fn set_image(&mut self, image: Option<Arc<Frame>>) -> FxResult<()> {
        if !self.kind.accepts_image() {
            return Err(FxError::validation(format!(
                "{} does not take a background image",
                self.kind.id()
            )));
        }
        match &mut self.state {
            EffectState::Surface(s) => s.backdrop.set(image),
            EffectState::Landmark(b) => b.set(image),
            _ => return Err(FxError::effect("image effect without backdrop state")),
        }
        Ok(())
    }

    /// Live particle count, for particle effects.
    pub fn particle_count(&self) -> Option<usize> {
        match &self.state {
            EffectState::Particles(p) => Some(p.pool().len()),
            _ => None,
        }
    }

    /// Drop history, particles, compiled programs and resampled background copies. The
    /// background image itself is kept. Idempotent; the effect stays usable and rebuilds state
    /// lazily.
    pub fn release(&mut self) {
        self.state.release();
    }

    /// Preset entry reproducing this effect's configuration.
    pub fn snapshot(&self) -> EffectEntry {
        EffectEntry {
            id: self.kind.id().to_owned(),
            params: self.params.clone(),
            intensity: Some(self.intensity),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mod.rs"]
mod tests;
