//! Serializable chain configurations and the built-in preset catalog.
//!
//! Interchange format:
//!
//! ```json
//! { "name": "Retro", "icon": "📼", "description": "...",
//!   "effects": [ { "id": "vintage", "params": {}, "intensity": 0.8 } ] }
//! ```
//!
//! A numeric `params.intensity` (the legacy spelling) is lifted into `intensity` on load.
//! Parameter maps are ordered, so serialization is deterministic.

use crate::chain::EffectChain;
use crate::effects::params::{INTENSITY_SPEC, ParamMap};
use crate::effects::registry::EffectRegistry;
use crate::foundation::error::{FxError, FxResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One `(id, params, intensity)` entry of a preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub id: String,
    #[serde(default)]
    pub params: ParamMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
}

impl EffectEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: ParamMap::new(),
            intensity: None,
        }
    }

    /// Move a legacy `params.intensity` into `intensity`. An explicit `intensity` wins.
    pub fn lift_legacy_intensity(&mut self) {
        let Some(legacy) = self.params.remove(INTENSITY_SPEC.key) else {
            return;
        };
        if self.intensity.is_none() {
            match legacy.as_f64() {
                Some(v) => self.intensity = Some(v as f32),
                None => tracing::debug!(effect = %self.id, "ignoring non-numeric legacy intensity"),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub effects: Vec<EffectEntry>,
}

impl Preset {
    /// Capture the current configuration of `chain`.
    pub fn from_chain(name: impl Into<String>, icon: impl Into<String>, chain: &EffectChain) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            description: None,
            effects: chain.snapshot(),
        }
    }

    pub fn from_json(json: &str) -> FxResult<Self> {
        let mut preset: Self = serde_json::from_str(json)?;
        preset.normalize();
        Ok(preset)
    }

    pub fn load(path: &Path) -> FxResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            FxError::unavailable(format!("read preset '{}': {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> FxResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn normalize(&mut self) {
        for e in &mut self.effects {
            e.lift_legacy_intensity();
        }
    }

    /// Build a fresh, independent chain. Fails on the first unknown id or rejected parameter.
    pub fn instantiate(&self, registry: &EffectRegistry) -> FxResult<EffectChain> {
        let mut chain = EffectChain::new();
        self.instantiate_into(registry, &mut chain)?;
        Ok(chain)
    }

    /// Replace the contents of `chain` with this preset. `chain` is left untouched on error.
    pub fn instantiate_into(&self, registry: &EffectRegistry, chain: &mut EffectChain) -> FxResult<()> {
        let effects = self
            .effects
            .iter()
            .map(|e| {
                registry.build(e).map_err(|err| match err {
                    FxError::Validation(m) => {
                        FxError::validation(format!("preset '{}': {m}", self.name))
                    }
                    other => other,
                })
            })
            .collect::<FxResult<Vec<_>>>()?;
        chain.clear();
        for fx in effects {
            chain.push(fx);
        }
        tracing::debug!(preset = %self.name, effects = chain.len(), "preset instantiated");
        Ok(())
    }
}

#[derive(Deserialize)]
struct CatalogEntry {
    id: String,
    #[serde(flatten)]
    preset: Preset,
}

/// Built-in presets, in display order.
#[derive(Clone, Debug)]
pub struct Catalog {
    entries: Vec<(String, Preset)>,
}

impl Catalog {
    pub fn builtin() -> FxResult<Self> {
        let raw: Vec<CatalogEntry> = serde_json::from_str(include_str!("catalog.json"))?;
        Ok(Self {
            entries: raw
                .into_iter()
                .map(|mut e| {
                    e.preset.normalize();
                    (e.id, e.preset)
                })
                .collect(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, p)| p)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preset/mod.rs"]
mod tests;
