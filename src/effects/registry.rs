//! Id → constructor table used to rebuild effects from presets and control messages.

use crate::effects::Effect;
use crate::effects::kind::EffectKind;
use crate::foundation::error::{FxError, FxResult};
use crate::preset::EffectEntry;
use std::collections::BTreeMap;
use std::fmt;

/// Builds a fresh effect with its registered defaults.
pub type EffectFactory = Box<dyn Fn() -> FxResult<Effect> + Send + Sync>;

/// Legacy ids that map onto the AR mask with a fixed style.
const MASK_ALIASES: &[(&str, &str)] = &[
    ("arglasses", "glasses"),
    ("armustache", "mustache"),
    ("arhat", "hat"),
    ("animeeyes", "animeeyes"),
];

/// Legacy ids served by another kind with its defaults.
const KIND_ALIASES: &[(&str, EffectKind)] = &[("particleexplosion", EffectKind::Confetti)];

pub struct EffectRegistry {
    factories: BTreeMap<String, EffectFactory>,
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("ids", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EffectRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Every [`EffectKind`] under its id, plus the legacy aliases.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        for kind in EffectKind::ALL {
            reg.register(kind.id(), move || Ok(Effect::new(kind)));
        }
        for &(alias, mask) in MASK_ALIASES {
            reg.register(alias, move || {
                let mut fx = Effect::new(EffectKind::ArMask);
                fx.set_param("mask", mask)?;
                Ok(fx)
            });
        }
        for &(alias, kind) in KIND_ALIASES {
            reg.register(alias, move || Ok(Effect::new(kind)));
        }
        reg
    }

    /// Add or replace the factory for `id`.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        factory: impl Fn() -> FxResult<Effect> + Send + Sync + 'static,
    ) {
        self.factories.insert(id.into(), Box::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn create(&self, id: &str) -> FxResult<Effect> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| FxError::validation(format!("unknown effect id '{id}'")))?;
        factory()
    }

    /// Instantiate a preset entry: factory defaults, then the entry's params, then its
    /// intensity.
    pub fn build(&self, entry: &EffectEntry) -> FxResult<Effect> {
        let mut fx = self.create(&entry.id)?;
        for (key, value) in entry.params.iter() {
            fx.set_param(key, value.clone())?;
        }
        if let Some(i) = entry.intensity {
            fx.set_intensity(i)?;
        }
        Ok(fx)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
