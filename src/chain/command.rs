use crate::chain::{EffectId, IdAllocator};
use crate::effects::Effect;
use crate::effects::params::ParamValue;
use crate::effects::registry::EffectRegistry;
use crate::foundation::error::{FxError, FxResult};
use crate::preset::Preset;
use crate::surface::frame::Frame;
use std::sync::Arc;

/// A chain mutation queued from another thread.
#[derive(Debug)]
pub enum ChainCommand {
    Push { id: EffectId, effect: Box<Effect> },
    Remove(EffectId),
    Clear,
    /// Swap the whole chain, e.g. for a preset.
    Replace(Vec<(EffectId, Effect)>),
    MoveTo { id: EffectId, index: usize },
    SetParam {
        id: EffectId,
        key: String,
        value: ParamValue,
    },
    SetIntensity { id: EffectId, intensity: f32 },
    Toggle(EffectId),
    SetEnabled { id: EffectId, enabled: bool },
    Trigger { id: EffectId, x: f32, y: f32 },
    SetImage {
        id: EffectId,
        image: Option<Arc<Frame>>,
    },
}

/// Cloneable, `Send` control handle for an [`EffectChain`](crate::chain::EffectChain).
///
/// Commands are applied at the start of the next cycle, in the order they were sent.
#[derive(Clone, Debug)]
pub struct ChainHandle {
    tx: crossbeam_channel::Sender<ChainCommand>,
    ids: IdAllocator,
}

impl ChainHandle {
    pub(crate) fn new(tx: crossbeam_channel::Sender<ChainCommand>, ids: IdAllocator) -> Self {
        Self { tx, ids }
    }

    pub fn send(&self, cmd: ChainCommand) -> FxResult<()> {
        self.tx
            .send(cmd)
            .map_err(|_| FxError::unavailable("effect chain dropped"))
    }

    /// Queue `effect` for appending; the id is valid immediately.
    pub fn push(&self, effect: Effect) -> FxResult<EffectId> {
        let id = self.ids.next();
        self.send(ChainCommand::Push {
            id,
            effect: Box::new(effect),
        })?;
        Ok(id)
    }

    pub fn remove(&self, id: EffectId) -> FxResult<()> {
        self.send(ChainCommand::Remove(id))
    }

    pub fn clear(&self) -> FxResult<()> {
        self.send(ChainCommand::Clear)
    }

    pub fn set_param(&self, id: EffectId, key: &str, value: impl Into<ParamValue>) -> FxResult<()> {
        self.send(ChainCommand::SetParam {
            id,
            key: key.to_owned(),
            value: value.into(),
        })
    }

    pub fn set_intensity(&self, id: EffectId, intensity: f32) -> FxResult<()> {
        self.send(ChainCommand::SetIntensity { id, intensity })
    }

    pub fn toggle(&self, id: EffectId) -> FxResult<()> {
        self.send(ChainCommand::Toggle(id))
    }

    pub fn trigger(&self, id: EffectId, x: f32, y: f32) -> FxResult<()> {
        self.send(ChainCommand::Trigger { id, x, y })
    }

    /// Build `preset` on the calling thread and queue it as a full replacement.
    pub fn load_preset(&self, preset: &Preset, registry: &EffectRegistry) -> FxResult<Vec<EffectId>> {
        let mut effects = Vec::with_capacity(preset.effects.len());
        for entry in &preset.effects {
            effects.push((self.ids.next(), registry.build(entry)?));
        }
        let ids = effects.iter().map(|(id, _)| *id).collect();
        self.send(ChainCommand::Replace(effects))?;
        Ok(ids)
    }
}
