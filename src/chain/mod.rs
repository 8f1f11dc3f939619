//! Ordered, mutable effect chains.
//!
//! Entries are addressed by [`EffectId`], not by kind: the same kind may appear any number of
//! times. A failing effect is skipped for that cycle (its partial output is rolled back) and
//! disabled after `failure_limit` consecutive failures.

pub mod command;

use crate::effects::Effect;
use crate::effects::context::FrameContext;
use crate::effects::params::ParamValue;
use crate::foundation::error::{FxError, FxResult};
use crate::preset::EffectEntry;
use crate::surface::frame::Frame;
use command::{ChainCommand, ChainHandle};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_FAILURE_LIMIT: u32 = 3;

/// Identity of one chain entry. Unique per chain for its whole lifetime.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EffectId(pub u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fx#{}", self.0)
    }
}

/// Shared id allocator so handles on other threads can name effects before they land.
#[derive(Clone, Debug, Default)]
pub(crate) struct IdAllocator(Arc<AtomicU64>);

impl IdAllocator {
    pub(crate) fn next(&self) -> EffectId {
        EffectId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct Slot {
    id: EffectId,
    effect: Effect,
    failures: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectFailure {
    pub id: EffectId,
    pub effect: &'static str,
    pub error: String,
}

/// Outcome of one [`EffectChain::process`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainReport {
    /// Effects that ran to completion.
    pub applied: usize,
    pub failures: Vec<EffectFailure>,
    /// Effects disabled this cycle after reaching the failure limit.
    pub auto_disabled: Vec<EffectId>,
}

impl ChainReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct EffectChain {
    slots: Vec<Slot>,
    ids: IdAllocator,
    failure_limit: u32,
    rollback: Vec<u8>,
    commands: (
        crossbeam_channel::Sender<ChainCommand>,
        crossbeam_channel::Receiver<ChainCommand>,
    ),
}

impl fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectChain")
            .field("effects", &self.iter().map(|(id, fx)| (id, fx.name())).collect::<Vec<_>>())
            .field("failure_limit", &self.failure_limit)
            .finish()
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectChain {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            ids: IdAllocator::default(),
            failure_limit: DEFAULT_FAILURE_LIMIT,
            rollback: Vec::new(),
            commands: crossbeam_channel::unbounded(),
        }
    }

    /// Consecutive failures before an effect is disabled; `0` never disables.
    pub fn with_failure_limit(mut self, limit: u32) -> Self {
        self.failure_limit = limit;
        self
    }

    pub fn failure_limit(&self) -> u32 {
        self.failure_limit
    }

    /// Sender for mutations from other threads, applied by [`EffectChain::drain_commands`].
    pub fn handle(&self) -> ChainHandle {
        ChainHandle::new(self.commands.0.clone(), self.ids.clone())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append `effect` at the end of the chain.
    pub fn push(&mut self, effect: Effect) -> EffectId {
        let id = self.ids.next();
        self.push_with_id(id, effect);
        id
    }

    fn push_with_id(&mut self, id: EffectId, effect: Effect) {
        tracing::debug!(%id, effect = effect.name(), "effect added");
        self.slots.push(Slot {
            id,
            effect,
            failures: 0,
        });
    }

    /// Insert at `index` (clamped to the chain length).
    pub fn insert(&mut self, index: usize, effect: Effect) -> EffectId {
        let id = self.ids.next();
        let index = index.min(self.slots.len());
        self.slots.insert(
            index,
            Slot {
                id,
                effect,
                failures: 0,
            },
        );
        id
    }

    /// Remove one entry by identity; its resources are released before it is returned.
    pub fn remove(&mut self, id: EffectId) -> Option<Effect> {
        let pos = self.position(id)?;
        let mut slot = self.slots.remove(pos);
        slot.effect.release();
        tracing::debug!(%id, effect = slot.effect.name(), "effect removed");
        Some(slot.effect)
    }

    /// Move an entry to `index` (clamped). Returns `false` for unknown ids.
    pub fn move_to(&mut self, id: EffectId, index: usize) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let slot = self.slots.remove(pos);
        let index = index.min(self.slots.len());
        self.slots.insert(index, slot);
        true
    }

    /// Release and drop every effect.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.effect.release();
        }
        self.slots.clear();
    }

    /// Drop every effect's resources but keep the chain configured.
    pub fn release(&mut self) {
        for slot in &mut self.slots {
            slot.effect.release();
        }
        self.rollback = Vec::new();
    }

    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.slots.iter().find(|s| s.id == id).map(|s| &s.effect)
    }

    pub fn get_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| &mut s.effect)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectId, &Effect)> {
        self.slots.iter().map(|s| (s.id, &s.effect))
    }

    pub fn ids(&self) -> Vec<EffectId> {
        self.slots.iter().map(|s| s.id).collect()
    }

    pub fn set_param(
        &mut self,
        id: EffectId,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> FxResult<()> {
        self.effect_mut(id)?.set_param(key, value)
    }

    pub fn set_intensity(&mut self, id: EffectId, intensity: f32) -> FxResult<()> {
        self.effect_mut(id)?.set_intensity(intensity)
    }

    /// Flip the enabled flag. Re-enabling also resets the failure count.
    pub fn toggle(&mut self, id: EffectId) -> FxResult<bool> {
        let slot = self.slot_mut(id)?;
        let enabled = slot.effect.toggle();
        if enabled {
            slot.failures = 0;
        }
        Ok(enabled)
    }

    pub fn set_enabled(&mut self, id: EffectId, enabled: bool) -> FxResult<()> {
        let slot = self.slot_mut(id)?;
        slot.effect.set_enabled(enabled);
        if enabled {
            slot.failures = 0;
        }
        Ok(())
    }

    pub fn trigger(&mut self, id: EffectId, x: f32, y: f32) -> FxResult<bool> {
        Ok(self.effect_mut(id)?.trigger(x, y))
    }

    pub fn set_image(&mut self, id: EffectId, image: Option<Arc<Frame>>) -> FxResult<()> {
        self.effect_mut(id)?.set_image(image)
    }

    /// Preset entries for the current configuration, in chain order.
    pub fn snapshot(&self) -> Vec<EffectEntry> {
        self.slots.iter().map(|s| s.effect.snapshot()).collect()
    }

    /// Apply every queued [`ChainCommand`]. Returns how many were applied successfully.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(cmd) = self.commands.1.try_recv() {
            match self.execute(cmd) {
                Ok(()) => applied += 1,
                Err(e) => tracing::warn!(error = %e, "chain command rejected"),
            }
        }
        applied
    }

    fn execute(&mut self, cmd: ChainCommand) -> FxResult<()> {
        match cmd {
            ChainCommand::Push { id, effect } => {
                self.push_with_id(id, *effect);
                Ok(())
            }
            ChainCommand::Remove(id) => self
                .remove(id)
                .map(drop)
                .ok_or_else(|| unknown(id)),
            ChainCommand::Clear => {
                self.clear();
                Ok(())
            }
            ChainCommand::Replace(effects) => {
                self.clear();
                for (id, effect) in effects {
                    self.push_with_id(id, effect);
                }
                Ok(())
            }
            ChainCommand::MoveTo { id, index } => {
                if self.move_to(id, index) {
                    Ok(())
                } else {
                    Err(unknown(id))
                }
            }
            ChainCommand::SetParam { id, key, value } => self.set_param(id, &key, value),
            ChainCommand::SetIntensity { id, intensity } => self.set_intensity(id, intensity),
            ChainCommand::Toggle(id) => self.toggle(id).map(drop),
            ChainCommand::SetEnabled { id, enabled } => self.set_enabled(id, enabled),
            ChainCommand::Trigger { id, x, y } => self.trigger(id, x, y).map(drop),
            ChainCommand::SetImage { id, image } => self.set_image(id, image),
        }
    }

    /// Run every enabled effect over `frame`, in order.
    #[tracing::instrument(level = "trace", skip_all, fields(seq = ctx.seq.0))]
    pub fn process(&mut self, frame: &mut Frame, ctx: &mut FrameContext<'_>) -> ChainReport {
        let mut report = ChainReport::default();
        for slot in &mut self.slots {
            if !slot.effect.is_enabled() || slot.effect.intensity() <= 0.0 {
                continue;
            }
            self.rollback.clone_from(&frame.data);
            match slot.effect.apply(frame, ctx) {
                Ok(()) => {
                    slot.failures = 0;
                    report.applied += 1;
                }
                Err(e) => {
                    std::mem::swap(&mut frame.data, &mut self.rollback);
                    slot.failures = slot.failures.saturating_add(1);
                    tracing::warn!(
                        id = %slot.id,
                        effect = slot.effect.name(),
                        failures = slot.failures,
                        error = %e,
                        "effect failed, skipped"
                    );
                    report.failures.push(EffectFailure {
                        id: slot.id,
                        effect: slot.effect.name(),
                        error: e.to_string(),
                    });
                    if self.failure_limit > 0 && slot.failures >= self.failure_limit {
                        slot.effect.set_enabled(false);
                        tracing::warn!(id = %slot.id, effect = slot.effect.name(), "effect auto-disabled");
                        report.auto_disabled.push(slot.id);
                    }
                }
            }
        }
        report
    }

    fn position(&self, id: EffectId) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: EffectId) -> FxResult<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| unknown(id))
    }

    fn effect_mut(&mut self, id: EffectId) -> FxResult<&mut Effect> {
        self.slot_mut(id).map(|s| &mut s.effect)
    }
}

fn unknown(id: EffectId) -> FxError {
    FxError::validation(format!("no effect {id} in chain"))
}

#[cfg(test)]
#[path = "../../tests/unit/chain/mod.rs"]
mod tests;
