//! Registry of in-flight cancellable effects.
//!
//! Each [`EffectId`] owns at most one running task. Registering a new task
//! under an id aborts the one already there; a task that finishes on its own
//! removes its entry only while it is still the registered generation, so a
//! late finisher never evicts its replacement.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taskboard_core::effect::EffectId;
use tokio::task::AbortHandle;

#[derive(Debug)]
struct Entry {
    generation: u64,
    handle: AbortHandle,
}

/// Shared map `EffectId → (generation, AbortHandle)`
#[derive(Debug, Clone, Default)]
pub(crate) struct Cancellations {
    entries: Arc<Mutex<HashMap<EffectId, Entry>>>,
    generations: Arc<AtomicU64>,
}

/// Exclusive access to the registry while a replacement task is spawned
pub(crate) struct Registration<'a> {
    entries: MutexGuard<'a, HashMap<EffectId, Entry>>,
    id: EffectId,
    generation: u64,
}

impl Cancellations {
    fn lock(&self) -> MutexGuard<'_, HashMap<EffectId, Entry>> {
        // The map holds no invariants a panicking holder could break.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start registering a task under `id`
    ///
    /// The registry stays locked until [`Registration::commit`], so the task
    /// being spawned cannot finish and deregister before it is recorded.
    pub(crate) fn begin(&self, id: EffectId) -> Registration<'_> {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        Registration {
            entries: self.lock(),
            id,
            generation,
        }
    }

    /// Abort the task registered under `id`, if any
    pub(crate) fn cancel(&self, id: EffectId) -> bool {
        let removed = self.lock().remove(&id);
        match removed {
            Some(entry) => {
                entry.handle.abort();
                tracing::debug!(effect_id = %id, generation = entry.generation, "Cancelled effect");
                metrics::counter!("store.effects.cancelled", "reason" => "cancel").increment(1);
                true
            },
            None => {
                tracing::trace!(effect_id = %id, "Nothing to cancel");
                false
            },
        }
    }

    /// Drop the entry for `id` if `generation` is still the registered one
    pub(crate) fn finish(&self, id: EffectId, generation: u64) {
        let mut entries = self.lock();
        if entries
            .get(&id)
            .is_some_and(|entry| entry.generation == generation)
        {
            entries.remove(&id);
        }
    }

    /// Abort every registered task
    pub(crate) fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        for (id, entry) in &drained {
            entry.handle.abort();
            tracing::debug!(effect_id = %id, "Cancelled effect on shutdown");
        }
        drained.len()
    }

    /// Whether a task is registered under `id`
    pub(crate) fn is_registered(&self, id: EffectId) -> bool {
        self.lock().contains_key(&id)
    }
}

impl Registration<'_> {
    /// Generation the new task must pass to [`Cancellations::finish`]
    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    /// Record `handle` under the id, aborting whatever it replaces
    pub(crate) fn commit(mut self, handle: AbortHandle) {
        let previous = self.entries.insert(
            self.id,
            Entry {
                generation: self.generation,
                handle,
            },
        );
        if let Some(previous) = previous {
            previous.handle.abort();
            tracing::debug!(
                effect_id = %self.id,
                superseded = previous.generation,
                generation = self.generation,
                "Superseded pending effect"
            );
            metrics::counter!("store.effects.cancelled", "reason" => "superseded").increment(1);
        }
    }
}
