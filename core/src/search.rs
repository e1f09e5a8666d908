//! State of a debounced search input.
//!
//! Keystrokes update the raw query immediately; the effective term the
//! projection uses only changes when a delayed apply for the *latest*
//! keystroke arrives. Every keystroke gets a new generation number and the
//! delayed apply carries it, so an apply scheduled for an older keystroke is
//! recognised as stale and ignored.

use crate::effect::EffectId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effect id owning the pending delayed apply of the search input
pub const SEARCH_DEBOUNCE: EffectId = EffectId::new("search-debounce");

/// Quiet period after the last keystroke before the search applies
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Raw and effective search terms of one search input
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    raw: String,
    effective: String,
    generation: u64,
    applied_generation: u64,
    applied_count: u64,
}

impl SearchState {
    /// An empty search input
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What the user has typed so far
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The term the projection currently filters by
    #[must_use]
    pub fn effective(&self) -> &str {
        &self.effective
    }

    /// Generation of the latest keystroke
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// How many times the effective term has been applied
    #[must_use]
    pub const fn applied_count(&self) -> u64 {
        self.applied_count
    }

    /// Whether a keystroke is waiting for its delayed apply
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.generation != self.applied_generation
    }

    /// Record a keystroke and return the generation its delayed apply must carry
    pub fn keystroke(&mut self, query: impl Into<String>) -> u64 {
        self.raw = query.into();
        self.generation += 1;
        self.generation
    }

    /// Apply the raw query if `generation` belongs to the latest keystroke
    ///
    /// Returns `false` (and changes nothing) for a stale generation or one
    /// that has already been applied.
    pub fn apply(&mut self, generation: u64) -> bool {
        if generation != self.generation || generation == self.applied_generation {
            return false;
        }
        self.effective.clone_from(&self.raw);
        self.applied_generation = generation;
        self.applied_count += 1;
        true
    }
}
