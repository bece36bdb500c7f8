// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounded snapshot history.
//!
//! Full-config snapshots, not structural diffs: the configs involved
//! are small and the simplicity pays for itself. The undo stack is a
//! sliding window — at the cap, pushing evicts the oldest snapshot;
//! any new snapshot clears the redo stack.

use std::collections::VecDeque;
use tiledeck_model::Config;

/// Maximum number of undo snapshots retained.
pub const HISTORY_CAP: usize = 50;

/// Undo/redo stacks over config snapshots.
#[derive(Debug, Default, Clone)]
pub struct History {
    past: VecDeque<Config>,
    future: Vec<Config>,
}

impl History {
    /// Empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pre-mutation snapshot. Evicts the oldest entry at the
    /// cap and clears the redo stack.
    pub fn record(&mut self, snapshot: Config) {
        if self.past.len() == HISTORY_CAP {
            self.past.pop_front();
        }
        self.past.push_back(snapshot);
        self.future.clear();
    }

    /// Step back: exchange `current` for the latest snapshot. Returns
    /// `None` (leaving `current` untouched) when there is nothing to
    /// undo.
    pub fn undo(&mut self, current: &Config) -> Option<Config> {
        let previous = self.past.pop_back()?;
        self.future.push(current.clone());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Config) -> Option<Config> {
        let next = self.future.pop()?;
        self.past.push_back(current.clone());
        Some(next)
    }

    /// True when an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// True when a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
