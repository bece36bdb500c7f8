// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier utilities.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TILE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-local identifier for a tile.
///
/// Tile ids exist only for in-memory referencing (selection, undo,
/// duplicate/delete by id) and are never part of the wire document; a
/// debug export may embed them under the reserved `__id` key, but a
/// reload always assigns fresh ids. Ids are allocated from a process-wide
/// counter and are unique within a process lifetime, nothing more —
/// tooling must not treat them as stable across sessions.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl TileId {
    /// Allocate a fresh id, distinct from every id handed out before it
    /// in this process.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_TILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}
