// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Grid occupancy: where a tile lives.
//!
//! A tile is anchored at `(x, y)` and occupies a `x_span × y_span`
//! rectangle of cells. Multiple tiles legally share a cell; the UI
//! resolves the overlap by cycling a per-cell active index through the
//! covering tiles ([`CellCycler`]). "Covering" and "starting" are
//! distinct queries: a tile covers every cell in its rectangle but
//! starts only at its anchor, and renderers draw it at the anchor while
//! hit-testing uses coverage.

use crate::ident::TileId;
use crate::page::Page;
use crate::tile::Tile;
use std::collections::HashMap;

/// All tiles whose occupied rectangle includes `(cx, cy)`, in page
/// order. Staged tiles never appear.
#[must_use]
pub fn covering_tiles(page: &Page, cx: i32, cy: i32) -> Vec<&Tile> {
    page.tiles.iter().filter(|t| t.covers(cx, cy)).collect()
}

/// All tiles anchored exactly at `(cx, cy)`, in page order.
#[must_use]
pub fn starting_tiles(page: &Page, cx: i32, cy: i32) -> Vec<&Tile> {
    page.tiles.iter().filter(|t| t.starts_at(cx, cy)).collect()
}

/// The first cell in row-major scan order with no tile anchored on it.
///
/// Anchors, not coverage: a spanning tile keeps only its anchor cell
/// from being offered, matching how tiles are auto-placed.
#[must_use]
pub fn first_free_cell(page: &Page) -> Option<(i32, i32)> {
    for r in 0..i32::from(page.rows) {
        for c in 0..i32::from(page.cols) {
            if !page.tiles.iter().any(|t| t.starts_at(c, r)) {
                return Some((c, r));
            }
        }
    }
    None
}

/// Per-cell active index over overlapping tiles.
///
/// When N > 1 tiles cover a cell, the index selects which one is
/// "front" there. Indices are stored raw and reduced modulo the current
/// covering count on every read, so they stay valid as tiles come and
/// go.
#[derive(Debug, Default, Clone)]
pub struct CellCycler {
    active: HashMap<(i32, i32), usize>,
}

impl CellCycler {
    /// A cycler with every cell at its first covering tile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index_for(&self, cell: (i32, i32), count: usize) -> usize {
        debug_assert!(count > 0);
        self.active.get(&cell).copied().unwrap_or(0) % count
    }

    /// The tile currently in front at `(cx, cy)`, if any covers it.
    #[must_use]
    pub fn front<'a>(&self, page: &'a Page, cx: i32, cy: i32) -> Option<&'a Tile> {
        let covering = covering_tiles(page, cx, cy);
        if covering.is_empty() {
            return None;
        }
        let idx = self.index_for((cx, cy), covering.len());
        Some(covering[idx])
    }

    /// Cycle the cell forward; returns the newly fronted tile's id.
    /// Wraps modulo the covering count.
    pub fn advance(&mut self, page: &Page, cx: i32, cy: i32) -> Option<TileId> {
        self.step(page, cx, cy, true)
    }

    /// Cycle the cell backward; returns the newly fronted tile's id.
    pub fn retreat(&mut self, page: &Page, cx: i32, cy: i32) -> Option<TileId> {
        self.step(page, cx, cy, false)
    }

    fn step(&mut self, page: &Page, cx: i32, cy: i32, forward: bool) -> Option<TileId> {
        let covering = covering_tiles(page, cx, cy);
        if covering.is_empty() {
            return None;
        }
        let len = covering.len();
        let cur = self.index_for((cx, cy), len);
        let next = if forward { (cur + 1) % len } else { (cur + len - 1) % len };
        self.active.insert((cx, cy), next);
        Some(covering[next].id)
    }

    /// Re-point every cell the given tile covers at that tile.
    ///
    /// Selecting a tile elsewhere (properties panel, another cell) must
    /// bring its whole footprint to the front at once: a multi-span
    /// tile would otherwise be front in some of its cells and buried in
    /// others. Cells the tile does not cover are left untouched.
    pub fn sync_to(&mut self, page: &Page, id: TileId) {
        let Some(tile) = page.tiles.iter().find(|t| t.id == id) else {
            return;
        };
        if !tile.is_placed() {
            return;
        }
        for cy in tile.y..tile.y + tile.y_span_cells() {
            for cx in tile.x..tile.x + tile.x_span_cells() {
                let covering = covering_tiles(page, cx, cy);
                if let Some(idx) = covering.iter().position(|t| t.id == id) {
                    self.active.insert((cx, cy), idx);
                }
            }
        }
    }

    /// Forget all per-cell indices (e.g. after a page switch).
    pub fn reset(&mut self) {
        self.active.clear();
    }
}
