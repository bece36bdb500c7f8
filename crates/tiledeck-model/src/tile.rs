// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tiles: placed, interactive display elements.

use crate::field::FieldValue;
use crate::ident::TileId;
use serde::{Deserialize, Serialize};

/// Sentinel coordinate for a tile that has not been placed on the grid.
pub const UNPLACED: i32 = -1;

/// A single interactive/display element on a page.
///
/// Placement invariant: either both coordinates are `>= 0` (placed) or
/// both are exactly [`UNPLACED`] (staged). Staged tiles are excluded
/// from every coverage query but are always retained by the store and
/// the codec — shrinking a page or running out of cells never silently
/// drops a tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Process-local id; never wire-visible.
    pub id: TileId,
    /// Capability discriminant (`ha_action`, `move_page`, ...).
    /// Immutable after creation.
    pub kind: String,
    /// Grid column of the anchor cell.
    pub x: i32,
    /// Grid row of the anchor cell.
    pub y: i32,
    /// Horizontal span in cells; `None` means 1.
    #[serde(default)]
    pub x_span: Option<u16>,
    /// Vertical span in cells; `None` means 1.
    #[serde(default)]
    pub y_span: Option<u16>,
    /// Type-specific fields, in insertion order.
    #[serde(default)]
    pub fields: Vec<(String, FieldValue)>,
}

impl Tile {
    /// A new staged tile of the given kind with no fields.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: TileId::fresh(),
            kind: kind.into(),
            x: UNPLACED,
            y: UNPLACED,
            x_span: None,
            y_span: None,
            fields: Vec::new(),
        }
    }

    /// True when the tile has a grid anchor.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// Horizontal span, defaulted.
    #[must_use]
    pub fn x_span_cells(&self) -> i32 {
        i32::from(self.x_span.unwrap_or(1).max(1))
    }

    /// Vertical span, defaulted.
    #[must_use]
    pub fn y_span_cells(&self) -> i32 {
        i32::from(self.y_span.unwrap_or(1).max(1))
    }

    /// True when the tile's occupied rectangle includes `(cx, cy)`.
    /// Staged tiles cover nothing.
    #[must_use]
    pub fn covers(&self, cx: i32, cy: i32) -> bool {
        self.is_placed()
            && cx >= self.x
            && cx < self.x + self.x_span_cells()
            && cy >= self.y
            && cy < self.y + self.y_span_cells()
    }

    /// True when the tile's anchor is exactly `(cx, cy)`.
    #[must_use]
    pub fn starts_at(&self, cx: i32, cy: i32) -> bool {
        self.is_placed() && self.x == cx && self.y == cy
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Insert or replace a field, preserving the position of an existing
    /// entry so serialization order stays stable across edits.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Remove a field by name, returning its value if present.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_tile_covers_nothing() {
        let tile = Tile::new("title");
        assert!(!tile.is_placed());
        assert!(!tile.covers(0, 0));
        assert!(!tile.covers(UNPLACED, UNPLACED));
    }

    #[test]
    fn span_coverage() {
        let mut tile = Tile::new("ha_action");
        tile.x = 1;
        tile.y = 0;
        tile.x_span = Some(2);
        assert!(tile.covers(1, 0));
        assert!(tile.covers(2, 0));
        assert!(!tile.covers(3, 0));
        assert!(tile.starts_at(1, 0));
        assert!(!tile.starts_at(2, 0));
    }

    #[test]
    fn set_field_keeps_position() {
        let mut tile = Tile::new("function");
        tile.set_field("on_press", FieldValue::from("beep"));
        tile.set_field("on_release", FieldValue::from("boop"));
        tile.set_field("on_press", FieldValue::from("blink"));
        assert_eq!(tile.fields[0].0, "on_press");
        assert_eq!(tile.field("on_press").and_then(FieldValue::as_str), Some("blink"));
    }
}
