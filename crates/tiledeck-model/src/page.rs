// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pages: grid-addressable screens.

use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page-level behavior marker. The vocabulary is closed; unknown names
/// are rejected at the parsing boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFlag {
    /// The page the device falls back to.
    Base,
    /// The page is left automatically after a timeout.
    Temporary,
    /// The page always refreshes on the fast path.
    FastRefresh,
}

/// Error for page-flag names outside the fixed vocabulary.
#[derive(Debug, Error)]
#[error("unknown page flag: {0}")]
pub struct UnknownFlag(pub String);

impl PageFlag {
    /// The wire spelling of this flag.
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::Temporary => "TEMPORARY",
            Self::FastRefresh => "FAST_REFRESH",
        }
    }
}

impl std::str::FromStr for PageFlag {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BASE" => Ok(Self::Base),
            "TEMPORARY" => Ok(Self::Temporary),
            "FAST_REFRESH" => Ok(Self::FastRefresh),
            other => Err(UnknownFlag(other.to_owned())),
        }
    }
}

/// One grid-addressable screen.
///
/// The page id doubles as a cross-reference target: navigation tiles on
/// any page may name it as a destination, which is why renaming a page
/// is a document-wide operation (see the store).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Globally unique page id.
    pub id: String,
    /// Tiles in insertion order. Order is irrelevant to placement but
    /// preserved for stable serialization.
    #[serde(default)]
    pub tiles: Vec<Tile>,
    /// Grid height in cells.
    pub rows: u16,
    /// Grid width in cells.
    pub cols: u16,
    /// Behavior markers.
    #[serde(default)]
    pub flags: Vec<PageFlag>,
}

impl Page {
    /// An empty page with the given id and dimensions.
    #[must_use]
    pub fn new(id: impl Into<String>, rows: u16, cols: u16) -> Self {
        Self {
            id: id.into(),
            tiles: Vec::new(),
            rows,
            cols,
            flags: Vec::new(),
        }
    }

    /// Look up a tile by id.
    #[must_use]
    pub fn tile(&self, id: crate::ident::TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_round_trip() {
        for flag in [PageFlag::Base, PageFlag::Temporary, PageFlag::FastRefresh] {
            assert_eq!(flag.as_wire().parse::<PageFlag>().ok(), Some(flag));
        }
        assert!("SHINY".parse::<PageFlag>().is_err());
    }
}
