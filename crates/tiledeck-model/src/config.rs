// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The root configuration aggregate.

use crate::ident::TileId;
use crate::page::Page;
use crate::tile::Tile;
use serde::{Deserialize, Serialize};

/// Default storage location for a project.
pub const DEFAULT_PROJECT_PATH: &str = "tiles.yaml";

/// Id of the page every fresh project starts with.
pub const DEFAULT_PAGE_ID: &str = "main_page";

/// The root aggregate: every page plus project-level bindings.
///
/// Invariant (enforced by the store): `pages` is never empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pages in presentation order.
    pub pages: Vec<Page>,
    /// Names of runtime entity bindings referenced anywhere in the
    /// document. Derived on load; kept deduplicated, insertion-ordered.
    #[serde(default)]
    pub dynamic_entities: Vec<String>,
    /// Opaque storage location. Not part of the domain model proper and
    /// never serialized to the wire document.
    #[serde(default = "default_project_path")]
    pub project_path: String,
}

fn default_project_path() -> String {
    DEFAULT_PROJECT_PATH.to_owned()
}

impl Config {
    /// Look up a page by id.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Mutable page lookup by id.
    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// Find a tile anywhere in the config, together with its page id.
    #[must_use]
    pub fn find_tile(&self, id: TileId) -> Option<(&str, &Tile)> {
        self.pages.iter().find_map(|p| {
            p.tiles
                .iter()
                .find(|t| t.id == id)
                .map(|t| (p.id.as_str(), t))
        })
    }

    /// Record a dynamic-entity name, keeping the list deduplicated.
    pub fn add_dynamic_entity(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() && !self.dynamic_entities.iter().any(|n| *n == name) {
            self.dynamic_entities.push(name);
        }
    }
}

impl Default for Config {
    /// A fresh project: one empty 2×3 page.
    fn default() -> Self {
        Self {
            pages: vec![Page::new(DEFAULT_PAGE_ID, 2, 3)],
            dynamic_entities: Vec::new(),
            project_path: DEFAULT_PROJECT_PATH.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_one_page() {
        let config = Config::default();
        assert_eq!(config.pages.len(), 1);
        assert_eq!(config.pages[0].id, DEFAULT_PAGE_ID);
        assert_eq!((config.pages[0].rows, config.pages[0].cols), (2, 3));
    }

    #[test]
    fn dynamic_entities_deduplicate() {
        let mut config = Config::default();
        config.add_dynamic_entity("light");
        config.add_dynamic_entity("scene");
        config.add_dynamic_entity("light");
        config.add_dynamic_entity("");
        assert_eq!(config.dynamic_entities, ["light", "scene"]);
    }
}
