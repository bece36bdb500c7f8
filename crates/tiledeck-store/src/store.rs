// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The tile configuration store.
//!
//! Every mutating operation works on a clone of the current config and
//! commits it atomically: the pre-mutation snapshot goes onto the undo
//! stack, the redo stack empties, and the new state is mirrored
//! through the persistence port. Precondition violations come back as
//! [`StoreError`] no-ops.

use thiserror::Error;
use tiledeck_model::{
    first_free_cell, Config, FieldDefault, FieldValue, Page, Tile, TileCatalog, TileId,
    DEFAULT_PAGE_ID, UNPLACED,
};
use tracing::{debug, warn};

use crate::history::History;
use crate::persist::{load_state, save_state, StatePort};

/// A store operation precondition failed; the config is unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The last remaining page cannot be deleted.
    #[error("cannot delete the last remaining page")]
    LastPage,
    /// Page ids cannot be empty.
    #[error("page id cannot be empty")]
    EmptyPageId,
    /// Another page already uses this id.
    #[error("page id {0:?} already exists")]
    DuplicatePageId(String),
    /// No page with this id.
    #[error("no page with id {0:?}")]
    UnknownPage(String),
    /// No tile with this id.
    #[error("no tile with id {0}")]
    UnknownTile(TileId),
    /// Clearing the whole configuration needs caller-side confirmation.
    #[error("clearing the configuration requires confirmation")]
    NotConfirmed,
}

/// The mutable aggregate behind one editor session.
pub struct TileStore<P: StatePort> {
    config: Config,
    history: History,
    catalog: Box<dyn TileCatalog>,
    port: P,
    active_page_id: String,
    selected_tile_id: Option<TileId>,
}

impl<P: StatePort> TileStore<P> {
    /// Build a store, loading persisted state through the port when a
    /// snapshot exists (a broken snapshot is logged and replaced by
    /// the default config, never fatal).
    pub fn new(catalog: Box<dyn TileCatalog>, port: P) -> Self {
        let config = match load_state(&port) {
            Ok(Some(config)) if !config.pages.is_empty() => config,
            Ok(Some(_)) => {
                warn!("persisted state has no pages, starting fresh");
                Config::default()
            }
            Ok(None) => Config::default(),
            Err(err) => {
                warn!(%err, "failed to load persisted state, starting fresh");
                Config::default()
            }
        };
        let active_page_id = config.pages[0].id.clone();
        Self {
            config,
            history: History::new(),
            catalog,
            port,
            active_page_id,
            selected_tile_id: None,
        }
    }

    /// The current config.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The catalog this store resolves kinds and defaults against.
    #[must_use]
    pub fn catalog(&self) -> &dyn TileCatalog {
        self.catalog.as_ref()
    }

    /// Id of the page currently being edited.
    #[must_use]
    pub fn active_page_id(&self) -> &str {
        &self.active_page_id
    }

    /// The page currently being edited.
    #[must_use]
    pub fn active_page(&self) -> &Page {
        self.config
            .page(&self.active_page_id)
            .unwrap_or(&self.config.pages[0])
    }

    /// Id of the selected tile, if any.
    #[must_use]
    pub fn selected_tile_id(&self) -> Option<TileId> {
        self.selected_tile_id
    }

    /// The selected tile, if it still exists.
    #[must_use]
    pub fn selected_tile(&self) -> Option<&Tile> {
        self.selected_tile_id
            .and_then(|id| self.config.find_tile(id))
            .map(|(_, tile)| tile)
    }

    /// True when an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// True when a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Change the selected tile. Selection is not part of undo history.
    pub fn select_tile(&mut self, id: Option<TileId>) {
        self.selected_tile_id = id;
    }

    /// Switch the page being edited.
    pub fn set_active_page(&mut self, id: &str) -> Result<(), StoreError> {
        if self.config.page(id).is_none() {
            return Err(StoreError::UnknownPage(id.to_owned()));
        }
        self.active_page_id = id.to_owned();
        Ok(())
    }

    fn commit(&mut self, next: Config) {
        let previous = std::mem::replace(&mut self.config, next);
        self.history.record(previous);
        self.after_state_change();
    }

    fn after_state_change(&mut self) {
        // Re-point dangling references before anyone observes them.
        if self.config.page(&self.active_page_id).is_none() {
            self.active_page_id = self.config.pages[0].id.clone();
        }
        if let Some(id) = self.selected_tile_id {
            if self.config.find_tile(id).is_none() {
                self.selected_tile_id = None;
            }
        }
        if let Err(err) = save_state(&self.port, &self.config) {
            warn!(%err, "failed to persist state");
        }
    }

    /// Create a tile of the given kind on the active page.
    ///
    /// Placement: the first anchor-free cell in row-major order, or
    /// staged at (-1,-1) when the grid is full. Catalog defaults are
    /// applied (navigation tiles start pointing at the first page) and
    /// the new tile becomes the selection.
    pub fn add_tile(&mut self, kind: &str) -> TileId {
        let mut next = self.config.clone();
        let first_page_id = next.pages[0].id.clone();
        let active = self.active_page_id.clone();

        let mut tile = Tile::new(kind);
        for (name, default) in self.catalog.defaults(kind) {
            let value = match default {
                FieldDefault::Value(value) => value,
                FieldDefault::FirstPage => FieldValue::Str(first_page_id.clone()),
            };
            tile.set_field(name, value);
        }
        let id = tile.id;

        if let Some(page) = next.page_mut(&active) {
            if let Some((x, y)) = first_free_cell(page) {
                tile.x = x;
                tile.y = y;
            }
            page.tiles.push(tile);
        }
        debug!(kind, %id, "added tile");
        self.commit(next);
        self.selected_tile_id = Some(id);
        id
    }

    /// Clone a tile in place: fresh id, same placement. The duplicate
    /// deliberately lands on the already-occupied cell — overlap is
    /// legal and the cell cycler sorts it out.
    pub fn duplicate_tile(&mut self, id: TileId) -> Result<TileId, StoreError> {
        let mut next = self.config.clone();
        let mut duplicate = None;
        for page in &mut next.pages {
            if let Some(tile) = page.tiles.iter().find(|t| t.id == id) {
                let mut copy = tile.clone();
                copy.id = TileId::fresh();
                duplicate = Some(copy.id);
                page.tiles.push(copy);
                break;
            }
        }
        let copy_id = duplicate.ok_or(StoreError::UnknownTile(id))?;
        debug!(%id, %copy_id, "duplicated tile");
        self.commit(next);
        self.selected_tile_id = Some(copy_id);
        Ok(copy_id)
    }

    /// Replace a tile wholesale, matched by id.
    pub fn update_tile(&mut self, tile: Tile) -> Result<(), StoreError> {
        let mut next = self.config.clone();
        let slot = next
            .pages
            .iter_mut()
            .flat_map(|p| p.tiles.iter_mut())
            .find(|t| t.id == tile.id)
            .ok_or(StoreError::UnknownTile(tile.id))?;
        *slot = tile;
        self.commit(next);
        Ok(())
    }

    /// Remove a tile by id, dropping it from the selection if needed.
    pub fn delete_tile(&mut self, id: TileId) -> Result<(), StoreError> {
        let mut next = self.config.clone();
        let mut found = false;
        for page in &mut next.pages {
            let before = page.tiles.len();
            page.tiles.retain(|t| t.id != id);
            if page.tiles.len() != before {
                found = true;
                break;
            }
        }
        if !found {
            return Err(StoreError::UnknownTile(id));
        }
        debug!(%id, "deleted tile");
        self.commit(next);
        Ok(())
    }

    /// Place a tile on a collaborator-resolved drop target. No
    /// occupancy check — overlap is permitted by design. Negative
    /// coordinates stage the tile at exactly (-1,-1).
    pub fn move_tile(&mut self, id: TileId, x: i32, y: i32) -> Result<(), StoreError> {
        let mut next = self.config.clone();
        let tile = next
            .pages
            .iter_mut()
            .flat_map(|p| p.tiles.iter_mut())
            .find(|t| t.id == id)
            .ok_or(StoreError::UnknownTile(id))?;
        if x < 0 || y < 0 {
            tile.x = UNPLACED;
            tile.y = UNPLACED;
        } else {
            tile.x = x;
            tile.y = y;
        }
        self.commit(next);
        Ok(())
    }

    /// Append a new empty page and make it active.
    pub fn add_page(&mut self, id: &str, rows: u16, cols: u16) -> Result<(), StoreError> {
        if id.trim().is_empty() {
            return Err(StoreError::EmptyPageId);
        }
        if self.config.page(id).is_some() {
            return Err(StoreError::DuplicatePageId(id.to_owned()));
        }
        let mut next = self.config.clone();
        next.pages.push(Page::new(id, rows, cols));
        self.commit(next);
        self.active_page_id = id.to_owned();
        Ok(())
    }

    /// Replace a page wholesale (dimensions, flags, tiles), matched by
    /// id.
    pub fn update_page(&mut self, page: Page) -> Result<(), StoreError> {
        let mut next = self.config.clone();
        let slot = next
            .pages
            .iter_mut()
            .find(|p| p.id == page.id)
            .ok_or_else(|| StoreError::UnknownPage(page.id.clone()))?;
        *slot = page;
        self.commit(next);
        Ok(())
    }

    /// Delete a page. The last remaining page is protected; deleting
    /// the active page activates the first remaining one.
    pub fn delete_page(&mut self, id: &str) -> Result<(), StoreError> {
        if self.config.pages.len() <= 1 {
            return Err(StoreError::LastPage);
        }
        if self.config.page(id).is_none() {
            return Err(StoreError::UnknownPage(id.to_owned()));
        }
        let mut next = self.config.clone();
        next.pages.retain(|p| p.id != id);
        debug!(page = id, "deleted page");
        self.commit(next);
        Ok(())
    }

    /// Rename a page and rewrite every reference to it.
    ///
    /// This is the one place a "simple rename" is a document-wide
    /// consistency operation: every page-reference field on every tile
    /// of every page (navigation destinations, fallback display pages
    /// — whichever fields the catalog declares as page references)
    /// that names the old id is rewritten to the new one.
    pub fn rename_page(&mut self, old_id: &str, new_id: &str) -> Result<(), StoreError> {
        if old_id == new_id {
            return Ok(());
        }
        if new_id.trim().is_empty() {
            return Err(StoreError::EmptyPageId);
        }
        if self.config.page(new_id).is_some() {
            return Err(StoreError::DuplicatePageId(new_id.to_owned()));
        }
        if self.config.page(old_id).is_none() {
            return Err(StoreError::UnknownPage(old_id.to_owned()));
        }

        let mut next = self.config.clone();
        for page in &mut next.pages {
            if page.id == old_id {
                page.id = new_id.to_owned();
            }
            for tile in &mut page.tiles {
                for field in self.catalog.page_ref_fields(&tile.kind) {
                    if tile.field(field).and_then(FieldValue::as_str) == Some(old_id) {
                        tile.set_field(field, FieldValue::Str(new_id.to_owned()));
                    }
                }
            }
        }
        debug!(old = old_id, new = new_id, "renamed page");
        let follow = self.active_page_id == old_id;
        self.commit(next);
        if follow {
            self.active_page_id = new_id.to_owned();
        }
        Ok(())
    }

    /// Reset to the single default page, wiping history, selection,
    /// and the persisted snapshot. Irreversible — the caller must have
    /// confirmed with the user first.
    pub fn clear(&mut self, confirmed: bool) -> Result<(), StoreError> {
        if !confirmed {
            return Err(StoreError::NotConfirmed);
        }
        self.config = Config::default();
        self.history.clear();
        self.selected_tile_id = None;
        self.active_page_id = self.config.pages[0].id.clone();
        if let Err(err) = self.port.clear() {
            warn!(%err, "failed to clear persisted state");
        }
        Ok(())
    }

    /// Step back one mutation. Returns false when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.config) {
            Some(previous) => {
                self.config = previous;
                self.after_state_change();
                true
            }
            None => false,
        }
    }

    /// Step forward again after an undo. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.config) {
            Some(next) => {
                self.config = next;
                self.after_state_change();
                true
            }
            None => false,
        }
    }

    /// Replace the whole config (project load). The previous state
    /// stays undoable.
    pub fn replace_config(&mut self, config: Config) {
        let mut next = config;
        if next.pages.is_empty() {
            next.pages.push(Page::new(DEFAULT_PAGE_ID, 2, 3));
        }
        let first = next.pages[0].id.clone();
        self.commit(next);
        self.active_page_id = first;
        self.selected_tile_id = None;
    }
}
