// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]

use std::sync::Arc;
use tiledeck_model::{BuiltinCatalog, FieldValue, UNPLACED};
use tiledeck_store::{load_state, MemoryStatePort, NullStatePort, StoreError, TileStore};

fn store() -> TileStore<NullStatePort> {
    TileStore::new(Box::new(BuiltinCatalog), NullStatePort)
}

#[test]
fn undo_redo_symmetry_over_a_mutation_burst() {
    let mut s = store();
    let before = s.config().clone();

    let a = s.add_tile("toggle_entity");
    s.add_tile("title");
    assert!(s.add_page("porch", 2, 2).is_ok());
    assert!(s.move_tile(a, 2, 1).is_ok());
    assert!(s.rename_page("porch", "garden").is_ok());
    let after = s.config().clone();

    for _ in 0..5 {
        assert!(s.undo());
    }
    assert_eq!(s.config(), &before);
    assert!(!s.undo());

    for _ in 0..5 {
        assert!(s.redo());
    }
    assert_eq!(s.config(), &after);
    assert!(!s.redo());
}

#[test]
fn rename_cascades_into_references_on_other_pages() {
    let mut s = store();
    assert!(s.add_page("detail", 2, 3).is_ok());

    // Navigation tile on `detail` pointing back at the first page.
    let nav = s.add_tile("move_page");
    let mut tile = s.selected_tile().cloned().unwrap();
    assert_eq!(tile.id, nav);
    tile.set_field("destination", FieldValue::from("main_page"));
    assert!(s.update_tile(tile).is_ok());

    // Fallback reference on the same page.
    let action = s.add_tile("ha_action");
    let mut tile = s.selected_tile().cloned().unwrap();
    assert_eq!(tile.id, action);
    tile.set_field("display_page_if_no_entity", FieldValue::from("main_page"));
    tile.set_field("perform", FieldValue::from("main_page_script"));
    assert!(s.update_tile(tile).is_ok());

    assert!(s.rename_page("main_page", "hall").is_ok());

    let nav_dest = s
        .config()
        .find_tile(nav)
        .and_then(|(_, t)| t.field("destination"))
        .and_then(FieldValue::as_str)
        .map(ToOwned::to_owned);
    assert_eq!(nav_dest.as_deref(), Some("hall"));

    let (fallback, unrelated) = {
        let (_, t) = s.config().find_tile(action).unwrap();
        (
            t.field("display_page_if_no_entity")
                .and_then(FieldValue::as_str)
                .map(ToOwned::to_owned),
            t.field("perform")
                .and_then(FieldValue::as_str)
                .map(ToOwned::to_owned),
        )
    };
    assert_eq!(fallback.as_deref(), Some("hall"));
    // Non-reference fields that merely contain the old id are left alone.
    assert_eq!(unrelated.as_deref(), Some("main_page_script"));
}

#[test]
fn rename_preconditions_fail_as_noops() {
    let mut s = store();
    assert!(s.add_page("two", 2, 2).is_ok());
    let before = s.config().clone();

    assert_eq!(s.rename_page("two", ""), Err(StoreError::EmptyPageId));
    assert_eq!(
        s.rename_page("two", "main_page"),
        Err(StoreError::DuplicatePageId("main_page".to_owned()))
    );
    assert_eq!(
        s.rename_page("missing", "anything"),
        Err(StoreError::UnknownPage("missing".to_owned()))
    );
    assert_eq!(s.config(), &before);
}

#[test]
fn deleting_the_active_page_activates_the_first_remaining() {
    let mut s = store();
    assert!(s.add_page("second", 2, 2).is_ok());
    assert_eq!(s.active_page_id(), "second");
    assert!(s.delete_page("second").is_ok());
    assert_eq!(s.active_page_id(), "main_page");
}

#[test]
fn duplicate_lands_on_the_same_cell() {
    let mut s = store();
    let original = s.add_tile("function");
    let copy = s.duplicate_tile(original).unwrap();
    assert_ne!(original, copy);

    let (ox, oy) = s.config().find_tile(original).map(|(_, t)| (t.x, t.y)).unwrap();
    let (cx, cy) = s.config().find_tile(copy).map(|(_, t)| (t.x, t.y)).unwrap();
    assert_eq!((ox, oy), (cx, cy));
    assert_eq!(s.selected_tile_id(), Some(copy));
}

#[test]
fn deleting_a_selected_tile_clears_selection() {
    let mut s = store();
    let id = s.add_tile("title");
    assert_eq!(s.selected_tile_id(), Some(id));
    assert!(s.delete_tile(id).is_ok());
    assert_eq!(s.selected_tile_id(), None);
    assert_eq!(
        s.delete_tile(id),
        Err(StoreError::UnknownTile(id)),
        "second delete reports the missing tile"
    );
}

#[test]
fn negative_drop_targets_stage_exactly() {
    let mut s = store();
    let id = s.add_tile("function");
    assert!(s.move_tile(id, -3, 0).is_ok());
    let (x, y) = s.config().find_tile(id).map(|(_, t)| (t.x, t.y)).unwrap();
    assert_eq!((x, y), (UNPLACED, UNPLACED));
}

#[test]
fn mutations_mirror_through_the_port() {
    let port = Arc::new(MemoryStatePort::default());
    let mut s = TileStore::new(Box::new(BuiltinCatalog), Arc::clone(&port));
    s.add_tile("toggle_entity");
    let expected = s.config().clone();
    drop(s);

    // A second session over the same port sees the mutation.
    let reloaded = TileStore::new(Box::new(BuiltinCatalog), port);
    assert_eq!(reloaded.config(), &expected);
}

#[test]
fn clearing_wipes_the_port_too() {
    let port = Arc::new(MemoryStatePort::default());
    let mut s = TileStore::new(Box::new(BuiltinCatalog), Arc::clone(&port));
    s.add_tile("toggle_entity");
    assert!(load_state(port.as_ref()).ok().flatten().is_some());

    assert!(s.clear(true).is_ok());
    assert_eq!(s.config().pages[0].tiles.len(), 0);
    assert!(load_state(port.as_ref()).ok().flatten().is_none());
}

#[test]
fn history_is_capped_at_fifty() {
    let mut s = store();
    for _ in 0..60 {
        let id = s.add_tile("function");
        assert!(s.delete_tile(id).is_ok());
    }
    let mut undone = 0;
    while s.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
}
