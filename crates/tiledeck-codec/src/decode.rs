// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire document → Config deserializer.
//!
//! Document-level structure is strict (`screens` must be a list);
//! everything below that is tolerant: a malformed tile entry or an
//! unknown page flag is skipped with a warning and the rest of the
//! document still loads. Internal tile ids are always freshly
//! assigned — the reserved `__id` key is dropped on input.

use regex::Regex;
use serde_yaml::Value;
use std::sync::OnceLock;
use tiledeck_model::{
    Config, ConditionNode, EntityRef, FieldValue, Page, PageFlag, Tile, TileCatalog, TileId,
    UNPLACED,
};
use tracing::warn;

use crate::device::wire_screens;
use crate::fields::decode_field;
use crate::{WireError, INTERNAL_ID_KEY};

/// Placement and span keys handled structurally, outside the field map.
const PLACEMENT_KEYS: [&str; 5] = ["x", "y", "x_span", "y_span", INTERNAL_ID_KEY];

/// `#{NAME}` references inside string values bind dynamic entities.
fn dyn_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern, compiles
        Regex::new(r"#\{([^}]+)\}").unwrap()
    })
}

/// Parse wire text and rebuild the config.
pub fn from_wire_text(text: &str, catalog: &dyn TileCatalog) -> Result<Config, WireError> {
    let doc: Value = serde_yaml::from_str(text)?;
    from_wire_value(&doc, catalog)
}

/// Rebuild the config from a parsed wire document (bare, or a device
/// document embedding one).
pub fn from_wire_value(doc: &Value, catalog: &dyn TileCatalog) -> Result<Config, WireError> {
    let screens = wire_screens(doc).ok_or(WireError::MissingScreens)?;

    let pages: Vec<Page> = screens
        .iter()
        .filter_map(|screen| decode_page(screen, catalog))
        .collect();

    let mut config = Config {
        pages,
        dynamic_entities: Vec::new(),
        project_path: Config::default().project_path,
    };

    // Honor a top-level declaration first, then derive the rest by
    // scanning every tile; the derived union is the source of truth.
    if let Some(declared) = doc
        .get("dynamic_entities")
        .or_else(|| crate::device::wire_subtree(doc).get("dynamic_entities"))
        .and_then(Value::as_sequence)
    {
        for name in declared.iter().filter_map(Value::as_str) {
            config.add_dynamic_entity(name);
        }
    }
    let mut found = Vec::new();
    for page in &config.pages {
        for tile in &page.tiles {
            scan_dynamic_entities(tile, &mut found);
        }
    }
    for name in found {
        config.add_dynamic_entity(name);
    }
    Ok(config)
}

fn decode_page(screen: &Value, catalog: &dyn TileCatalog) -> Option<Page> {
    let Some(map) = screen.as_mapping() else {
        warn!("skipping screen entry that is not a mapping");
        return None;
    };
    let id = map
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();
    let rows = dimension(map.get("rows"), 2);
    let cols = dimension(map.get("cols"), 3);

    let mut page = Page::new(id, rows, cols);

    if let Some(flags) = map.get("flags").and_then(Value::as_sequence) {
        for raw in flags.iter().filter_map(Value::as_str) {
            match raw.parse::<PageFlag>() {
                Ok(flag) => page.flags.push(flag),
                Err(err) => warn!(page = %page.id, %err, "dropping unknown page flag"),
            }
        }
    }

    if let Some(tiles) = map.get("tiles").and_then(Value::as_sequence) {
        let page_id = page.id.clone();
        page.tiles = tiles
            .iter()
            .filter_map(|entry| decode_tile(entry, catalog, &page_id))
            .collect();
    }
    Some(page)
}

fn dimension(raw: Option<&Value>, default: u16) -> u16 {
    raw.and_then(Value::as_u64)
        .and_then(|n| u16::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn decode_tile(entry: &Value, catalog: &dyn TileCatalog, page_id: &str) -> Option<Tile> {
    // Each entry is a single-key mapping: the key is the tile kind,
    // the value its field mapping. Anything else is skipped, never
    // fatal — the rest of the document still loads.
    let Some(keyed) = entry.as_mapping() else {
        warn!(page = page_id, "skipping tile entry that is not a mapping");
        return None;
    };
    let Some((kind, body)) = keyed.iter().next() else {
        warn!(page = page_id, "skipping empty tile entry");
        return None;
    };
    let Some(kind) = kind.as_str() else {
        warn!(page = page_id, "skipping tile entry with a non-string kind");
        return None;
    };
    let Some(body) = body.as_mapping() else {
        warn!(page = page_id, kind, "skipping tile entry without a field mapping");
        return None;
    };

    let (mut x, mut y) = (coordinate(body.get("x")), coordinate(body.get("y")));
    if x < 0 || y < 0 {
        // Staging is all-or-nothing: a half-placed tile is staged.
        x = UNPLACED;
        y = UNPLACED;
    }
    let mut tile = Tile {
        id: TileId::fresh(),
        kind: kind.to_owned(),
        x,
        y,
        x_span: span(body.get("x_span")),
        y_span: span(body.get("y_span")),
        fields: Vec::new(),
    };
    for (name, raw) in body {
        let Some(name) = name.as_str() else { continue };
        if PLACEMENT_KEYS.contains(&name) {
            continue;
        }
        tile.fields.push((
            name.to_owned(),
            decode_field(catalog.field_kind(kind, name), raw),
        ));
    }
    Some(tile)
}

fn coordinate(raw: Option<&Value>) -> i32 {
    raw.and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(UNPLACED)
}

fn span(raw: Option<&Value>) -> Option<u16> {
    raw.and_then(Value::as_u64)
        .and_then(|n| u16::try_from(n).ok())
        .filter(|n| *n > 0)
}

/// Collect every dynamic-entity name a tile references: `dynamic_entity`
/// fields at any nesting depth, typed dynamic entity references, and
/// `#{NAME}` patterns inside string values.
pub fn scan_dynamic_entities(tile: &Tile, out: &mut Vec<String>) {
    for (name, value) in &tile.fields {
        scan_field(name, value, out);
    }
}

fn scan_field(name: &str, value: &FieldValue, out: &mut Vec<String>) {
    match value {
        FieldValue::Str(s) => {
            if name == "dynamic_entity" {
                push_name(out, s);
            }
            scan_string(s, out);
        }
        FieldValue::Entity(EntityRef::Dynamic { name, .. }) => push_name(out, name),
        FieldValue::Entity(_) => {}
        FieldValue::List(items) => {
            for item in items {
                scan_field("", item, out);
            }
        }
        FieldValue::Map(entries) => {
            for (entry_name, entry_value) in entries {
                scan_field(entry_name, entry_value, out);
            }
        }
        FieldValue::Condition(node) => scan_condition(node, out),
        FieldValue::Null | FieldValue::Bool(_) | FieldValue::Int(_) | FieldValue::Float(_) => {}
    }
}

fn scan_condition(node: &ConditionNode, out: &mut Vec<String>) {
    match node {
        ConditionNode::Leaf(name) => scan_string(name, out),
        ConditionNode::And(children) | ConditionNode::Or(children) => {
            for child in children {
                scan_condition(child, out);
            }
        }
        ConditionNode::Not(child) => scan_condition(child, out),
    }
}

fn scan_string(s: &str, out: &mut Vec<String>) {
    if let Some(captures) = dyn_var_re().captures(s) {
        if let Some(name) = captures.get(1) {
            push_name(out, name.as_str());
        }
    }
}

fn push_name(out: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !out.iter().any(|n| n == name) {
        out.push(name.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiledeck_model::BuiltinCatalog;

    const DOC: &str = "\
screens:
  - id: main_page
    rows: 2
    cols: 3
    flags: [BASE, SPARKLY]
    tiles:
      - toggle_entity:
          x: 0
          y: 0
          dynamic_entity: light
          entity: light.example
          display:
            - draw_label:
                color: id(accent)
      - not_a_tile
      - move_page: {}
";

    #[test]
    fn missing_screens_is_fatal() {
        let doc: Value = serde_yaml::from_str("pages: []").unwrap_or(Value::Null);
        assert!(matches!(
            from_wire_value(&doc, &BuiltinCatalog),
            Err(WireError::MissingScreens)
        ));
    }

    #[test]
    fn malformed_tiles_are_skipped_not_fatal() {
        let config = from_wire_text(DOC, &BuiltinCatalog).unwrap_or_default();
        assert_eq!(config.pages.len(), 1);
        // the string entry is dropped; `move_page: {}` still counts —
        // it has a (degenerate) field mapping
        assert_eq!(config.pages[0].tiles.len(), 2);
        assert_eq!(config.pages[0].tiles[0].kind, "toggle_entity");
    }

    #[test]
    fn unknown_flags_are_dropped() {
        let config = from_wire_text(DOC, &BuiltinCatalog).unwrap_or_default();
        assert_eq!(config.pages[0].flags, [PageFlag::Base]);
    }

    #[test]
    fn references_unwrap_on_load() {
        let config = from_wire_text(DOC, &BuiltinCatalog).unwrap_or_default();
        let display = config.pages[0].tiles[0].field("display");
        let Some(FieldValue::List(items)) = display else {
            unreachable!("display decodes as a list");
        };
        let FieldValue::Map(script) = &items[0] else {
            unreachable!("script invocation decodes as a map");
        };
        let FieldValue::Map(params) = &script[0].1 else {
            unreachable!("script params decode as a map");
        };
        assert_eq!(params[0].1, FieldValue::from("accent"));
    }

    #[test]
    fn dynamic_entities_are_derived() {
        let config = from_wire_text(DOC, &BuiltinCatalog).unwrap_or_default();
        assert_eq!(config.dynamic_entities, ["light"]);
    }

    #[test]
    fn missing_coordinates_stage_the_tile() {
        let text = "screens:\n  - id: p\n    tiles:\n      - function:\n          display: []\n";
        let config = from_wire_text(text, &BuiltinCatalog).unwrap_or_default();
        let tile = &config.pages[0].tiles[0];
        assert_eq!((tile.x, tile.y), (UNPLACED, UNPLACED));
        assert!(!tile.is_placed());
    }

    #[test]
    fn hash_brace_patterns_bind_dynamic_entities() {
        let text = "screens:\n  - id: p\n    tiles:\n      - title:\n          x: 0\n          y: 0\n          display:\n            - 'show #{weather_station}'\n";
        let config = from_wire_text(text, &BuiltinCatalog).unwrap_or_default();
        assert_eq!(config.dynamic_entities, ["weather_station"]);
    }
}
