// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config → wire document serializer.
//!
//! Determinism contract: mapping keys everywhere reflect insertion
//! order (page order, tile order, field order), so serializing an
//! unchanged config twice yields byte-identical text.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use tiledeck_model::{Config, Page, Tile, TileCatalog};

use crate::fields::encode_field;
use crate::{WireError, INTERNAL_ID_KEY};

/// Serializer options.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmitOptions {
    /// Re-embed internal tile ids under the reserved `__id` key.
    /// Tooling/debug traceability only — never set for a normal export.
    pub internal_ids: bool,
}

/// The icon post-pass: force `\U<hex>` code points into the exact
/// quoting the firmware pipeline expects (`icon: '"\U..."'`). The
/// generic YAML emitter cannot be told to produce a double-quoted
/// string inside a single-quoted scalar, so this runs over the final
/// text.
fn icon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern, compiles
        Regex::new(r#"icon:\s*['"]?(\\U[0-9a-fA-F]+)['"]?"#).unwrap()
    })
}

/// Serialize a config to wire text.
///
/// This does not fail for any well-formed config; malformed field
/// values are passed through best-effort. Semantic validation belongs
/// to the generation collaborator.
pub fn to_wire_text(
    config: &Config,
    catalog: &dyn TileCatalog,
    opts: EmitOptions,
) -> Result<String, WireError> {
    let doc = to_wire_value(config, catalog, opts);
    let text = serde_yaml::to_string(&doc)?;
    Ok(icon_re().replace_all(&text, "icon: '\"${1}\"'").into_owned())
}

/// Serialize a config to the wire value tree (no icon text pass).
#[must_use]
pub fn to_wire_value(config: &Config, catalog: &dyn TileCatalog, opts: EmitOptions) -> Value {
    let mut root = Mapping::new();
    root.insert(
        Value::from("screens"),
        Value::Sequence(
            config
                .pages
                .iter()
                .map(|page| encode_page(page, catalog, opts))
                .collect(),
        ),
    );
    if !config.dynamic_entities.is_empty() {
        root.insert(
            Value::from("dynamic_entities"),
            Value::Sequence(
                config
                    .dynamic_entities
                    .iter()
                    .map(|name| Value::from(name.as_str()))
                    .collect(),
            ),
        );
    }
    Value::Mapping(root)
}

fn encode_page(page: &Page, catalog: &dyn TileCatalog, opts: EmitOptions) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::from("id"), Value::from(page.id.as_str()));
    map.insert(Value::from("rows"), Value::from(u64::from(page.rows)));
    map.insert(Value::from("cols"), Value::from(u64::from(page.cols)));
    if !page.flags.is_empty() {
        map.insert(
            Value::from("flags"),
            Value::Sequence(
                page.flags
                    .iter()
                    .map(|flag| Value::from(flag.as_wire()))
                    .collect(),
            ),
        );
    }
    map.insert(
        Value::from("tiles"),
        Value::Sequence(
            page.tiles
                .iter()
                .filter(|tile| in_bounds(tile, page))
                .map(|tile| encode_tile(tile, catalog, opts))
                .collect(),
        ),
    );
    Value::Mapping(map)
}

/// The bounds filter is an upper bound only: shrinking a page excludes
/// tiles past the new edge from the wire (they stay in memory for
/// re-placement), while staged tiles at -1 pass and survive a
/// save/load cycle.
fn in_bounds(tile: &Tile, page: &Page) -> bool {
    tile.x < i32::from(page.cols) && tile.y < i32::from(page.rows)
}

fn encode_tile(tile: &Tile, catalog: &dyn TileCatalog, opts: EmitOptions) -> Value {
    let mut body = Mapping::new();
    if opts.internal_ids {
        body.insert(Value::from(INTERNAL_ID_KEY), Value::from(tile.id.0));
    }
    body.insert(Value::from("x"), Value::from(i64::from(tile.x)));
    body.insert(Value::from("y"), Value::from(i64::from(tile.y)));
    if let Some(span) = tile.x_span {
        body.insert(Value::from("x_span"), Value::from(u64::from(span)));
    }
    if let Some(span) = tile.y_span {
        body.insert(Value::from("y_span"), Value::from(u64::from(span)));
    }
    for (name, value) in &tile.fields {
        if value.is_empty_for_wire() {
            continue;
        }
        body.insert(
            Value::from(name.as_str()),
            encode_field(catalog.field_kind(&tile.kind, name), value),
        );
    }
    // Re-key the whole tile by its kind: the wire form is a single-key
    // mapping, not a record with a type field.
    let mut keyed = Mapping::new();
    keyed.insert(Value::from(tile.kind.as_str()), Value::Mapping(body));
    Value::Mapping(keyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiledeck_model::{BuiltinCatalog, FieldValue};

    fn placed_tile(kind: &str, x: i32, y: i32) -> Tile {
        let mut tile = Tile::new(kind);
        tile.x = x;
        tile.y = y;
        tile
    }

    #[test]
    fn repeated_serialization_is_byte_identical() {
        let mut config = Config::default();
        let mut tile = placed_tile("function", 0, 0);
        tile.set_field("on_press", FieldValue::from("beep"));
        config.pages[0].tiles.push(tile);

        let a = to_wire_text(&config, &BuiltinCatalog, EmitOptions::default());
        let b = to_wire_text(&config, &BuiltinCatalog, EmitOptions::default());
        assert_eq!(a.ok(), b.ok());
    }

    #[test]
    fn out_of_bounds_tiles_are_filtered_staged_tiles_are_kept() {
        let mut config = Config::default();
        config.pages[0].tiles.push(placed_tile("title", 5, 0));
        config.pages[0].tiles.push(Tile::new("function"));

        let doc = to_wire_value(&config, &BuiltinCatalog, EmitOptions::default());
        let tiles = doc
            .get("screens")
            .and_then(|s| s.get(0))
            .and_then(|p| p.get("tiles"))
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default();
        assert_eq!(tiles.len(), 1);
        assert!(tiles[0].get("function").is_some());
    }

    #[test]
    fn empty_fields_are_pruned() {
        let mut config = Config::default();
        let mut tile = placed_tile("ha_action", 0, 0);
        tile.set_field("perform", FieldValue::List(vec![]));
        tile.set_field("display_page_if_no_entity", FieldValue::from(""));
        tile.set_field("omit_frame", FieldValue::Bool(false));
        config.pages[0].tiles.push(tile);

        let doc = to_wire_value(&config, &BuiltinCatalog, EmitOptions::default());
        let body = doc
            .get("screens")
            .and_then(|s| s.get(0))
            .and_then(|p| p.get("tiles"))
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("ha_action"))
            .cloned()
            .unwrap_or(Value::Null);
        assert!(body.get("perform").is_none());
        assert!(body.get("display_page_if_no_entity").is_none());
        assert_eq!(body.get("omit_frame").and_then(Value::as_bool), Some(false));
    }

    #[test]
    fn icon_pass_quotes_code_points() {
        let mut config = Config::default();
        let mut tile = placed_tile("title", 0, 0);
        tile.set_field(
            "display",
            FieldValue::List(vec![FieldValue::Map(vec![(
                "draw_icon".to_owned(),
                FieldValue::Map(vec![("icon".to_owned(), FieldValue::from("\\U000F0335"))]),
            )])]),
        );
        config.pages[0].tiles.push(tile);

        let text = to_wire_text(&config, &BuiltinCatalog, EmitOptions::default())
            .unwrap_or_default();
        assert!(
            text.contains("icon: '\"\\U000F0335\"'"),
            "unexpected icon rendering in:\n{text}"
        );
    }

    #[test]
    fn internal_ids_only_on_request() {
        let mut config = Config::default();
        config.pages[0].tiles.push(placed_tile("function", 0, 0));

        let plain = to_wire_text(&config, &BuiltinCatalog, EmitOptions::default())
            .unwrap_or_default();
        assert!(!plain.contains(INTERNAL_ID_KEY));

        let traced = to_wire_text(
            &config,
            &BuiltinCatalog,
            EmitOptions { internal_ids: true },
        )
        .unwrap_or_default();
        assert!(traced.contains(INTERNAL_ID_KEY));
    }
}
