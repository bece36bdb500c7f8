// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-field encoding rules.
//!
//! Two directions of the same coin: what [`encode_field`] does to a
//! value on the way out, [`decode_field`] undoes on the way in.
//! Special treatment is keyed off the catalog's field kinds, never off
//! hard-coded tile types:
//!
//! - display-script `color`/`size` parameters: bare identifiers are
//!   wrapped `id(...)` for the firmware, unwrapped for editing;
//! - display-script `icon` parameters: surrounding double quotes are
//!   stripped on input (output quoting is a whole-document text pass,
//!   see [`crate::encode`]);
//! - condition-logic fields go through the normalizer;
//! - entity lists map to/from typed [`EntityRef`] values.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use tiledeck_model::{EntityRef, FieldKind, FieldValue};

use crate::condition::{condition_from_wire, condition_to_wire};

/// Display-script parameters that take color/size references.
const REFERENCE_PARAMS: [&str; 2] = ["color", "size"];

/// Display-script parameter carrying an icon glyph.
const ICON_PARAM: &str = "icon";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern, compiles
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
    })
}

/// Wrap a bare identifier-shaped reference value as `id(<value>)`.
///
/// Values already wrapped, `Color::`-prefixed constants, and anything
/// that is not identifier-shaped pass through untouched.
#[must_use]
pub fn wrap_reference(value: &str) -> String {
    if value.starts_with("id(") || value.starts_with("Color::") || !identifier_re().is_match(value)
    {
        value.to_owned()
    } else {
        format!("id({value})")
    }
}

/// Unwrap `id(<value>)` back to the bare identifier; a no-op for
/// anything else.
#[must_use]
pub fn unwrap_reference(value: &str) -> String {
    value
        .strip_prefix("id(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map_or_else(|| value.to_owned(), ToOwned::to_owned)
}

/// Strip one pair of surrounding double quotes from an icon literal.
#[must_use]
pub fn strip_icon_quotes(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map_or_else(|| value.to_owned(), ToOwned::to_owned)
}

/// Structural conversion of a field value to its wire shape. Typed
/// variants (conditions, entity references) carry their own encoding.
#[must_use]
pub fn field_to_value(field: &FieldValue) -> Value {
    match field {
        FieldValue::Null => Value::Null,
        FieldValue::Str(s) => Value::from(s.as_str()),
        FieldValue::Bool(b) => Value::from(*b),
        FieldValue::Int(n) => Value::from(*n),
        FieldValue::Float(n) => Value::from(*n),
        FieldValue::List(items) => Value::Sequence(items.iter().map(field_to_value).collect()),
        FieldValue::Map(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), field_to_value(v)))
                .collect(),
        ),
        FieldValue::Condition(node) => condition_to_wire(node),
        FieldValue::Entity(entity) => entity_to_value(entity),
    }
}

/// Structural conversion of a raw wire value into a field value.
#[must_use]
pub fn value_to_field(raw: &Value) -> FieldValue {
    match raw {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map_or_else(|| FieldValue::Float(n.as_f64().unwrap_or(0.0)), FieldValue::Int),
        Value::String(s) => FieldValue::Str(s.clone()),
        Value::Sequence(items) => FieldValue::List(items.iter().map(value_to_field).collect()),
        Value::Mapping(map) => FieldValue::Map(
            map.iter()
                .map(|(k, v)| (key_string(k), value_to_field(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => value_to_field(&tagged.value),
    }
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn entity_to_value(entity: &EntityRef) -> Value {
    match entity {
        EntityRef::Id(id) => Value::from(id.as_str()),
        EntityRef::Fixed { entity, sensor } => {
            let mut map = Mapping::new();
            map.insert(Value::from("entity"), Value::from(entity.as_str()));
            if let Some(sensor) = sensor {
                map.insert(Value::from("sensor"), Value::from(sensor.as_str()));
            }
            Value::Mapping(map)
        }
        EntityRef::Dynamic { name, sensor } => {
            let mut map = Mapping::new();
            map.insert(Value::from("dynamic_entity"), Value::from(name.as_str()));
            if let Some(sensor) = sensor {
                map.insert(Value::from("sensor"), Value::from(sensor.as_str()));
            }
            Value::Mapping(map)
        }
    }
}

fn entity_from_value(raw: &Value) -> FieldValue {
    if let Some(id) = raw.as_str() {
        return FieldValue::Entity(EntityRef::Id(id.to_owned()));
    }
    if let Some(map) = raw.as_mapping() {
        let sensor = map
            .get("sensor")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        if let Some(name) = map.get("dynamic_entity").and_then(Value::as_str) {
            return FieldValue::Entity(EntityRef::Dynamic {
                name: name.to_owned(),
                sensor,
            });
        }
        if let Some(entity) = map.get("entity").and_then(Value::as_str) {
            return FieldValue::Entity(EntityRef::Fixed {
                entity: entity.to_owned(),
                sensor,
            });
        }
    }
    value_to_field(raw)
}

fn encode_display(items: &[FieldValue]) -> Value {
    Value::Sequence(items.iter().map(encode_display_item).collect())
}

fn encode_display_item(item: &FieldValue) -> Value {
    let FieldValue::Map(entries) = item else {
        return field_to_value(item);
    };
    // A script invocation is a single-key mapping {script: {params}}.
    let [(script, params)] = entries.as_slice() else {
        return field_to_value(item);
    };
    let encoded_params = match params {
        FieldValue::Map(params) => Value::Mapping(
            params
                .iter()
                .map(|(name, value)| {
                    let encoded = match value {
                        FieldValue::Str(s) if REFERENCE_PARAMS.contains(&name.as_str()) => {
                            Value::from(wrap_reference(s))
                        }
                        other => field_to_value(other),
                    };
                    (Value::from(name.as_str()), encoded)
                })
                .collect(),
        ),
        other => field_to_value(other),
    };
    let mut map = Mapping::new();
    map.insert(Value::from(script.as_str()), encoded_params);
    Value::Mapping(map)
}

fn decode_display(items: &[Value]) -> FieldValue {
    FieldValue::List(items.iter().map(decode_display_item).collect())
}

fn decode_display_item(raw: &Value) -> FieldValue {
    let Some(map) = raw.as_mapping() else {
        return value_to_field(raw);
    };
    let mut iter = map.iter();
    let (Some((script, params)), None) = (iter.next(), iter.next()) else {
        return value_to_field(raw);
    };
    let Some(params) = params.as_mapping() else {
        return FieldValue::Map(vec![(key_string(script), value_to_field(params))]);
    };
    let decoded = params
        .iter()
        .map(|(name, value)| {
            let name = key_string(name);
            let decoded = match value.as_str() {
                Some(s) if REFERENCE_PARAMS.contains(&name.as_str()) => {
                    FieldValue::Str(unwrap_reference(s))
                }
                Some(s) if name == ICON_PARAM => FieldValue::Str(strip_icon_quotes(s)),
                _ => value_to_field(value),
            };
            (name, decoded)
        })
        .collect();
    FieldValue::Map(vec![(key_string(script), FieldValue::Map(decoded))])
}

/// Encode one tile field for the wire, honoring its declared kind.
#[must_use]
pub fn encode_field(kind: Option<FieldKind>, value: &FieldValue) -> Value {
    match (kind, value) {
        (Some(FieldKind::DisplayList), FieldValue::List(items)) => encode_display(items),
        _ => field_to_value(value),
    }
}

/// Decode one tile field from the wire, honoring its declared kind.
/// Fields the catalog does not know decode structurally.
#[must_use]
pub fn decode_field(kind: Option<FieldKind>, raw: &Value) -> FieldValue {
    match (kind, raw) {
        (Some(FieldKind::Condition), _) => FieldValue::Condition(condition_from_wire(raw)),
        (Some(FieldKind::DisplayList), Value::Sequence(items)) => decode_display(items),
        (Some(FieldKind::EntityList), Value::Sequence(items)) => {
            FieldValue::List(items.iter().map(entity_from_value).collect())
        }
        _ => value_to_field(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_is_inverse_of_unwrapping() {
        assert_eq!(wrap_reference("accent"), "id(accent)");
        assert_eq!(unwrap_reference("id(accent)"), "accent");
        assert_eq!(unwrap_reference(&wrap_reference("accent")), "accent");
    }

    #[test]
    fn wrapping_skips_non_identifiers_and_constants() {
        assert_eq!(wrap_reference("id(accent)"), "id(accent)");
        assert_eq!(wrap_reference("Color::RED"), "Color::RED");
        assert_eq!(wrap_reference("3px"), "3px");
        assert_eq!(wrap_reference(""), "");
    }

    #[test]
    fn unwrapping_unshaped_values_is_a_noop() {
        assert_eq!(unwrap_reference("accent"), "accent");
        assert_eq!(unwrap_reference("id(unclosed"), "id(unclosed");
    }

    #[test]
    fn icon_quotes_strip_once() {
        assert_eq!(strip_icon_quotes("\"\\U000F0335\""), "\\U000F0335");
        assert_eq!(strip_icon_quotes("\\U000F0335"), "\\U000F0335");
    }

    #[test]
    fn display_params_wrap_on_encode_and_unwrap_on_decode() {
        let display = FieldValue::List(vec![FieldValue::Map(vec![(
            "draw_label".to_owned(),
            FieldValue::Map(vec![
                ("color".to_owned(), FieldValue::from("accent")),
                ("size".to_owned(), FieldValue::from("id(large)")),
                ("text".to_owned(), FieldValue::from("Kitchen")),
            ]),
        )])]);

        let wire = encode_field(Some(FieldKind::DisplayList), &display);
        let first = &wire.as_sequence().and_then(|s| s.first()).cloned();
        let params = first
            .as_ref()
            .and_then(|v| v.get("draw_label"))
            .cloned()
            .unwrap_or(Value::Null);
        assert_eq!(params.get("color").and_then(Value::as_str), Some("id(accent)"));
        assert_eq!(params.get("size").and_then(Value::as_str), Some("id(large)"));
        assert_eq!(params.get("text").and_then(Value::as_str), Some("Kitchen"));

        let decoded = decode_field(Some(FieldKind::DisplayList), &wire);
        assert_eq!(decoded, display);
    }

    #[test]
    fn entity_list_round_trips_typed_refs() {
        let list = FieldValue::List(vec![
            FieldValue::Entity(EntityRef::Fixed {
                entity: "light.kitchen".to_owned(),
                sensor: None,
            }),
            FieldValue::Entity(EntityRef::Dynamic {
                name: "room".to_owned(),
                sensor: Some("temperature".to_owned()),
            }),
        ]);
        let wire = encode_field(Some(FieldKind::EntityList), &list);
        assert_eq!(decode_field(Some(FieldKind::EntityList), &wire), list);
    }
}
