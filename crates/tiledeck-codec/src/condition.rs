// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Condition-logic normalizer.
//!
//! The wire format carries conditions in an explicit tagged form
//! (`{operator, conditions}`); hand-written documents may also use the
//! YAML-idiomatic shorthands: a bare list (implicit OR), or single-key
//! `and:` / `or:` / `not:` mappings. Input accepts all of them; output
//! always emits the tagged form. `not:` wraps a single child — its
//! wire `conditions` list always has exactly one element.

use serde_yaml::{Mapping, Value};
use tiledeck_model::ConditionNode;

/// Normalize a raw wire value into a canonical condition node.
///
/// Unrecognized shapes degrade to a leaf over the value's best-effort
/// string rendering rather than failing the document.
#[must_use]
pub fn condition_from_wire(raw: &Value) -> ConditionNode {
    match raw {
        Value::String(s) => ConditionNode::Leaf(s.clone()),
        Value::Sequence(items) => {
            ConditionNode::Or(items.iter().map(condition_from_wire).collect())
        }
        Value::Mapping(map) => mapping_from_wire(map, raw),
        Value::Tagged(tagged) => condition_from_wire(&tagged.value),
        other => ConditionNode::Leaf(stringify(other)),
    }
}

fn mapping_from_wire(map: &Mapping, raw: &Value) -> ConditionNode {
    if let (Some(op), Some(conditions)) = (map.get("operator"), map.get("conditions")) {
        let op = op.as_str().unwrap_or_default().to_ascii_uppercase();
        let children: Vec<ConditionNode> = match conditions {
            Value::Sequence(items) => items.iter().map(condition_from_wire).collect(),
            single => vec![condition_from_wire(single)],
        };
        return match op.as_str() {
            "AND" => ConditionNode::And(children),
            "OR" => ConditionNode::Or(children),
            "NOT" => ConditionNode::Not(Box::new(
                children.into_iter().next().unwrap_or_default(),
            )),
            _ => ConditionNode::Leaf(stringify(raw)),
        };
    }
    if let Some(children) = map.get("and").and_then(Value::as_sequence) {
        return ConditionNode::And(children.iter().map(condition_from_wire).collect());
    }
    if let Some(children) = map.get("or").and_then(Value::as_sequence) {
        return ConditionNode::Or(children.iter().map(condition_from_wire).collect());
    }
    if let Some(child) = map.get("not") {
        return ConditionNode::Not(Box::new(condition_from_wire(child)));
    }
    ConditionNode::Leaf(stringify(raw))
}

/// Render a canonical condition node in the tagged wire form.
#[must_use]
pub fn condition_to_wire(node: &ConditionNode) -> Value {
    match node {
        ConditionNode::Leaf(name) => Value::String(name.clone()),
        ConditionNode::And(children) => operator_mapping("AND", children.iter()),
        ConditionNode::Or(children) => operator_mapping("OR", children.iter()),
        ConditionNode::Not(child) => operator_mapping("NOT", std::iter::once(child.as_ref())),
    }
}

fn operator_mapping<'a>(
    op: &str,
    children: impl Iterator<Item = &'a ConditionNode>,
) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::from("operator"), Value::from(op));
    map.insert(
        Value::from("conditions"),
        Value::Sequence(children.map(condition_to_wire).collect()),
    );
    Value::Mapping(map)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}
