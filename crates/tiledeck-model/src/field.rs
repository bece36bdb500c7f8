// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed field values.
//!
//! Tiles are open records: a fixed discriminant plus a schema-driven
//! field map. Instead of an untyped value bag, every field holds one of
//! the variants below; the catalog decides which variant a named field
//! is expected to carry, and the codec falls back to the structural
//! variants (`Str`/`List`/`Map`/...) for fields the catalog does not
//! know about.

use crate::condition::ConditionNode;
use crate::entity::EntityRef;
use serde::{Deserialize, Serialize};

/// A single tile field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Absent-but-present value; pruned from the wire form.
    Null,
    /// A string scalar.
    Str(String),
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// An ordered sequence.
    List(Vec<FieldValue>),
    /// An insertion-ordered mapping.
    Map(Vec<(String, FieldValue)>),
    /// A condition-logic tree (e.g. `requires_fast_refresh`).
    Condition(ConditionNode),
    /// An entity reference object.
    Entity(EntityRef),
}

impl FieldValue {
    /// The string payload, when this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True when the wire form omits this value entirely: null, the
    /// empty string, or an empty list.
    #[must_use]
    pub fn is_empty_for_wire(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
