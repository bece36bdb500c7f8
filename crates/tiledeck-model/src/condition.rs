// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Condition-logic trees.
//!
//! A condition controls a tile behavior (currently: whether the tile
//! forces the fast refresh path) as a boolean expression over leaf
//! predicates. The tagged form below is the only canonical in-memory
//! representation; the codec layer also accepts the YAML shorthand forms
//! (bare list, `and:`/`or:`/`not:` keys) on input.

use serde::{Deserialize, Serialize};

/// A boolean expression over leaf predicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionNode {
    /// A predicate name (script or boolean global id). The empty string
    /// means "unset".
    Leaf(String),
    /// True when every child is true.
    And(Vec<ConditionNode>),
    /// True when any child is true.
    Or(Vec<ConditionNode>),
    /// Negation of a single child. NOT wraps one node, not a list —
    /// callers must not conflate its arity with AND/OR's.
    Not(Box<ConditionNode>),
}

impl ConditionNode {
    /// A leaf node over the given predicate name.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Leaf(name.into())
    }

    /// True when this node is the unset leaf.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Leaf(name) if name.is_empty())
    }
}

impl Default for ConditionNode {
    fn default() -> Self {
        Self::Leaf(String::new())
    }
}
