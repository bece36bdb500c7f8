// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entity references.

use serde::{Deserialize, Serialize};

/// The wildcard entity id meaning "all entities" for tiles that
/// support it.
pub const WILDCARD_ENTITY: &str = "*";

/// A reference to a home-automation entity.
///
/// A reference is either a literal entity id, a fixed entity object
/// (optionally narrowed to one of its sensors), or a dynamic entity: a
/// named variable bound to a concrete entity at device runtime rather
/// than at configuration time. The core stores names verbatim and never
/// validates them against the entity directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    /// A bare literal entity id (`light.kitchen`, or [`WILDCARD_ENTITY`]).
    Id(String),
    /// An `{entity, sensor?}` object form.
    Fixed {
        /// Literal entity id.
        entity: String,
        /// Optional sensor suffix narrowing the entity.
        sensor: Option<String>,
    },
    /// A `{dynamic_entity, sensor?}` object form.
    Dynamic {
        /// Dynamic-entity variable name.
        name: String,
        /// Optional sensor suffix narrowing the entity.
        sensor: Option<String>,
    },
}

impl EntityRef {
    /// The dynamic-entity variable name, when this reference carries one.
    #[must_use]
    pub fn dynamic_name(&self) -> Option<&str> {
        match self {
            Self::Dynamic { name, .. } => Some(name),
            Self::Id(_) | Self::Fixed { .. } => None,
        }
    }

    /// True when this reference is the wildcard literal.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Id(id) if id == WILDCARD_ENTITY)
    }
}
