// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collaborator port contracts.
//!
//! The core never talks to Home Assistant or the firmware pipeline
//! directly; adapters implement these traits and the editor shell
//! wires them in. Both are deliberately thin: the core stores entity
//! ids as plain strings without checking them against the directory,
//! and it forwards validation verdicts without interpreting them.

use serde::{Deserialize, Serialize};

/// One entry from the entity directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Canonical entity id (`light.kitchen`).
    pub entity_id: String,
    /// Human-readable name, when the directory has one.
    pub friendly_name: Option<String>,
}

/// Directory collaborator: supplies entities for reference pickers.
pub trait EntityDirectory {
    /// List the known entities. An error here degrades the picker, not
    /// the editor.
    fn entities(&self) -> Result<Vec<EntityInfo>, String>;
}

/// Structured verdict from the validation/generation collaborator.
///
/// Produced outside the core (the firmware pipeline owns the semantic
/// rules); surfaced to the user as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Human-readable problem description.
    pub message: String,
    /// Where in the document the problem sits, when known
    /// (`screens[0].tiles[2]`).
    pub path: Option<String>,
}

/// Validation collaborator: judges serialized wire text.
pub trait ConfigValidator {
    /// Validate wire text; `Err` carries the issues to surface.
    fn validate(&self, wire_text: &str) -> Result<(), Vec<ValidationIssue>>;
}
