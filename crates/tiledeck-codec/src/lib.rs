// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! YAML wire codec for the Tiledeck configurator core.
//!
//! The wire document re-keys every tile by its kind, applies per-field
//! encodings, and names pages `screens`. Serialization is deterministic
//! (insertion-ordered keys throughout) so an unchanged config always
//! produces byte-identical text. Deserialization is the exact inverse,
//! tolerant of individually malformed tile entries.

use thiserror::Error;

pub mod condition;
pub mod decode;
pub mod device;
pub mod encode;
pub mod fields;

pub use condition::{condition_from_wire, condition_to_wire};
pub use decode::{from_wire_text, from_wire_value, scan_dynamic_entities};
pub use device::{extract_wire_doc, inject_wire_doc, DEVICE_KEY, LEGACY_SCREENS_KEY, SCREENS_KEY};
pub use encode::{to_wire_text, to_wire_value, EmitOptions};

/// Reserved wire key a debug export stores the internal tile id under.
pub const INTERNAL_ID_KEY: &str = "__id";

/// Error type for wire transforms.
///
/// Encoding is infallible for any well-formed config (malformed field
/// values pass through best-effort; semantic validation belongs to the
/// generation collaborator). Decoding fails only on document-level
/// structure — individual bad tiles are skipped, not fatal.
#[derive(Debug, Error)]
pub enum WireError {
    /// The document (or its embedded wire subtree) has no `screens`
    /// list.
    #[error("invalid wire document: 'screens' list is missing")]
    MissingScreens,
    /// The YAML text could not be parsed or emitted.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A device document operation was handed something that is not a
    /// mapping.
    #[error("device document is not a mapping")]
    NotAMapping,
}
