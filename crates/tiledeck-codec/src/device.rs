// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Device-document embedding.
//!
//! A device-provisioning document carries the wire document under the
//! reserved `tile_ui` key, next to sections the configurator does not
//! own (network credentials, security keys, device identity). Extract
//! and inject touch only that subtree. Documents written by older
//! tooling name the screen list `tiles` instead of `screens`; both are
//! accepted on read, and injection rewrites to the current spelling.

use serde_yaml::{Mapping, Value};
use tiledeck_model::{Config, TileCatalog};

use crate::encode::{to_wire_value, EmitOptions};
use crate::WireError;

/// Reserved device-document key for the wire subtree.
pub const DEVICE_KEY: &str = "tile_ui";

/// Wire key for the screen list.
pub const SCREENS_KEY: &str = "screens";

/// Legacy synonym for [`SCREENS_KEY`] inside the device subtree.
pub const LEGACY_SCREENS_KEY: &str = "tiles";

/// The wire subtree of a document: the `tile_ui` section when the
/// document is a device document, otherwise the document itself.
pub(crate) fn wire_subtree(doc: &Value) -> &Value {
    doc.get(DEVICE_KEY).unwrap_or(doc)
}

/// The screen list of a bare or embedded wire document, if present.
pub(crate) fn wire_screens(doc: &Value) -> Option<&Vec<Value>> {
    if let Some(sub) = doc.get(DEVICE_KEY) {
        return sub
            .get(SCREENS_KEY)
            .or_else(|| sub.get(LEGACY_SCREENS_KEY))
            .and_then(Value::as_sequence);
    }
    doc.get(SCREENS_KEY).and_then(Value::as_sequence)
}

/// Borrow the embedded wire document from a device document, if any.
#[must_use]
pub fn extract_wire_doc(device: &Value) -> Option<&Value> {
    device.get(DEVICE_KEY)
}

/// Write the config into a device document's `tile_ui` subtree,
/// leaving every sibling section untouched.
///
/// A `Null` document is promoted to an empty mapping; anything else
/// that is not a mapping is refused.
pub fn inject_wire_doc(
    device: &mut Value,
    config: &Config,
    catalog: &dyn TileCatalog,
) -> Result<(), WireError> {
    if device.is_null() {
        *device = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(root) = device else {
        return Err(WireError::NotAMapping);
    };

    let wire = to_wire_value(config, catalog, EmitOptions::default());

    let sub = root
        .entry(Value::from(DEVICE_KEY))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !sub.is_mapping() {
        *sub = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(sub) = sub else {
        return Err(WireError::NotAMapping);
    };

    sub.remove(LEGACY_SCREENS_KEY);
    sub.insert(
        Value::from(SCREENS_KEY),
        wire.get(SCREENS_KEY).cloned().unwrap_or(Value::Null),
    );
    match wire.get("dynamic_entities") {
        Some(entities) => {
            sub.insert(Value::from("dynamic_entities"), entities.clone());
        }
        None => {
            sub.remove("dynamic_entities");
        }
    }
    Ok(())
}
