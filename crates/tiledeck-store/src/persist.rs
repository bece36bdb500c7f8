// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persistence port for editor state.
//!
//! The store never touches storage directly: it talks to a
//! [`StatePort`] injected at construction, loads once on init and
//! mirrors every mutation back out. Snapshots are JSON (the internal
//! shape, ids included — distinct from the YAML wire format, which
//! goes through tiledeck-codec).

use serde_json::Value;
use thiserror::Error;
use tiledeck_model::Config;
use tracing::warn;

/// Error type for state persistence.
#[derive(Debug, Error)]
pub enum StateError {
    /// No snapshot in the store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot (de)serialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Storage port for raw state snapshots.
pub trait StatePort {
    /// Load the raw snapshot. Returns `NotFound` when missing.
    fn load_raw(&self) -> Result<Vec<u8>, StateError>;
    /// Persist a raw snapshot.
    fn save_raw(&self, data: &[u8]) -> Result<(), StateError>;
    /// Remove any persisted snapshot.
    fn clear(&self) -> Result<(), StateError>;
}

impl<P: StatePort + ?Sized> StatePort for std::sync::Arc<P> {
    fn load_raw(&self) -> Result<Vec<u8>, StateError> {
        (**self).load_raw()
    }

    fn save_raw(&self, data: &[u8]) -> Result<(), StateError> {
        (**self).save_raw(data)
    }

    fn clear(&self) -> Result<(), StateError> {
        (**self).clear()
    }
}

/// Port that never stores anything (ephemeral sessions).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatePort;

impl StatePort for NullStatePort {
    fn load_raw(&self) -> Result<Vec<u8>, StateError> {
        Err(StateError::NotFound)
    }

    fn save_raw(&self, _data: &[u8]) -> Result<(), StateError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        Ok(())
    }
}

/// In-memory port for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStatePort {
    slot: std::sync::Mutex<Option<Vec<u8>>>,
}

impl StatePort for MemoryStatePort {
    fn load_raw(&self) -> Result<Vec<u8>, StateError> {
        self.slot
            .lock()
            .map_err(|_| StateError::Other("state slot poisoned".into()))?
            .clone()
            .ok_or(StateError::NotFound)
    }

    fn save_raw(&self, data: &[u8]) -> Result<(), StateError> {
        *self
            .slot
            .lock()
            .map_err(|_| StateError::Other("state slot poisoned".into()))? =
            Some(data.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        *self
            .slot
            .lock()
            .map_err(|_| StateError::Other("state slot poisoned".into()))? = None;
        Ok(())
    }
}

/// Load and migrate a persisted config. Returns `Ok(None)` when the
/// port has no snapshot.
pub fn load_state(port: &dyn StatePort) -> Result<Option<Config>, StateError> {
    let bytes = match port.load_raw() {
        Ok(bytes) => bytes,
        Err(StateError::NotFound) => return Ok(None),
        Err(err) => return Err(err),
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    let mut raw: Value = serde_json::from_slice(&bytes)?;
    migrate_legacy_dimensions(&mut raw);
    let config = serde_json::from_value(raw)?;
    Ok(Some(config))
}

/// Serialize and persist a config snapshot.
pub fn save_state(port: &dyn StatePort, config: &Config) -> Result<(), StateError> {
    let data = serde_json::to_vec(config)?;
    port.save_raw(&data)
}

/// Snapshots written by older builds kept grid dimensions at the top
/// level instead of per page. Push them down into any page missing its
/// own, then drop the legacy keys.
fn migrate_legacy_dimensions(raw: &mut Value) {
    let Value::Object(root) = raw else { return };
    if !(root.contains_key("rows") && root.contains_key("cols") && root.contains_key("pages")) {
        return;
    }
    warn!("migrating legacy snapshot with top-level grid dimensions");
    let rows = root.remove("rows").unwrap_or(Value::Null);
    let cols = root.remove("cols").unwrap_or(Value::Null);
    if let Some(Value::Array(pages)) = root.get_mut("pages") {
        for page in pages {
            let Value::Object(page) = page else { continue };
            page.entry("rows").or_insert_with(|| rows.clone());
            page.entry("cols").or_insert_with(|| cols.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_through_memory_port() {
        let port = MemoryStatePort::default();
        assert!(matches!(load_state(&port), Ok(None)));

        let config = Config::default();
        assert!(save_state(&port, &config).is_ok());
        let loaded = load_state(&port).ok().flatten();
        assert_eq!(loaded, Some(config));

        assert!(port.clear().is_ok());
        assert!(matches!(load_state(&port), Ok(None)));
    }

    #[test]
    fn legacy_dimensions_push_down_into_pages() {
        let port = MemoryStatePort::default();
        let legacy = r#"{
            "rows": 4,
            "cols": 5,
            "pages": [
                {"id": "a", "tiles": []},
                {"id": "b", "tiles": [], "rows": 2, "cols": 3}
            ]
        }"#;
        assert!(port.save_raw(legacy.as_bytes()).is_ok());

        let config = load_state(&port).ok().flatten();
        let Some(config) = config else {
            unreachable!("legacy snapshot loads");
        };
        assert_eq!((config.pages[0].rows, config.pages[0].cols), (4, 5));
        assert_eq!((config.pages[1].rows, config.pages[1].cols), (2, 3));
    }
}
