//! Storage layer: per-key JSON blob persistence
//!
//! The engine's only external collaborator is a key-value JSON-blob store
//! with two capabilities: `load(key)` and `save(key, value)`. Three providers
//! implement it:
//!
//! - [`FileStore`] - one JSON file per key under a root directory
//! - [`MemoryStore`] - in-process map, used in tests
//! - [`LayeredStore`] - an ordered list of providers, first success wins,
//!   modelling the remote-first / local-mirror fallback explicitly instead
//!   of scattered try/catch
//!
//! A missing key is `Ok(None)` (consumers fall open to an empty map); a
//! provider failure is an error that layered storage can absorb by falling
//! through to the next provider.

use crate::types::EconomyError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub mod file;
pub mod layered;
pub mod memory;

pub use file::FileStore;
pub use layered::LayeredStore;
pub use memory::MemoryStore;

/// Key-value JSON blob store capability
///
/// Implementations must be safe to share across request handlers; all
/// serialization happens at this boundary so the core only ever sees typed
/// maps.
pub trait BlobStore: Send + Sync {
    /// Load the blob stored under `key`, or `None` if absent
    fn load(&self, key: &str) -> Result<Option<Value>, EconomyError>;

    /// Persist `value` under `key`, replacing any previous blob
    fn save(&self, key: &str, value: &Value) -> Result<(), EconomyError>;
}

/// Load a string-keyed map blob, falling open to an empty map when absent
pub fn load_map<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<BTreeMap<String, T>, EconomyError> {
    match store.load(key)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(BTreeMap::new()),
    }
}

/// Persist a string-keyed map blob under `key`
pub fn save_map<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    map: &BTreeMap<String, T>,
) -> Result<(), EconomyError> {
    let value = serde_json::to_value(map)?;
    store.save(key, &value)
}
