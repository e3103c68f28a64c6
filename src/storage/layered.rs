//! Layered blob storage: ordered providers, first success wins
//!
//! Models the "try remote, then local mirror" resiliency behavior as an
//! explicit strategy. Loads consult providers in order and the first hit
//! wins; a provider that errors is skipped with a warning. Saves write
//! through to every provider so the mirror stays current enough to serve
//! fallback reads, and succeed as long as at least one provider accepted.
//! Only when every provider fails does an operation surface
//! `STORAGE_UNAVAILABLE`. A key that no provider has is a clean `None`,
//! which consumers treat as an empty map.

use super::BlobStore;
use crate::types::EconomyError;
use serde_json::Value;
use std::sync::Arc;

/// Blob store that consults an ordered list of providers
pub struct LayeredStore {
    providers: Vec<Arc<dyn BlobStore>>,
}

impl LayeredStore {
    /// Create a layered store over the given providers, highest priority first
    pub fn new(providers: Vec<Arc<dyn BlobStore>>) -> Self {
        LayeredStore { providers }
    }
}

impl BlobStore for LayeredStore {
    fn load(&self, key: &str) -> Result<Option<Value>, EconomyError> {
        let mut any_ok = false;
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.load(key) {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => any_ok = true,
                Err(e) => {
                    tracing::warn!(key, provider = idx, error = %e, "blob load failed, trying next provider");
                }
            }
        }
        if any_ok {
            Ok(None)
        } else {
            Err(EconomyError::storage_unavailable(format!(
                "no provider could load key '{}'",
                key
            )))
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), EconomyError> {
        let mut any_ok = false;
        for (idx, provider) in self.providers.iter().enumerate() {
            match provider.save(key, value) {
                Ok(()) => any_ok = true,
                Err(e) => {
                    tracing::warn!(key, provider = idx, error = %e, "blob save failed on provider");
                }
            }
        }
        if any_ok {
            Ok(())
        } else {
            Err(EconomyError::storage_unavailable(format!(
                "no provider could save key '{}'",
                key
            )))
        }
    }
}
