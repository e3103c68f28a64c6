//! In-memory blob store
//!
//! Backs tests and ephemeral deployments. Also doubles as a fault injector:
//! saves (all of them, or only those for one key) can be made to fail so
//! callers can exercise their `STORAGE_UNAVAILABLE` paths and the
//! mid-sequence failure ordering of multi-blob writes.

use super::BlobStore;
use crate::types::EconomyError;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Thread-safe in-memory blob store
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: DashMap<String, Value>,
    fail_all: AtomicBool,
    fail_save_key: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every load and save fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Make saves for one specific key fail (loads still succeed)
    pub fn set_fail_save_key(&self, key: Option<&str>) {
        let mut guard = self
            .fail_save_key
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *guard = key.map(|k| k.to_string());
    }

    fn check_available(&self) -> Result<(), EconomyError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(EconomyError::storage_unavailable("memory store offline"));
        }
        Ok(())
    }
}

impl BlobStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, EconomyError> {
        self.check_available()?;
        Ok(self.blobs.get(key).map(|entry| entry.value().clone()))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), EconomyError> {
        self.check_available()?;
        let fail_key = self
            .fail_save_key
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if fail_key.as_deref() == Some(key) {
            return Err(EconomyError::storage_unavailable(format!(
                "save rejected for key '{}'",
                key
            )));
        }
        drop(fail_key);
        self.blobs.insert(key.to_string(), value.clone());
        Ok(())
    }
}
