//! Persistence collaborator.
//!
//! The engine treats persistence as an abstract key-value store over named
//! buckets; the default implementation keeps one JSON file per bucket.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Bucket names understood by the engine.
pub mod bucket {
    pub const TARGETS: &str = "targets";
    pub const AUTHS: &str = "auths";
    pub const ENV_VARS: &str = "env_vars";
    pub const COLLECTIONS: &str = "collections";
    pub const LOGS: &str = "logs";
    pub const HISTORY: &str = "history";
}

/// Storage error types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Abstract bucketed key-value store.
///
/// A missing or unreadable bucket is not an error: `load` falls back to the
/// supplied default so the engine starts cleanly on first run.
pub trait Storage: Send + Sync {
    fn load_raw(&self, bucket: &str) -> Option<String>;
    fn save_raw(&self, bucket: &str, payload: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Load a bucket, deserializing into `T` and falling back to `default`.
pub fn load_or<T: DeserializeOwned>(storage: &dyn Storage, bucket: &str, default: T) -> T {
    match storage.load_raw(bucket) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring corrupt bucket '{}': {}", bucket, e);
                default
            }
        },
        None => default,
    }
}

/// Serialize and save a value into a bucket. Failures are logged, not fatal.
pub fn save<T: Serialize>(storage: &dyn Storage, bucket: &str, value: &T) {
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to serialize bucket '{}': {}", bucket, e);
            return;
        }
    };
    if let Err(e) = storage.save_raw(bucket, &payload) {
        tracing::error!("Failed to save bucket '{}': {}", bucket, e);
    }
}

/// File-backed store: one `<bucket>.json` per bucket under the data dir.
pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.dir.join(format!("{}.json", bucket))
    }
}

impl Storage for JsonStorage {
    fn load_raw(&self, bucket: &str) -> Option<String> {
        let path = self.bucket_path(bucket);
        if !path.exists() {
            return None;
        }
        fs::read_to_string(&path).ok()
    }

    fn save_raw(&self, bucket: &str, payload: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.bucket_path(bucket), payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|e| e == "json") {
                    fs::remove_file(path)?;
                }
            }
        }
        Ok(())
    }
}

/// In-memory store used by tests.
#[derive(Default)]
pub struct MemoryStorage {
    buckets: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn load_raw(&self, bucket: &str) -> Option<String> {
        self.buckets.lock().unwrap().get(bucket).cloned()
    }

    fn save_raw(&self, bucket: &str, payload: &str) -> Result<(), StorageError> {
        self.buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), payload.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.buckets.lock().unwrap().clear();
        Ok(())
    }
}
