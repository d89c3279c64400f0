//! Persistence boundary
//!
//! The registry never stores values itself. Reads and writes go through a
//! [`KeyValueStore`], whose single-key atomicity is provided by the
//! implementation (SQLite in production, a map in tests).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;

/// Key-value persistence for option values and per-user metadata
///
/// Values are opaque strings (JSON-encoded by the services).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a site option
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Write a site option
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Read a per-user metadata entry
    async fn get_user_meta(&self, user_id: &str, key: &str) -> Result<Option<String>, AppError>;

    /// Write a per-user metadata entry
    async fn set_user_meta(&self, user_id: &str, key: &str, value: &str) -> Result<(), AppError>;
}

/// In-memory store
///
/// Used by tests and when embedding the registry without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    options: RwLock<HashMap<String, String>>,
    user_meta: RwLock<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.options.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.options
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_user_meta(&self, user_id: &str, key: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .user_meta
            .read()
            .await
            .get(&(user_id.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_user_meta(&self, user_id: &str, key: &str, value: &str) -> Result<(), AppError> {
        self.user_meta
            .write()
            .await
            .insert((user_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}
