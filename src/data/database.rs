//! SQLite database operations
//!
//! All database access goes through this module.

use std::path::Path;

use async_trait::async_trait;
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::error::AppError;
use crate::settings::KeyValueStore;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Get setting value
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Set setting value
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // User metadata
    // =========================================================================

    /// Get a metadata value for a user
    pub async fn get_user_meta(
        &self,
        user_id: &str,
        meta_key: &str,
    ) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT meta_value FROM user_meta WHERE user_id = ? AND meta_key = ?",
        )
        .bind(user_id)
        .bind(meta_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// Set a metadata value for a user
    pub async fn set_user_meta(
        &self,
        user_id: &str,
        meta_key: &str,
        meta_value: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR REPLACE INTO user_meta (user_id, meta_key, meta_value) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(meta_key)
        .bind(meta_value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.get_setting(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.set_setting(key, value).await
    }

    async fn get_user_meta(&self, user_id: &str, key: &str) -> Result<Option<String>, AppError> {
        Database::get_user_meta(self, user_id, key).await
    }

    async fn set_user_meta(&self, user_id: &str, key: &str, value: &str) -> Result<(), AppError> {
        Database::set_user_meta(self, user_id, key, value).await
    }
}
