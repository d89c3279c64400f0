//! Common test utilities for E2E tests

#![allow(dead_code)]

pub mod schema_validator;

use activitypub_settings::auth::{Capability, Session, create_session_token};
use activitypub_settings::{AppState, config};
use chrono::{Duration, Utc};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "test.example.com".to_string(),
                protocol: "https".to_string(),
            },
            database: config::DatabaseConfig { path: db_path },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                session_max_age: 604800,
            },
            defaults: config::DefaultsConfig::default(),
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = activitypub_settings::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a signed token for a host user
    pub fn token_for(&self, user_id: &str, capabilities: Vec<Capability>) -> String {
        self.token_with_lifetime(user_id, capabilities, Duration::days(1))
    }

    /// Create a signed token with an explicit lifetime
    pub fn token_with_lifetime(
        &self,
        user_id: &str,
        capabilities: Vec<Capability>,
        lifetime: Duration,
    ) -> String {
        let now = Utc::now();
        let session = Session {
            user_id: user_id.to_string(),
            username: format!("user{}", user_id),
            capabilities,
            created_at: now,
            expires_at: now + lifetime,
        };

        create_session_token(&session, &self.state.config.auth.session_secret)
            .expect("Failed to create test token")
    }

    /// Token for a site administrator
    pub fn admin_token(&self) -> String {
        self.token_for(
            "1",
            vec![
                Capability::Read,
                Capability::ManageOptions,
                Capability::EditUsers,
            ],
        )
    }

    /// Token for an author without admin rights
    pub fn author_token(&self, user_id: &str) -> String {
        self.token_for(user_id, vec![Capability::Read])
    }
}
