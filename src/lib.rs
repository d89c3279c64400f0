//! ActivityPub Settings - typed option registry and profile fields for an
//! ActivityPub publishing plugin
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Settings API (exposed options, preview)                  │
//! │  - Profile fields                                           │
//! │  - Admin pages / settings form                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - SettingsService (validate, then persist)                 │
//! │  - ProfileService (authorized profile save)                 │
//! │  - ContentPolicy (options applied to posts)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Settings Core / Data Layer                   │
//! │  - OptionRegistry (frozen after startup)                    │
//! │  - ProfileFieldList (max 4 fields)                          │
//! │  - KeyValueStore: SQLite (sqlx) or in-memory                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `settings`: Option descriptors, registry, profile field lists
//! - `service`: Business logic layer
//! - `data`: SQLite persistence
//! - `api`: HTTP handlers
//! - `admin`: Admin menu model and assets
//! - `auth`: Host-issued session tokens
//! - `config`: Configuration management
//! - `error`: Error types

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod settings;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request. The option registry held by
/// the settings service is frozen and read-only for the life of the
/// process.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Settings façade
    pub settings: service::SettingsService,

    /// Profile field service
    pub profiles: service::ProfileService,

    /// Admin pages
    pub admin_menu: Arc<admin::AdminMenu>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Build the option registry
    /// 3. Wire services
    ///
    /// # Errors
    /// Returns error if any initialization step fails. An invalid option
    /// table is fatal.
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;
        tracing::info!("Database connected");

        Self::with_store(config, Arc::new(db))
    }

    /// Initialize application state over an existing store
    pub fn with_store(
        config: config::AppConfig,
        store: Arc<dyn settings::KeyValueStore>,
    ) -> Result<Self, error::AppError> {
        let registry = settings::OptionRegistry::activitypub(&config.defaults)
            .inspect_err(|e| tracing::error!(error = %e, "Option registration failed"))?;
        metrics::OPTIONS_REGISTERED.set(registry.len() as i64);
        tracing::info!(options = registry.len(), "Option registry initialized");

        let settings = service::SettingsService::new(Arc::new(registry), store.clone());
        let profiles = service::ProfileService::new(store);

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            settings,
            profiles,
            admin_menu: Arc::new(admin::AdminMenu::activitypub()),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::api_router())
        .nest("/admin", api::admin_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
