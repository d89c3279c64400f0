//! API layer
//!
//! HTTP handlers for:
//! - Settings API (exposed options, publishing preview)
//! - Profile fields
//! - Admin pages and settings form
//! - Metrics (Prometheus)

mod admin;
pub mod metrics;
mod profile;
mod settings;

pub use admin::admin_router;
pub use metrics::metrics_router;
pub use profile::{ProfileFieldsResponse, ProfileResponse, profile_router};
pub use settings::settings_router;

use axum::Router;

use crate::AppState;

/// Routes nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(settings_router())
        .merge(profile_router())
}
