//! Settings API endpoints
//!
//! Publishes the externally visible options with their schema, and
//! offers a publishing preview driven by the current option values.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{Capability, CurrentUser};
use crate::error::AppError;
use crate::service::{ContentPolicy, OptionEntry, PostContent, RenderedObject};

/// Create settings router
///
/// Routes:
/// - GET /v1/settings - List exposed options
/// - GET /v1/settings/:name - Get one exposed option
/// - PUT /v1/settings/:name - Update one exposed option
/// - POST /v1/preview - Render a post with the current options
pub fn settings_router() -> Router<AppState> {
    Router::new()
        .route("/v1/settings", get(list_settings))
        .route("/v1/settings/:name", get(get_setting).put(update_setting))
        .route("/v1/preview", post(preview))
}

/// GET /api/v1/settings
async fn list_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OptionEntry>>, AppError> {
    user.require(Capability::ManageOptions)?;
    Ok(Json(state.settings.exposed_entries().await?))
}

/// GET /api/v1/settings/:name
async fn get_setting(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<OptionEntry>, AppError> {
    user.require(Capability::ManageOptions)?;
    Ok(Json(state.settings.exposed_entry(&name).await?))
}

/// Update option request
///
/// The value is kept as raw JSON so that a wrong JSON type is reported
/// as a type mismatch instead of a body rejection.
#[derive(Debug, Deserialize)]
struct UpdateSettingRequest {
    value: serde_json::Value,
}

/// PUT /api/v1/settings/:name
///
/// Only exposed options can be written here; the admin settings form
/// covers the rest.
async fn update_setting(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<OptionEntry>, AppError> {
    user.require(Capability::ManageOptions)?;

    // Unexposed options are reported as unknown
    state.settings.exposed_entry(&name).await?;

    let value = state.settings.decode(&name, req.value)?;
    state.settings.write_option(&name, value).await?;
    Ok(Json(state.settings.exposed_entry(&name).await?))
}

/// POST /api/v1/preview
async fn preview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(post): Json<PostContent>,
) -> Result<Json<RenderedObject>, AppError> {
    user.require(Capability::ManageOptions)?;

    let policy = ContentPolicy::load(&state.settings, &state.config.server.base_url()).await?;
    Ok(Json(policy.render(&post)?))
}
