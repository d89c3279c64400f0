//! Admin endpoints
//!
//! Page descriptors for the host to render, asset lists, and the
//! settings form submission. All routes require authentication.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;

use crate::AppState;
use crate::admin::{AdminAsset, AdminPage, assets_for};
use crate::auth::{Capability, CurrentUser};
use crate::error::AppError;

/// Create admin router
///
/// Routes:
/// - GET /admin/menu - Pages visible to the current user
/// - GET /admin/pages/:slug - Page descriptor
/// - GET /admin/assets?hook= - Assets for an admin screen
/// - POST /admin/settings - Save the settings form
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(menu))
        .route("/pages/:slug", get(page))
        .route("/assets", get(assets))
        .route("/settings", post(save_settings))
}

/// GET /admin/menu
async fn menu(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<Vec<AdminPage>> {
    Json(
        state
            .admin_menu
            .visible_to(&user)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /admin/pages/:slug
async fn page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<AdminPage>, AppError> {
    Ok(Json(state.admin_menu.page(&slug, &user)?.clone()))
}

#[derive(Debug, Deserialize)]
struct AssetsQuery {
    #[serde(default)]
    hook: String,
}

/// GET /admin/assets
async fn assets(
    CurrentUser(user): CurrentUser,
    Query(query): Query<AssetsQuery>,
) -> Result<Json<Vec<AdminAsset>>, AppError> {
    user.require(Capability::Read)?;
    Ok(Json(assets_for(&query.hook)))
}

/// POST /admin/settings
///
/// Accepts any registered option. The whole form is rejected if one
/// value is invalid, including values of a JSON type no option has.
async fn save_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(raw): Json<BTreeMap<String, serde_json::Value>>,
) -> Result<StatusCode, AppError> {
    user.require(Capability::ManageOptions)?;
    let values = state.settings.decode_all(raw)?;
    state.settings.write_options(values).await?;
    Ok(StatusCode::NO_CONTENT)
}
