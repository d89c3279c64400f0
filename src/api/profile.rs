//! Profile field endpoints

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};
use serde::Serialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{FediverseIdentity, ProfileFieldsInput};
use crate::settings::ProfileField;

/// Create profile router
///
/// Routes:
/// - GET /v1/profile - The current user's profile screen
/// - GET /v1/users/:user_id/profile_fields - Public profile fields
/// - PUT /v1/users/:user_id/profile_fields - Replace profile fields
pub fn profile_router() -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_own_profile))
        .route(
            "/v1/users/:user_id/profile_fields",
            get(get_profile_fields).put(update_profile_fields),
        )
}

/// Own profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub identity: FediverseIdentity,
    pub fields: Vec<ProfileField>,
}

/// GET /api/v1/profile
///
/// The ActivityPub section of the user's own profile screen: how the
/// fediverse addresses them, and their custom fields.
async fn get_own_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let server = &state.config.server;
    let identity = FediverseIdentity::new(&user.username, &server.domain, &server.base_url())?;
    let list = state.profiles.load(&user.user_id).await?;

    Ok(Json(ProfileResponse {
        user_id: user.user_id,
        identity,
        fields: list.to_ordered_sequence(),
    }))
}

/// Profile fields response
#[derive(Debug, Serialize)]
pub struct ProfileFieldsResponse {
    pub user_id: String,
    pub fields: Vec<ProfileField>,
}

/// GET /api/v1/users/:user_id/profile_fields
///
/// Profile fields are shown on the public profile, so no
/// authentication is required.
async fn get_profile_fields(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileFieldsResponse>, AppError> {
    let list = state.profiles.load(&user_id).await?;
    Ok(Json(ProfileFieldsResponse {
        user_id,
        fields: list.to_ordered_sequence(),
    }))
}

/// PUT /api/v1/users/:user_id/profile_fields
async fn update_profile_fields(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
    Json(input): Json<ProfileFieldsInput>,
) -> Result<Json<ProfileFieldsResponse>, AppError> {
    let list = state.profiles.save(&user, &user_id, input).await?;
    Ok(Json(ProfileFieldsResponse {
        user_id,
        fields: list.to_ordered_sequence(),
    }))
}
