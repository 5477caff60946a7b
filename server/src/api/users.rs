//! User registration and lookup endpoints.
//!
//! Minimal identity plumbing so the directory the ledger consults can be
//! populated. Credentials, sessions and roles live outside this service.

use crate::error::AppError;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ridepool_core::{UserDirectory, UserId, UserProfile};
use serde::Deserialize;
use uuid::Uuid;

/// Request to register a user.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    /// Display name shown in notification messages
    pub name: String,
}

/// Register a new user.
///
/// # Errors
///
/// Returns `400` when the name is blank.
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Name must not be empty"));
    }
    let profile = state.directory.register(name);
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Get a user profile by id.
///
/// # Errors
///
/// Returns `404` when the user is unknown.
pub async fn get_user(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    state
        .directory
        .find_user(UserId::from_uuid(user_id))
        .map(Json)
        .ok_or_else(|| AppError::not_found("User", user_id))
}
