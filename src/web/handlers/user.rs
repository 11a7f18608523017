//! Profile handlers.

use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::account::AccountLedger;
use crate::db::{ProfileUpdate, UserRepository};

use super::AppState;
use crate::web::dto::{ApiResponse, ProfileResponse, UpdateProfileRequest};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// Get the authenticated user's profile with usage aggregates.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let profile = AccountLedger::new(state.db.pool())
        .profile(auth.user_id())
        .await?;

    Ok(Json(ApiResponse::new(profile.into())))
}

/// Update the authenticated user's profile fields.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let mut update = ProfileUpdate::new();
    if let Some(name) = req.name {
        update.name = Some(name.trim().to_string());
    }
    if let Some(bio) = req.bio {
        update.bio = Some(bio);
    }
    if let Some(picture) = req.profile_picture {
        update.profile_picture = Some(picture);
    }

    UserRepository::new(state.db.pool())
        .update_profile(auth.user_id(), &update)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let profile = AccountLedger::new(state.db.pool())
        .profile(auth.user_id())
        .await?;

    Ok(Json(ApiResponse::new(profile.into())))
}
