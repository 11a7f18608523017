//! Registration and login handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::db::{NewUser, UserRepository};

use super::AppState;
use crate::web::dto::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest, UserSummary};
use crate::web::error::ApiError;

/// Register a new account and log it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let repo = UserRepository::new(state.db.pool());

    if repo.get_by_email(&req.email).await?.is_some() {
        return Err(ApiError::conflict(
            "an account with this email already exists",
        ));
    }

    let hash = hash_password(&req.password)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let mut new_user = NewUser::new(
        req.name.trim(),
        req.email.trim(),
        hash,
        state.default_storage_limit,
    );
    if let Some(bio) = req.bio {
        new_user = new_user.with_bio(bio);
    }
    if let Some(url) = req.profile_picture {
        new_user = new_user.with_profile_picture(url);
    }

    let user = repo.create(&new_user).await?;

    let token = state.token_issuer.issue(user.id, &user.email)?;

    tracing::info!(user_id = user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AuthResponse {
            token,
            user: UserSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        })),
    ))
}

/// Log in with email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let repo = UserRepository::new(state.db.pool());

    // One message for both unknown email and wrong password.
    let user = repo
        .get_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid email or password"))?;

    let token = state.token_issuer.issue(user.id, &user.email)?;

    Ok(Json(ApiResponse::new(AuthResponse {
        token,
        user: UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    })))
}
