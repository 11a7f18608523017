//! Recent-activity handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::activity::ActivityLog;

use super::AppState;
use crate::web::dto::{ActivityQuery, ActivityResponse, ApiResponse, MessageResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// List the authenticated user's recent activity, newest first.
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityResponse>>>, ApiError> {
    let entries = ActivityLog::new(state.db.pool())
        .list(auth.user_id(), query.limit)
        .await?;

    Ok(Json(ApiResponse::new(
        entries.into_iter().map(ActivityResponse::from).collect(),
    )))
}

/// Clear the authenticated user's activity trail.
pub async fn clear_activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let removed = ActivityLog::new(state.db.pool())
        .clear(auth.user_id())
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new(format!(
        "{removed} activities cleared"
    )))))
}
