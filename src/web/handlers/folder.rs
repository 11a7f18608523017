//! Folder handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::drive::{FolderUpdate, NewFolder};

use super::AppState;
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, FolderDetailResponse, FolderResponse, ListFoldersQuery,
    MessageResponse, UpdateFolderRequest,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// Create a folder, optionally inside a parent.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let folder = state
        .drive()
        .create_folder(&NewFolder::new(req.name, auth.user_id(), req.parent))
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(folder.into()))))
}

/// List non-trashed folders under a parent, with item counts.
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListFoldersQuery>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let folders = state
        .drive()
        .list_folders(auth.user_id(), query.parent)
        .await?;

    Ok(Json(ApiResponse::new(
        folders.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// Get a folder together with its direct contents.
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDetailResponse>>, ApiError> {
    let (folder, subfolders, files) = state.drive().get_folder(id, auth.user_id()).await?;

    Ok(Json(ApiResponse::new(FolderDetailResponse {
        folder: folder.into(),
        folders: subfolders.into_iter().map(FolderResponse::from).collect(),
        files: files.into_iter().map(Into::into).collect(),
    })))
}

/// Rename and/or move a folder.
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let update = FolderUpdate {
        name: req.name,
        parent: req.parent,
    };

    let folder = state
        .drive()
        .update_folder(id, auth.user_id(), &update)
        .await?;

    Ok(Json(ApiResponse::new(folder.into())))
}

/// Move a folder and its whole subtree to the trash.
pub async fn trash_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.drive().trash_folder(id, auth.user_id()).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new(
        "folder moved to trash",
    ))))
}

/// Toggle a folder's star flag.
pub async fn star_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = state.drive().star_folder(id, auth.user_id()).await?;
    Ok(Json(ApiResponse::new(folder.into())))
}
