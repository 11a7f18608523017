//! File handlers: upload, listing, metadata, download, rename, star,
//! delete.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::drive::UploadPart;

use super::AppState;
use crate::web::dto::{
    ApiResponse, DownloadResponse, FileResponse, ListFilesQuery, MessageResponse, RenameRequest,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// Upload one or more files as multipart form data.
///
/// Fields named `file` (or `files`) carry content; an optional `folder`
/// field places the batch in a folder. The batch lands whole or not at
/// all.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<FileResponse>>>), ApiError> {
    let mut parts: Vec<UploadPart> = Vec::new();
    let mut folder_id: Option<i64> = None;
    let mut total: usize = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("folder") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid folder field: {e}")))?;
                if !text.is_empty() {
                    folder_id = Some(
                        text.parse()
                            .map_err(|_| ApiError::bad_request("folder must be an ID"))?,
                    );
                }
            }
            Some("file") | Some("files") => {
                let name = field
                    .file_name()
                    .map(|n| n.to_string())
                    .ok_or_else(|| ApiError::bad_request("file field is missing a filename"))?;

                let mime_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&name)
                            .first_or_octet_stream()
                            .to_string()
                    });

                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?
                    .to_vec();

                total += content.len();
                if total > state.max_upload_size {
                    return Err(ApiError::bad_request("upload exceeds the size limit"));
                }

                parts.push(UploadPart {
                    name,
                    mime_type,
                    content,
                });
            }
            _ => {}
        }
    }

    let stored = state
        .drive()
        .upload_batch(auth.user_id(), folder_id, parts)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            stored.into_iter().map(FileResponse::from).collect(),
        )),
    ))
}

/// List files in a folder (or at the root), newest first.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state
        .drive()
        .list_files(auth.user_id(), query.folder)
        .await?;

    Ok(Json(ApiResponse::new(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

/// Get one file's metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.drive().get_file(id, auth.user_id()).await?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// Delete a file, reclaiming its quota.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.drive().delete_file(id, auth.user_id()).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new("file deleted"))))
}

/// Get a time-limited download URL for a file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DownloadResponse>>, ApiError> {
    let target = state.drive().download_file(id, auth.user_id()).await?;
    Ok(Json(ApiResponse::new(target.into())))
}

/// Toggle a file's star flag.
pub async fn star_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.drive().star_file(id, auth.user_id()).await?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// Rename a file.
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let file = state
        .drive()
        .rename_file(id, auth.user_id(), &req.name)
        .await?;

    Ok(Json(ApiResponse::new(file.into())))
}
