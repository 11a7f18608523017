//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::JwtState;

use super::handlers::{
    clear_activity, create_folder, delete_file, download_file, get_file, get_folder, get_profile,
    list_activity, list_files, list_folders, login, register, rename_file, star_file, star_folder,
    trash_folder, update_folder, update_profile, upload_files, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let user_routes = Router::new().route("/profile", get(get_profile).patch(update_profile));

    let file_routes = Router::new()
        .route("/", post(upload_files).get(list_files))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/star", patch(star_file))
        .route("/:id/rename", patch(rename_file));

    let folder_routes = Router::new()
        .route("/", post(create_folder).get(list_folders))
        .route(
            "/:id",
            get(get_folder).patch(update_folder).delete(trash_folder),
        )
        .route("/:id/star", patch(star_folder));

    let activity_routes = Router::new().route("/", get(list_activity).delete(clear_activity));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/files", file_routes)
        .nest("/folders", folder_routes)
        .nest("/recent-activity", activity_routes);

    let jwt_state_for_middleware = jwt_state.clone();
    let body_limit = app_state.max_upload_size;

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                }))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
