//! API handlers for the Web API.

pub mod activity;
pub mod auth;
pub mod file;
pub mod folder;
pub mod user;

pub use activity::*;
pub use auth::*;
pub use file::*;
pub use folder::*;
pub use user::*;

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::db::Database;
use crate::drive::DriveService;
use crate::storage::BlobStore;

/// Shared application state for all handlers.
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Blob storage backend.
    pub store: Arc<dyn BlobStore>,
    /// Token issuer for login and registration.
    pub token_issuer: TokenIssuer,
    /// Storage quota assigned to new accounts, in bytes.
    pub default_storage_limit: i64,
    /// Largest accepted upload body, in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        store: Arc<dyn BlobStore>,
        jwt_secret: &str,
        token_expiry_secs: u64,
        default_storage_limit: i64,
        max_upload_size: usize,
    ) -> Self {
        Self {
            db,
            store,
            token_issuer: TokenIssuer::new(jwt_secret, token_expiry_secs),
            default_storage_limit,
            max_upload_size,
        }
    }

    /// Build a drive service over this state.
    pub fn drive(&self) -> DriveService<'_> {
        DriveService::new(&self.db, self.store.as_ref())
    }
}
