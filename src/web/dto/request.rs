//! Request DTOs for the Web API.

use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    /// Email address.
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    /// Optional bio.
    pub bio: Option<String>,
    /// Optional profile picture URL.
    pub profile_picture: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Profile update request. Absent fields are left unchanged; explicit
/// nulls clear the optional fields.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: Option<String>,
    /// New bio; null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    /// New profile picture URL; null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub profile_picture: Option<Option<String>>,
}

/// Folder creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder ID, or absent/null for a root folder.
    pub parent: Option<i64>,
}

/// Folder update request. Distinguishes an absent `parent` (leave alone)
/// from an explicit null (move to the root).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    /// New parent; null moves the folder to the root.
    #[serde(default, deserialize_with = "double_option")]
    pub parent: Option<Option<i64>>,
}

/// File rename request.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

/// Query parameters for file listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// Folder to list; absent means the root level.
    pub folder: Option<i64>,
}

/// Query parameters for folder listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListFoldersQuery {
    /// Parent folder; absent means the root level.
    pub parent: Option<i64>,
}

/// Query parameters for activity listings.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Maximum number of entries to return.
    pub limit: Option<i64>,
}

/// Deserialize a field so that absence, null, and a value are all
/// distinguishable (`None`, `Some(None)`, `Some(Some(v))`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
