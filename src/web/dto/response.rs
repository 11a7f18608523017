//! Response DTOs for the Web API.

use serde::Serialize;

use crate::account::Profile;
use crate::activity::Activity;
use crate::datetime::to_rfc3339;
use crate::drive::{DownloadTarget, Folder, FolderListing, StoredFile};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Simple message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Authentication response: a bearer token plus the account it belongs to.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// JWT bearer token.
    pub token: String,
    /// The authenticated account.
    pub user: UserSummary,
}

/// Minimal account view embedded in auth responses.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Full profile response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Short bio.
    pub bio: Option<String>,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Number of files owned.
    pub total_files: i64,
    /// Number of folders owned.
    pub total_folders: i64,
    /// Bytes consumed.
    pub storage_used: i64,
    /// Byte ceiling.
    pub storage_limit: i64,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            bio: p.bio,
            profile_picture: p.profile_picture,
            total_files: p.total_files,
            total_folders: p.total_folders,
            storage_used: p.storage_used,
            storage_limit: p.storage_limit,
        }
    }
}

/// File metadata response. Storage keys and integrity tags stay internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Current display name.
    pub name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Containing folder, or null at the root.
    pub folder_id: Option<i64>,
    /// Star flag.
    pub is_starred: bool,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Last modification time, RFC 3339.
    pub updated_at: String,
}

impl From<StoredFile> for FileResponse {
    fn from(f: StoredFile) -> Self {
        Self {
            id: f.id,
            name: f.name,
            original_name: f.original_name,
            mime_type: f.mime_type,
            size: f.size,
            folder_id: f.folder_id,
            is_starred: f.is_starred,
            created_at: to_rfc3339(&f.created_at),
            updated_at: to_rfc3339(&f.updated_at),
        }
    }
}

/// Folder response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Parent folder, or null at the root.
    pub parent_id: Option<i64>,
    /// Star flag.
    pub is_starred: bool,
    /// Files plus non-trashed subfolders directly inside, when listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Last modification time, RFC 3339.
    pub updated_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(f: Folder) -> Self {
        Self {
            id: f.id,
            name: f.name,
            parent_id: f.parent_id,
            is_starred: f.is_starred,
            item_count: None,
            created_at: to_rfc3339(&f.created_at),
            updated_at: to_rfc3339(&f.updated_at),
        }
    }
}

impl From<FolderListing> for FolderResponse {
    fn from(listing: FolderListing) -> Self {
        let mut response: FolderResponse = listing.folder.into();
        response.item_count = Some(listing.item_count);
        response
    }
}

/// Folder detail: the folder plus its direct contents.
#[derive(Debug, Serialize)]
pub struct FolderDetailResponse {
    /// The folder itself.
    pub folder: FolderResponse,
    /// Non-trashed subfolders.
    pub folders: Vec<FolderResponse>,
    /// Files directly inside.
    pub files: Vec<FileResponse>,
}

/// One activity entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    /// Entry ID.
    pub id: i64,
    /// Item the action touched.
    pub item_id: i64,
    /// "file" or "folder".
    pub item_type: String,
    /// Current item name, or null if the item is gone.
    pub item_name: Option<String>,
    /// Action string.
    pub action: String,
    /// Extra context.
    pub metadata: serde_json::Value,
    /// When the action happened, RFC 3339.
    pub created_at: String,
}

impl From<Activity> for ActivityResponse {
    fn from(a: Activity) -> Self {
        let metadata = serde_json::from_str(&a.metadata)
            .unwrap_or(serde_json::Value::Object(Default::default()));

        Self {
            id: a.id,
            item_id: a.item_id,
            item_type: a.item_type,
            item_name: a.item_name,
            action: a.action,
            metadata,
            created_at: to_rfc3339(&a.created_at),
        }
    }
}

/// Download response: a time-limited URL plus save metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// Presigned retrieval URL.
    pub download_url: String,
    /// Name to save the file as.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
}

impl From<DownloadTarget> for DownloadResponse {
    fn from(t: DownloadTarget) -> Self {
        Self {
            download_url: t.url,
            filename: t.filename,
            mime_type: t.mime_type,
        }
    }
}
