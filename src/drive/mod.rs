//! File and folder management: metadata in SQLite, bytes in object
//! storage, orchestrated by [`DriveService`].

mod file;
mod folder;
mod service;

pub use file::{FileRepository, NewStoredFile, StoredFile};
pub use folder::{Folder, FolderListing, FolderRepository, FolderUpdate, NewFolder};
pub use service::{DownloadTarget, DriveService, UploadPart};

/// Lifetime of presigned download URLs, in seconds.
pub const DOWNLOAD_URL_TTL_SECS: u32 = 3600;

/// Longest accepted file or folder name.
pub const MAX_NAME_LENGTH: usize = 255;
