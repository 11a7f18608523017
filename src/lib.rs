//! Cirrus - personal cloud storage service
//!
//! A web application for storing files in S3-compatible object storage,
//! with hierarchical folders, per-user storage quotas, and a
//! recent-activity audit trail.

pub mod account;
pub mod activity;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod drive;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use account::{AccountLedger, Profile};
pub use activity::{Activity, ActivityAction, ActivityLog, ItemKind};
pub use auth::{
    hash_password, validate_password, verify_password, JwtClaims, JwtState, PasswordError,
    TokenIssuer, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use config::Config;
pub use db::{Database, NewUser, ProfileUpdate, User, UserRepository};
pub use drive::{
    DownloadTarget, DriveService, FileRepository, Folder, FolderListing, FolderRepository,
    FolderUpdate, NewFolder, NewStoredFile, StoredFile, UploadPart,
};
pub use error::{CirrusError, Result};
pub use storage::{BlobHandle, BlobStore, MemoryStore, S3Store, StorageError};
pub use web::WebServer;
