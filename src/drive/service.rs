//! Drive service: orchestrates quota, object storage, metadata rows, and
//! the activity trail for file and folder operations.

use serde_json::json;

use crate::account::AccountLedger;
use crate::activity::{ActivityAction, ActivityLog, ItemKind};
use crate::db::Database;
use crate::storage::BlobStore;
use crate::{CirrusError, Result};

use super::file::{FileRepository, NewStoredFile, StoredFile};
use super::folder::{Folder, FolderListing, FolderRepository, FolderUpdate, NewFolder};
use super::DOWNLOAD_URL_TTL_SECS;

/// One file in an upload batch, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Filename from the multipart field.
    pub name: String,
    /// Declared content type.
    pub mime_type: String,
    /// File bytes.
    pub content: Vec<u8>,
}

/// Resolved download target: a presigned URL plus the metadata a client
/// needs to save the file.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    /// Time-limited retrieval URL.
    pub url: String,
    /// Name to save the file as.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
}

/// Coordinates the storage backend and the metadata tables for one request.
pub struct DriveService<'a> {
    db: &'a Database,
    store: &'a dyn BlobStore,
}

impl<'a> DriveService<'a> {
    /// Create a service over a database and blob store.
    pub fn new(db: &'a Database, store: &'a dyn BlobStore) -> Self {
        Self { db, store }
    }

    fn files(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool())
    }

    fn folders(&self) -> FolderRepository<'_> {
        FolderRepository::new(self.db.pool())
    }

    fn ledger(&self) -> AccountLedger<'_> {
        AccountLedger::new(self.db.pool())
    }

    fn log(&self) -> ActivityLog<'_> {
        ActivityLog::new(self.db.pool())
    }

    /// Record an activity entry, logging instead of failing on error. The
    /// mutation the entry describes has already committed.
    async fn record_activity(
        &self,
        user_id: i64,
        item_id: i64,
        kind: ItemKind,
        action: ActivityAction,
        metadata: Option<serde_json::Value>,
    ) {
        if let Err(e) = self
            .log()
            .record(user_id, item_id, kind, action, metadata)
            .await
        {
            tracing::warn!(user_id, item_id, %action, "failed to record activity: {e}");
        }
    }

    /// Upload a batch of files into a folder, all-or-nothing.
    ///
    /// The combined size is reserved against the owner's quota before any
    /// blob is written, so a batch that would overshoot the limit is
    /// rejected with no side effects. If any upload or insert fails partway
    /// through, blobs and rows created so far are removed and the full
    /// reservation is released before the error propagates.
    pub async fn upload_batch(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
        parts: Vec<UploadPart>,
    ) -> Result<Vec<StoredFile>> {
        if parts.is_empty() {
            return Err(CirrusError::Validation("no files provided".to_string()));
        }

        if let Some(folder_id) = folder_id {
            let folder = self
                .folders()
                .get(folder_id, owner_id)
                .await?
                .ok_or_else(|| CirrusError::NotFound("folder".to_string()))?;
            if folder.is_trashed {
                return Err(CirrusError::Validation(
                    "cannot upload into a trashed folder".to_string(),
                ));
            }
        }

        let total: i64 = parts.iter().map(|p| p.content.len() as i64).sum();
        self.ledger().reserve(owner_id, total).await?;

        match self.store_parts(owner_id, folder_id, &parts).await {
            Ok(stored) => {
                for file in &stored {
                    self.record_activity(
                        owner_id,
                        file.id,
                        ItemKind::File,
                        ActivityAction::Uploaded,
                        Some(json!({ "size": file.size })),
                    )
                    .await;
                }
                Ok(stored)
            }
            Err((created, err)) => {
                self.compensate(owner_id, total, created).await;
                Err(err)
            }
        }
    }

    /// Store each part in sequence. On failure, returns whatever was
    /// already created so the caller can roll it back.
    async fn store_parts(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
        parts: &[UploadPart],
    ) -> std::result::Result<Vec<StoredFile>, (Vec<StoredFile>, CirrusError)> {
        let mut stored = Vec::with_capacity(parts.len());

        for part in parts {
            let handle = match self
                .store
                .put(&part.content, &part.mime_type, &part.name)
                .await
            {
                Ok(handle) => handle,
                Err(e) => return Err((stored, e.into())),
            };

            let new_file = NewStoredFile {
                name: part.name.clone(),
                original_name: part.name.clone(),
                mime_type: part.mime_type.clone(),
                size: part.content.len() as i64,
                storage_key: handle.key.clone(),
                etag: handle.etag,
                owner_id,
                folder_id,
            };

            match self.files().create(&new_file).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    // The blob is in but the row is not; make the orphan
                    // part of the rollback set.
                    if let Err(del_err) = self.store.delete(&handle.key).await {
                        tracing::warn!(key = %handle.key, "orphan blob cleanup failed: {del_err}");
                    }
                    return Err((stored, e));
                }
            }
        }

        Ok(stored)
    }

    /// Roll back a failed batch: delete blobs and rows created so far and
    /// release the full reservation. Cleanup failures are logged, not
    /// propagated; the original error matters more to the caller.
    async fn compensate(&self, owner_id: i64, reserved: i64, created: Vec<StoredFile>) {
        for file in created {
            if let Err(e) = self.store.delete(&file.storage_key).await {
                tracing::warn!(key = %file.storage_key, "rollback blob delete failed: {e}");
            }
            if let Err(e) = self.files().delete(file.id, owner_id).await {
                tracing::warn!(file_id = file.id, "rollback row delete failed: {e}");
            }
        }

        if let Err(e) = self.ledger().release(owner_id, reserved).await {
            tracing::warn!(owner_id, reserved, "rollback quota release failed: {e}");
        }
    }

    /// List files in a folder (None = root), newest first.
    pub async fn list_files(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
    ) -> Result<Vec<StoredFile>> {
        self.files().list(owner_id, folder_id).await
    }

    /// Fetch a file's metadata, recording a `viewed` entry.
    pub async fn get_file(&self, id: i64, owner_id: i64) -> Result<StoredFile> {
        let file = self
            .files()
            .get(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))?;

        self.record_activity(owner_id, file.id, ItemKind::File, ActivityAction::Viewed, None)
            .await;

        Ok(file)
    }

    /// Delete a file: blob first, then quota release, then the row.
    ///
    /// An already-absent blob is tolerated; any other storage failure
    /// aborts before the row or quota are touched, so the file stays
    /// visible and retryable rather than silently leaking the blob.
    pub async fn delete_file(&self, id: i64, owner_id: i64) -> Result<()> {
        let file = self
            .files()
            .get(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))?;

        let removed = self.store.delete(&file.storage_key).await?;
        if !removed {
            tracing::warn!(key = %file.storage_key, "blob already absent at delete");
        }

        self.ledger().release(owner_id, file.size).await?;
        self.files().delete(id, owner_id).await?;

        self.record_activity(
            owner_id,
            file.id,
            ItemKind::File,
            ActivityAction::Deleted,
            Some(json!({ "name": file.name, "size": file.size })),
        )
        .await;

        Ok(())
    }

    /// Produce a time-limited download URL and record the download.
    pub async fn download_file(&self, id: i64, owner_id: i64) -> Result<DownloadTarget> {
        let file = self
            .files()
            .get(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))?;

        let url = self
            .store
            .presigned_url(&file.storage_key, DOWNLOAD_URL_TTL_SECS)
            .await?;

        self.record_activity(
            owner_id,
            file.id,
            ItemKind::File,
            ActivityAction::Downloaded,
            None,
        )
        .await;

        Ok(DownloadTarget {
            url,
            filename: file.original_name,
            mime_type: file.mime_type,
        })
    }

    /// Rename a file and record it.
    pub async fn rename_file(&self, id: i64, owner_id: i64, name: &str) -> Result<StoredFile> {
        let before = self
            .files()
            .get(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))?;

        let file = self
            .files()
            .rename(id, owner_id, name)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))?;

        self.record_activity(
            owner_id,
            file.id,
            ItemKind::File,
            ActivityAction::Renamed,
            Some(json!({ "from": before.name, "to": file.name })),
        )
        .await;

        Ok(file)
    }

    /// Toggle a file's star flag and record it.
    pub async fn star_file(&self, id: i64, owner_id: i64) -> Result<StoredFile> {
        let file = self
            .files()
            .toggle_star(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))?;

        self.record_activity(
            owner_id,
            file.id,
            ItemKind::File,
            ActivityAction::Starred,
            Some(json!({ "starred": file.is_starred })),
        )
        .await;

        Ok(file)
    }

    /// Create a folder and record it.
    pub async fn create_folder(&self, new_folder: &NewFolder) -> Result<Folder> {
        let folder = self.folders().create(new_folder).await?;

        self.record_activity(
            folder.owner_id,
            folder.id,
            ItemKind::Folder,
            ActivityAction::Created,
            None,
        )
        .await;

        Ok(folder)
    }

    /// List non-trashed folders under a parent, with item counts.
    pub async fn list_folders(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<FolderListing>> {
        self.folders().list(owner_id, parent_id).await
    }

    /// Fetch a folder together with its direct contents.
    pub async fn get_folder(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<(Folder, Vec<FolderListing>, Vec<StoredFile>)> {
        let folder = self
            .folders()
            .get(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("folder".to_string()))?;

        let subfolders = self.folders().list(owner_id, Some(id)).await?;
        let files = self.files().list(owner_id, Some(id)).await?;

        Ok((folder, subfolders, files))
    }

    /// Rename and/or move a folder, recording each kind of change.
    pub async fn update_folder(
        &self,
        id: i64,
        owner_id: i64,
        update: &FolderUpdate,
    ) -> Result<Folder> {
        let folder = self
            .folders()
            .update(id, owner_id, update)
            .await?
            .ok_or_else(|| CirrusError::NotFound("folder".to_string()))?;

        if update.name.is_some() {
            self.record_activity(
                owner_id,
                folder.id,
                ItemKind::Folder,
                ActivityAction::Renamed,
                None,
            )
            .await;
        }
        if update.parent.is_some() {
            self.record_activity(
                owner_id,
                folder.id,
                ItemKind::Folder,
                ActivityAction::Moved,
                Some(json!({ "parent": folder.parent_id })),
            )
            .await;
        }

        Ok(folder)
    }

    /// Trash a folder and its whole subtree, recording the deletion.
    pub async fn trash_folder(&self, id: i64, owner_id: i64) -> Result<u64> {
        let trashed = self.folders().trash_tree(id, owner_id).await?;
        if trashed == 0 {
            return Err(CirrusError::NotFound("folder".to_string()));
        }

        self.record_activity(
            owner_id,
            id,
            ItemKind::Folder,
            ActivityAction::Deleted,
            Some(json!({ "folders_trashed": trashed })),
        )
        .await;

        Ok(trashed)
    }

    /// Toggle a folder's star flag and record it.
    pub async fn star_folder(&self, id: i64, owner_id: i64) -> Result<Folder> {
        let folder = self
            .folders()
            .toggle_star(id, owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("folder".to_string()))?;

        self.record_activity(
            owner_id,
            folder.id,
            ItemKind::Folder,
            ActivityAction::Starred,
            Some(json!({ "starred": folder.is_starred })),
        )
        .await;

        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::storage::MemoryStore;

    async fn setup(limit: i64) -> (Database, MemoryStore, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("Drive User", "drive@example.com", "hash", limit))
            .await
            .unwrap();
        (db, MemoryStore::new(), user.id)
    }

    fn part(name: &str, size: usize) -> UploadPart {
        UploadPart {
            name: name.to_string(),
            mime_type: "application/octet-stream".to_string(),
            content: vec![0u8; size],
        }
    }

    #[tokio::test]
    async fn test_upload_charges_quota() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let stored = service
            .upload_batch(owner, None, vec![part("a.bin", 500)])
            .await
            .unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].size, 500);
        assert!(store.contains(&stored[0].storage_key));

        let (used, _) = AccountLedger::new(db.pool()).usage(owner).await.unwrap();
        assert_eq!(used, 500);
    }

    #[tokio::test]
    async fn test_upload_over_quota_rejected_cleanly() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let result = service
            .upload_batch(owner, None, vec![part("big.bin", 600), part("more.bin", 600)])
            .await;

        assert!(matches!(result, Err(CirrusError::QuotaExceeded { .. })));
        assert!(store.is_empty());
        assert_eq!(FileRepository::new(db.pool()).count(owner).await.unwrap(), 0);

        let (used, _) = AccountLedger::new(db.pool()).usage(owner).await.unwrap();
        assert_eq!(used, 0);
    }

    #[tokio::test]
    async fn test_upload_empty_batch_rejected() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let result = service.upload_batch(owner, None, vec![]).await;
        assert!(matches!(result, Err(CirrusError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_partial_failure_rolls_back() {
        let (db, store, owner) = setup(10_000).await;
        store.fail_puts_after(1);
        let service = DriveService::new(&db, &store);

        let result = service
            .upload_batch(owner, None, vec![part("ok.bin", 100), part("boom.bin", 100)])
            .await;

        assert!(matches!(result, Err(CirrusError::Storage(_))));
        assert!(store.is_empty());
        assert_eq!(FileRepository::new(db.pool()).count(owner).await.unwrap(), 0);

        let (used, _) = AccountLedger::new(db.pool()).usage(owner).await.unwrap();
        assert_eq!(used, 0);
    }

    #[tokio::test]
    async fn test_upload_into_missing_folder() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let result = service
            .upload_batch(owner, Some(999), vec![part("a.bin", 10)])
            .await;

        assert!(matches!(result, Err(CirrusError::NotFound(_))));
        let (used, _) = AccountLedger::new(db.pool()).usage(owner).await.unwrap();
        assert_eq!(used, 0);
    }

    #[tokio::test]
    async fn test_delete_reclaims_quota() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let stored = service
            .upload_batch(owner, None, vec![part("doomed.bin", 400)])
            .await
            .unwrap();

        service.delete_file(stored[0].id, owner).await.unwrap();

        assert!(store.is_empty());
        let (used, _) = AccountLedger::new(db.pool()).usage(owner).await.unwrap();
        assert_eq!(used, 0);

        // A second upload of the same size now fits.
        service
            .upload_batch(owner, None, vec![part("replacement.bin", 900)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_blob() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let stored = service
            .upload_batch(owner, None, vec![part("ghost.bin", 100)])
            .await
            .unwrap();

        store.delete(&stored[0].storage_key).await.unwrap();

        service.delete_file(stored[0].id, owner).await.unwrap();
        assert_eq!(FileRepository::new(db.pool()).count(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_download_url_and_activity() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let stored = service
            .upload_batch(owner, None, vec![part("report.pdf", 100)])
            .await
            .unwrap();

        let target = service.download_file(stored[0].id, owner).await.unwrap();
        assert!(target.url.starts_with("memory://"));
        assert_eq!(target.filename, "report.pdf");

        let entries = ActivityLog::new(db.pool()).list(owner, None).await.unwrap();
        assert_eq!(entries[0].action, "downloaded");
    }

    #[tokio::test]
    async fn test_get_file_records_view() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let stored = service
            .upload_batch(owner, None, vec![part("peek.txt", 10)])
            .await
            .unwrap();

        service.get_file(stored[0].id, owner).await.unwrap();

        let entries = ActivityLog::new(db.pool()).list(owner, None).await.unwrap();
        assert_eq!(entries[0].action, "viewed");
    }

    #[tokio::test]
    async fn test_folder_lifecycle_with_activity() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let folder = service
            .create_folder(&NewFolder::new("Projects", owner, None))
            .await
            .unwrap();

        service
            .update_folder(folder.id, owner, &FolderUpdate::new().name("Archive"))
            .await
            .unwrap();
        service.star_folder(folder.id, owner).await.unwrap();
        service.trash_folder(folder.id, owner).await.unwrap();

        let actions: Vec<String> = ActivityLog::new(db.pool())
            .list(owner, None)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.action)
            .collect();

        assert_eq!(actions, vec!["deleted", "starred", "renamed", "created"]);
    }

    #[tokio::test]
    async fn test_trash_missing_folder() {
        let (db, store, owner) = setup(1000).await;
        let service = DriveService::new(&db, &store);

        let result = service.trash_folder(42, owner).await;
        assert!(matches!(result, Err(CirrusError::NotFound(_))));
    }
}
