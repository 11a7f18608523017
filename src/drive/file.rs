//! File metadata rows. The bytes themselves live in object storage; a row
//! here carries the key that points at them.

use sqlx::SqlitePool;

use crate::{CirrusError, Result};

const FILE_COLUMNS: &str = "id, name, original_name, mime_type, size, storage_key, etag, \
     owner_id, folder_id, is_starred, created_at, updated_at";

/// A file metadata row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredFile {
    /// File ID.
    pub id: i64,
    /// Current display name.
    pub name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// MIME type reported at upload.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Object-store key. Never exposed over the API.
    pub storage_key: String,
    /// Integrity tag from the backend. Never exposed over the API.
    pub etag: Option<String>,
    /// Owning user.
    pub owner_id: i64,
    /// Containing folder, or None at the root.
    pub folder_id: Option<i64>,
    /// Star flag.
    pub is_starred: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// Data for inserting a file row after its blob has been stored.
#[derive(Debug, Clone)]
pub struct NewStoredFile {
    /// Display name (initially the upload name).
    pub name: String,
    /// Name the file was uploaded with.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Object-store key.
    pub storage_key: String,
    /// Integrity tag from the backend.
    pub etag: Option<String>,
    /// Owning user.
    pub owner_id: i64,
    /// Containing folder.
    pub folder_id: Option<i64>,
}

/// Repository for file metadata. All lookups are owner-scoped.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a file row. Returns the row with its assigned ID.
    pub async fn create(&self, new_file: &NewStoredFile) -> Result<StoredFile> {
        let result = sqlx::query(
            "INSERT INTO files (name, original_name, mime_type, size, storage_key, etag,
                                owner_id, folder_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_file.name)
        .bind(&new_file.original_name)
        .bind(&new_file.mime_type)
        .bind(new_file.size)
        .bind(&new_file.storage_key)
        .bind(&new_file.etag)
        .bind(new_file.owner_id)
        .bind(new_file.folder_id)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get(id, new_file.owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("file".to_string()))
    }

    /// Get a file by ID, scoped to its owner.
    pub async fn get(&self, id: i64, owner_id: i64) -> Result<Option<StoredFile>> {
        let file = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(file)
    }

    /// List files in a folder (None = root level), newest first.
    pub async fn list(&self, owner_id: i64, folder_id: Option<i64>) -> Result<Vec<StoredFile>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE owner_id = ? AND folder_id {}
             ORDER BY created_at DESC, id DESC",
            if folder_id.is_some() { "= ?" } else { "IS NULL" }
        );

        let mut query = sqlx::query_as::<_, StoredFile>(&sql).bind(owner_id);
        if let Some(folder_id) = folder_id {
            query = query.bind(folder_id);
        }

        let files = query
            .fetch_all(self.pool)
            .await
            .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Rename a file. Returns the updated row, or None if missing.
    pub async fn rename(&self, id: i64, owner_id: i64, name: &str) -> Result<Option<StoredFile>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CirrusError::Validation(
                "file name must not be empty".to_string(),
            ));
        }
        if name.len() > super::MAX_NAME_LENGTH {
            return Err(CirrusError::Validation(format!(
                "file name exceeds {} characters",
                super::MAX_NAME_LENGTH
            )));
        }

        let result = sqlx::query(
            "UPDATE files SET name = ?, updated_at = datetime('now')
             WHERE id = ? AND owner_id = ?",
        )
        .bind(name)
        .bind(id)
        .bind(owner_id)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id, owner_id).await
    }

    /// Toggle the star flag. Returns the updated row, or None if missing.
    pub async fn toggle_star(&self, id: i64, owner_id: i64) -> Result<Option<StoredFile>> {
        let result = sqlx::query(
            "UPDATE files SET is_starred = NOT is_starred, updated_at = datetime('now')
             WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id, owner_id).await
    }

    /// Delete a file row. Returns true if a row was removed.
    pub async fn delete(&self, id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool)
            .await
            .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count files owned by a user.
    pub async fn count(&self, owner_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| CirrusError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
