//! Folder hierarchy: owner-scoped metadata rows forming a tree.

use serde::Serialize;
use sqlx::{QueryBuilder, SqlitePool};

use crate::{CirrusError, Result};

use super::MAX_NAME_LENGTH;

const FOLDER_COLUMNS: &str = "id, name, owner_id, parent_id, is_starred, is_trashed, \
     created_at, updated_at";

/// A folder row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Folder {
    /// Folder ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Owning user.
    pub owner_id: i64,
    /// Parent folder, or None at the root.
    pub parent_id: Option<i64>,
    /// Star flag.
    pub is_starred: bool,
    /// Soft-delete flag.
    pub is_trashed: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// A folder listing row with its computed item count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FolderListing {
    /// The folder itself.
    #[sqlx(flatten)]
    pub folder: Folder,
    /// Files plus non-trashed subfolders directly inside.
    pub item_count: i64,
}

/// Data for creating a folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Display name.
    pub name: String,
    /// Owning user.
    pub owner_id: i64,
    /// Parent folder, or None for a root folder.
    pub parent_id: Option<i64>,
}

impl NewFolder {
    /// Create a NewFolder.
    pub fn new(name: impl Into<String>, owner_id: i64, parent_id: Option<i64>) -> Self {
        Self {
            name: name.into(),
            owner_id,
            parent_id,
        }
    }
}

/// Builder for folder updates. Unset fields are left unchanged; setting
/// `parent` to `Some(None)` moves the folder to the root.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    /// New name.
    pub name: Option<String>,
    /// New parent (Some(None) detaches to the root).
    pub parent: Option<Option<i64>>,
}

impl FolderUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the parent folder.
    pub fn parent(mut self, parent: Option<i64>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent.is_none()
    }
}

/// Repository for folder CRUD operations. Every query is scoped to an
/// owner; a folder owned by someone else behaves as if it did not exist.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a folder. The parent, if given, must exist, belong to the
    /// same owner, and not be trashed.
    pub async fn create(&self, new_folder: &NewFolder) -> Result<Folder> {
        validate_name(new_folder.name.trim())?;

        if let Some(parent_id) = new_folder.parent_id {
            self.require_usable_parent(parent_id, new_folder.owner_id)
                .await?;
        }

        let result = sqlx::query(
            "INSERT INTO folders (name, owner_id, parent_id) VALUES (?, ?, ?)",
        )
        .bind(new_folder.name.trim())
        .bind(new_folder.owner_id)
        .bind(new_folder.parent_id)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get(id, new_folder.owner_id)
            .await?
            .ok_or_else(|| CirrusError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID, scoped to its owner.
    pub async fn get(&self, id: i64, owner_id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// List non-trashed folders under a parent (None = root level), with
    /// item counts. Item count is files inside plus non-trashed subfolders.
    pub async fn list(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<FolderListing>> {
        let sql = format!(
            "SELECT {FOLDER_COLUMNS},
                    (SELECT COUNT(*) FROM files WHERE folder_id = folders.id)
                  + (SELECT COUNT(*) FROM folders AS sub
                     WHERE sub.parent_id = folders.id AND sub.is_trashed = 0)
                    AS item_count
             FROM folders
             WHERE owner_id = ? AND is_trashed = 0 AND parent_id {}
             ORDER BY created_at DESC, id DESC",
            if parent_id.is_some() { "= ?" } else { "IS NULL" }
        );

        let mut query = sqlx::query_as::<_, FolderListing>(&sql).bind(owner_id);
        if let Some(parent_id) = parent_id {
            query = query.bind(parent_id);
        }

        let folders = query
            .fetch_all(self.pool)
            .await
            .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Update a folder's name and/or parent. A parent change verifies the
    /// new parent's ownership and rejects moves into the folder's own
    /// subtree. Returns None if the folder is missing.
    pub async fn update(
        &self,
        id: i64,
        owner_id: i64,
        update: &FolderUpdate,
    ) -> Result<Option<Folder>> {
        if update.is_empty() {
            return self.get(id, owner_id).await;
        }

        if self.get(id, owner_id).await?.is_none() {
            return Ok(None);
        }

        if let Some(ref name) = update.name {
            validate_name(name.trim())?;
        }

        if let Some(Some(new_parent)) = update.parent {
            if new_parent == id {
                return Err(CirrusError::Validation(
                    "a folder cannot be its own parent".to_string(),
                ));
            }
            self.require_usable_parent(new_parent, owner_id).await?;
            if self.is_descendant(new_parent, id, owner_id).await? {
                return Err(CirrusError::Validation(
                    "cannot move a folder into its own subtree".to_string(),
                ));
            }
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE folders SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.trim().to_string());
        }
        if let Some(parent) = update.parent {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent);
        }
        separated.push("updated_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" AND owner_id = ");
        query.push_bind(owner_id);

        query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| CirrusError::Database(e.to_string()))?;

        self.get(id, owner_id).await
    }

    /// Soft-delete a folder and every descendant subfolder. Files inside
    /// keep their rows; they disappear from listings because their folders
    /// are trashed. Returns the number of folders trashed.
    pub async fn trash_tree(&self, id: i64, owner_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "WITH RECURSIVE descendants(id) AS (
                 SELECT id FROM folders WHERE id = ? AND owner_id = ?
                 UNION ALL
                 SELECT f.id FROM folders f
                 JOIN descendants d ON f.parent_id = d.id
             )
             UPDATE folders
             SET is_trashed = 1, updated_at = datetime('now')
             WHERE id IN (SELECT id FROM descendants)",
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Toggle the star flag. Returns the updated folder, or None if missing.
    pub async fn toggle_star(&self, id: i64, owner_id: i64) -> Result<Option<Folder>> {
        let result = sqlx::query(
            "UPDATE folders
             SET is_starred = NOT is_starred, updated_at = datetime('now')
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

    /// Whether `candidate` lies inside the subtree rooted at `root`.
    async fn is_descendant(&self, candidate: i64, root: i64, owner_id: i64) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as(
            "WITH RECURSIVE descendants(id) AS (
                 SELECT id FROM folders WHERE id = ? AND owner_id = ?
                 UNION ALL
                 SELECT f.id FROM folders f
                 JOIN descendants d ON f.parent_id = d.id
             )
             SELECT id FROM descendants WHERE id = ?",
        )
        .bind(root)
        .bind(owner_id)
        .bind(candidate)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(found.is_some())
    }

    async fn require_usable_parent(&self, parent_id: i64, owner_id: i64) -> Result<()> {
        match self.get(parent_id, owner_id).await? {
            Some(parent) if !parent.is_trashed => Ok(()),
            Some(_) => Err(CirrusError::Validation(
                "parent folder is in the trash".to_string(),
            )),
            None => Err(CirrusError::NotFound("parent folder".to_string())),
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CirrusError::Validation(
            "folder name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CirrusError::Validation(format!(
            "folder name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}
