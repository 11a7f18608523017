//! Recent-activity audit trail.
//!
//! Every successful file or folder mutation appends an entry here.
//! Recording is best-effort from the caller's point of view: the service
//! layer logs a warning and carries on if an append fails, so the audit
//! trail never blocks the mutation it describes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{CirrusError, Result};

/// Default page size for activity listings.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 20;

/// What kind of item an activity entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A stored file.
    File,
    /// A folder.
    Folder,
}

impl ItemKind {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "file",
            ItemKind::Folder => "folder",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = CirrusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(ItemKind::File),
            "folder" => Ok(ItemKind::Folder),
            other => Err(CirrusError::Validation(format!(
                "unknown item type '{other}'"
            ))),
        }
    }
}

/// The action an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    /// Item was created.
    Created,
    /// File content was uploaded.
    Uploaded,
    /// Item was renamed.
    Renamed,
    /// Item was deleted or trashed.
    Deleted,
    /// Item was moved to another folder.
    Moved,
    /// Item was shared.
    Shared,
    /// Item's star flag was toggled.
    Starred,
    /// File was downloaded.
    Downloaded,
    /// File metadata was viewed.
    Viewed,
}

impl ActivityAction {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Uploaded => "uploaded",
            ActivityAction::Renamed => "renamed",
            ActivityAction::Deleted => "deleted",
            ActivityAction::Moved => "moved",
            ActivityAction::Shared => "shared",
            ActivityAction::Starred => "starred",
            ActivityAction::Downloaded => "downloaded",
            ActivityAction::Viewed => "viewed",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = CirrusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created" => Ok(ActivityAction::Created),
            "uploaded" => Ok(ActivityAction::Uploaded),
            "renamed" => Ok(ActivityAction::Renamed),
            "deleted" => Ok(ActivityAction::Deleted),
            "moved" => Ok(ActivityAction::Moved),
            "shared" => Ok(ActivityAction::Shared),
            "starred" => Ok(ActivityAction::Starred),
            "downloaded" => Ok(ActivityAction::Downloaded),
            "viewed" => Ok(ActivityAction::Viewed),
            other => Err(CirrusError::Validation(format!("unknown action '{other}'"))),
        }
    }
}

/// One audit-trail entry, joined with the current item name when the item
/// still exists.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Activity {
    /// Entry ID.
    pub id: i64,
    /// Acting user.
    pub user_id: i64,
    /// Item the action touched.
    pub item_id: i64,
    /// Kind of item ("file" or "folder").
    pub item_type: String,
    /// Action string.
    pub action: String,
    /// Extra context as a JSON object string.
    pub metadata: String,
    /// When the action happened.
    pub created_at: String,
    /// Current name of the item, if it still exists.
    pub item_name: Option<String>,
}

/// Repository for the activities table.
pub struct ActivityLog<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ActivityLog<'a> {
    /// Create a new ActivityLog with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry to the log.
    pub async fn record(
        &self,
        user_id: i64,
        item_id: i64,
        kind: ItemKind,
        action: ActivityAction,
        metadata: Option<serde_json::Value>,
    ) -> Result<i64> {
        let metadata = metadata
            .map(|v| v.to_string())
            .unwrap_or_else(|| "{}".to_string());

        let result = sqlx::query(
            "INSERT INTO activities (user_id, item_id, item_type, action, metadata)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(item_id)
        .bind(kind.as_str())
        .bind(action.as_str())
        .bind(metadata)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// List a user's most recent entries, newest first.
    ///
    /// Item names are resolved at read time; entries for items that have
    /// since been deleted come back with `item_name = None` rather than
    /// being dropped.
    pub async fn list(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Activity>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, 100);

        let activities = sqlx::query_as::<_, Activity>(
            "SELECT a.id, a.user_id, a.item_id, a.item_type, a.action, a.metadata,
                    a.created_at,
                    CASE a.item_type
                        WHEN 'file' THEN (SELECT name FROM files WHERE id = a.item_id)
                        ELSE (SELECT name FROM folders WHERE id = a.item_id)
                    END AS item_name
             FROM activities a
             WHERE a.user_id = ?
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(activities)
    }

    /// Delete all of a user's entries. Idempotent; returns the number of
    /// entries removed.
    pub async fn clear(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM activities WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
