//! Account and storage-quota ledger for Cirrus.
//!
//! Tracks each user's cumulative storage usage against a fixed limit.
//! Reservation is a single conditional UPDATE so that two concurrent
//! uploads cannot both pass a stale headroom check and jointly overshoot
//! the limit.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::User;
use crate::{CirrusError, Result};

/// Aggregated profile view returned by the API. Credential fields are
/// never included.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
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
    /// Number of folders owned (trashed included; they still exist).
    pub total_folders: i64,
    /// Bytes consumed.
    pub storage_used: i64,
    /// Byte ceiling.
    pub storage_limit: i64,
}

/// Storage-quota ledger over the users table.
pub struct AccountLedger<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountLedger<'a> {
    /// Create a new ledger with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether `incoming` bytes fit within the user's remaining quota.
    ///
    /// Advisory only; [`reserve`](Self::reserve) is the authoritative
    /// check-and-commit.
    pub fn check_headroom(user: &User, incoming: i64) -> bool {
        user.storage_used + incoming <= user.storage_limit
    }

    /// Atomically reserve `bytes` against the user's quota.
    ///
    /// The check and the increment are one conditional UPDATE; zero rows
    /// affected for an existing user means the reservation would exceed
    /// the limit.
    pub async fn reserve(&self, user_id: i64, bytes: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users
             SET storage_used = storage_used + ?, updated_at = datetime('now')
             WHERE id = ? AND storage_used + ? <= storage_limit",
        )
        .bind(bytes)
        .bind(user_id)
        .bind(bytes)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let usage: Option<(i64, i64)> =
            sqlx::query_as("SELECT storage_used, storage_limit FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| CirrusError::Database(e.to_string()))?;

        match usage {
            Some((used, limit)) => Err(CirrusError::QuotaExceeded {
                requested: bytes,
                available: limit - used,
            }),
            None => Err(CirrusError::NotFound("user".to_string())),
        }
    }

    /// Release `bytes` back to the user's quota, clamped at zero.
    pub async fn release(&self, user_id: i64, bytes: i64) -> Result<()> {
        sqlx::query(
            "UPDATE users
             SET storage_used = MAX(storage_used - ?, 0), updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(bytes)
        .bind(user_id)
        .execute(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(())
    }

    /// Current `(storage_used, storage_limit)` for a user.
    pub async fn usage(&self, user_id: i64) -> Result<(i64, i64)> {
        let usage: (i64, i64) =
            sqlx::query_as("SELECT storage_used, storage_limit FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| CirrusError::Database(e.to_string()))?
                .ok_or_else(|| CirrusError::NotFound("user".to_string()))?;

        Ok(usage)
    }

    /// Aggregate profile for a user: identity fields plus file/folder
    /// counts and quota figures.
    pub async fn profile(&self, user_id: i64) -> Result<Profile> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, name, email, password, bio, profile_picture,
                    storage_used, storage_limit, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CirrusError::Database(e.to_string()))?;

        let user = user.ok_or_else(|| CirrusError::NotFound("user".to_string()))?;

        let total_files: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM files WHERE owner_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CirrusError::Database(e.to_string()))?;

        let total_folders: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM folders WHERE owner_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CirrusError::Database(e.to_string()))?;

        Ok(Profile {
            id: user.id,
            name: user.name,
            email: user.email,
            bio: user.bio,
            profile_picture: user.profile_picture,
            total_files: total_files.0,
            total_folders: total_folders.0,
            storage_used: user.storage_used,
            storage_limit: user.storage_limit,
        })
    }
}
