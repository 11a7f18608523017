//! Database schema migrations for Cirrus.
//!
//! Migrations are applied in order; each entry is one version. Never edit
//! an existing migration, append a new one instead.

/// All schema migrations, in order.
pub const MIGRATIONS: &[&str] = &[
    // v1: initial schema
    r#"
    CREATE TABLE users (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT NOT NULL,
        email           TEXT NOT NULL,
        password        TEXT NOT NULL,
        bio             TEXT,
        profile_picture TEXT,
        storage_used    INTEGER NOT NULL DEFAULT 0,
        storage_limit   INTEGER NOT NULL,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE UNIQUE INDEX idx_users_email_nocase ON users (email COLLATE NOCASE);

    CREATE TABLE folders (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        owner_id    INTEGER NOT NULL REFERENCES users(id),
        parent_id   INTEGER REFERENCES folders(id),
        is_starred  INTEGER NOT NULL DEFAULT 0,
        is_trashed  INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX idx_folders_owner_parent ON folders (owner_id, parent_id);

    CREATE TABLE files (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        original_name TEXT NOT NULL,
        mime_type     TEXT NOT NULL,
        size          INTEGER NOT NULL,
        storage_key   TEXT NOT NULL,
        etag          TEXT,
        owner_id      INTEGER NOT NULL REFERENCES users(id),
        folder_id     INTEGER REFERENCES folders(id),
        is_starred    INTEGER NOT NULL DEFAULT 0,
        created_at    TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX idx_files_owner_folder ON files (owner_id, folder_id);

    CREATE TABLE activities (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id),
        item_id     INTEGER NOT NULL,
        item_type   TEXT NOT NULL CHECK (item_type IN ('file', 'folder')),
        action      TEXT NOT NULL CHECK (action IN (
            'created', 'uploaded', 'renamed', 'deleted', 'moved',
            'shared', 'starred', 'downloaded', 'viewed')),
        metadata    TEXT NOT NULL DEFAULT '{}',
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE INDEX idx_activities_user_created ON activities (user_id, created_at DESC);
    "#,
];
