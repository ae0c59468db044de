//! Database schema and migrations for eforice.
//!
//! Migrations are applied in order; the `schema_version` table records
//! which ones have run, so each executes exactly once per database.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL,
    email           TEXT NOT NULL,
    password_hash   TEXT NOT NULL,           -- Argon2id PHC string
    is_admin        INTEGER NOT NULL DEFAULT 0,
    is_approved     INTEGER NOT NULL DEFAULT 0,
    storage_limit   INTEGER NOT NULL DEFAULT 1073741824,  -- bytes
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    last_login      TEXT
);

CREATE UNIQUE INDEX idx_users_username_nocase ON users(username COLLATE NOCASE);
CREATE INDEX idx_users_is_admin ON users(is_admin);
"#,
    // v2: storage classes, folders and files
    r#"
CREATE TABLE storage_classes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);

INSERT INTO storage_classes (name, description) VALUES ('standard', 'Default storage tier');

CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_owner ON folders(owner_id);
CREATE INDEX idx_folders_parent ON folders(parent_id);

CREATE TABLE files (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    filename            TEXT NOT NULL,
    stored_name         TEXT NOT NULL UNIQUE,
    size                INTEGER NOT NULL,
    mime_type           TEXT,
    owner_id            INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    folder_id           INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    storage_class_id    INTEGER REFERENCES storage_classes(id),
    created_at          TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_owner ON files(owner_id);
CREATE INDEX idx_files_folder ON files(folder_id);
"#,
];
