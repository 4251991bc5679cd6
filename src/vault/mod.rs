//! Embedded content-addressed vault: file metadata in SQLite, contents under
//! `root_path` keyed by their SHA-256.

pub mod models;
pub mod store;

pub use models::{FileRecord, Problem};
pub use store::FileVault;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Unsupported db_type '{0}'.")]
    UnsupportedDatabase(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("File ID {0} not found.")]
    NotFound(i64),

    /// Same content already stored under the same name.
    #[error("Exists")]
    Exists { file_id: i64 },

    #[error("Invalid filename '{0}'.")]
    InvalidName(String),

    #[error("Content {hash} of file ID {file_id} is missing.")]
    MissingContent { file_id: i64, hash: String },
}
