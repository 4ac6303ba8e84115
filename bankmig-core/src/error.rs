use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("copy of {file} failed: {source}")]
    Copy {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no free backup name for {file} after {limit} attempts")]
    BackupExhausted { file: String, limit: u32 },

    #[error("no account with handle {0}")]
    UnknownAccount(String),

    #[error("{0} is not migratable for this account")]
    NotMigratable(String),

    #[error("no files selected")]
    EmptySelection,

    #[error("resign of {file} failed: {reason}")]
    Resign { file: String, reason: String },

    #[error("{failed} file(s) failed to migrate")]
    BatchFailed { failed: usize },

    #[error("signature mismatch: {}", .0.display())]
    SignatureMismatch(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BankError {
    /// Errors scoped to a single file; a batch records these and moves on.
    pub fn is_per_file(&self) -> bool {
        matches!(self, BankError::Copy { .. } | BankError::BackupExhausted { .. })
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, BankError>;
