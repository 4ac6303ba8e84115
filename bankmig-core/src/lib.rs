#![forbid(unsafe_code)]

pub mod account;
pub mod config;
pub mod copy;
pub mod error;
pub mod evaluate;
pub mod migrate;
pub mod names;
pub mod paths;
pub mod resign;
pub mod scan;

pub mod bank;

// Re-exports: stable API surface
pub use account::Account;
pub use config::{ManifestEntry, MigrationConfig};
pub use copy::{CopyOutcome, copy_with_backup};
pub use evaluate::{MigrationFileSet, evaluate};
pub use migrate::{
    AccountReport, BatchResult, BatchState, FailedFile, MigrationReport, Migrator,
    Selection,
};
pub use names::{DisplayNameResolver, NoDisplayNames, ShortcutNameResolver};
pub use paths::resolve_storage_root;
pub use resign::{ResignFailure, ResignOutcome, resign};
