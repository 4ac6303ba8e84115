use std::path::{Path, PathBuf};

use crate::config::MigrationConfig;

/// One local game account, `<root>/Accounts/<network_id>/<handle>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub network_id: String,
    pub handle: String,
    pub path: PathBuf,
    pub old_bank_dir: PathBuf,
    pub new_bank_dir: PathBuf,
    pub display_name: Option<String>,
}

impl Account {
    pub fn new(path: &Path, network_id: &str, handle: &str, cfg: &MigrationConfig) -> Self {
        let banks = path.join(&cfg.banks_dir);
        Self {
            network_id: network_id.to_string(),
            handle: handle.to_string(),
            path: path.to_path_buf(),
            old_bank_dir: banks.join(&cfg.old_publisher_id),
            new_bank_dir: banks.join(&cfg.new_publisher_id),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn old_path(&self, file: &str) -> PathBuf {
        self.old_bank_dir.join(file)
    }

    pub fn new_path(&self, file: &str) -> PathBuf {
        self.new_bank_dir.join(file)
    }

    /// Handle plus display name when one is known.
    pub fn title(&self) -> String {
        match &self.display_name {
            Some(n) => format!("{} ({n})", self.handle),
            None => self.handle.clone(),
        }
    }
}
