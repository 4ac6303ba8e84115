use crate::account::Account;
use crate::config::MigrationConfig;

/// Manifest files present on each side for one account, in manifest order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationFileSet {
    /// Present at the old publisher location.
    pub migratable: Vec<String>,
    /// Already present at the new publisher location.
    pub collisions: Vec<String>,
}

impl MigrationFileSet {
    pub fn is_migratable(&self, file: &str) -> bool {
        self.migratable.iter().any(|f| f == file)
    }

    pub fn collides(&self, file: &str) -> bool {
        self.collisions.iter().any(|f| f == file)
    }
}

/// Snapshot of the filesystem at call time. Never cached: re-run after any copy.
pub fn evaluate(account: &Account, cfg: &MigrationConfig) -> MigrationFileSet {
    let mut set = MigrationFileSet::default();
    for file in cfg.files() {
        if account.old_path(file).is_file() {
            set.migratable.push(file.to_string());
        }
        if account.new_path(file).is_file() {
            set.collisions.push(file.to_string());
        }
    }
    set
}

pub fn has_old_banks(account: &Account, cfg: &MigrationConfig) -> bool {
    cfg.files().any(|f| account.old_path(f).is_file())
}
