use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{BankError, Result};

pub const UNKNOWN_LABEL: &str = "unknown map";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub label: String,
}

impl ManifestEntry {
    pub fn new(file: &str, label: &str) -> Self {
        Self {
            file: file.to_string(),
            label: label.to_string(),
        }
    }
}

/// Deployment constants shared by the scanner, evaluator and orchestrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub old_publisher_id: String,
    pub new_publisher_id: String,
    /// Only handles starting with this prefix are considered.
    pub handle_prefix: String,
    pub accounts_dir: String,
    pub banks_dir: String,
    /// Upper bound on `.bakN` probing before giving up.
    pub max_backup_probe: u32,
    /// Rewrite the embedded signature after each copy.
    pub resign: bool,
    pub manifest: Vec<ManifestEntry>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            old_publisher_id: "5-S2-1-11831282".into(),
            new_publisher_id: "5-S2-1-10786818".into(),
            handle_prefix: "5-S2-1".into(),
            accounts_dir: "Accounts".into(),
            banks_dir: "Banks".into(),
            max_backup_probe: 9999,
            resign: true,
            manifest: vec![
                ManifestEntry::new("CrashRPGMaximum.SC2Bank", "Crash RPG"),
                ManifestEntry::new("HSF.SC2Bank", "Hell Special Forces"),
                ManifestEntry::new("PBRPG.SC2Bank", "Phantom Breaker RPG"),
                ManifestEntry::new("CDRPG.SC2Bank", "Certain Death RPG"),
                ManifestEntry::new("NeoStarBank.SC2Bank", "Neo Star Defense RPG"),
                ManifestEntry::new("NeoStarLadder.SC2Bank", "Neo Star Defense RPG ladder"),
            ],
        }
    }
}

impl MigrationConfig {
    /// Read a JSON config; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: MigrationConfig = serde_json::from_str(&raw)
            .map_err(|e| BankError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BankError::Config(format!("encode: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("old_publisher_id", &self.old_publisher_id),
            ("new_publisher_id", &self.new_publisher_id),
            ("handle_prefix", &self.handle_prefix),
            ("accounts_dir", &self.accounts_dir),
            ("banks_dir", &self.banks_dir),
        ] {
            if v.trim().is_empty() {
                return Err(BankError::Config(format!("{name} must not be empty")));
            }
        }
        if self.old_publisher_id == self.new_publisher_id {
            return Err(BankError::Config(
                "old and new publisher ids are identical".into(),
            ));
        }
        if self.max_backup_probe == 0 {
            return Err(BankError::Config("max_backup_probe must be positive".into()));
        }
        if self.manifest.is_empty() {
            return Err(BankError::Config("manifest is empty".into()));
        }
        let mut seen = HashSet::new();
        for e in &self.manifest {
            if e.file.is_empty() || e.file.contains(['/', '\\']) || e.file == ".." {
                return Err(BankError::Config(format!("bad manifest file name: {:?}", e.file)));
            }
            if !seen.insert(e.file.as_str()) {
                return Err(BankError::Config(format!("duplicate manifest entry: {}", e.file)));
            }
        }
        Ok(())
    }

    pub fn label_for(&self, file: &str) -> &str {
        self.manifest
            .iter()
            .find(|e| e.file == file)
            .map(|e| e.label.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.manifest.iter().map(|e| e.file.as_str())
    }

    pub fn contains(&self, file: &str) -> bool {
        self.manifest.iter().any(|e| e.file == file)
    }
}
