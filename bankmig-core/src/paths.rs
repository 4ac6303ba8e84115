use std::path::{Path, PathBuf};

use crate::error::{BankError, Result};

pub const GAME_DIR: &str = "StarCraft II";

/// Resolve the storage root once per run. An explicit override wins over the
/// platform documents directory; either way the directory must exist.
pub fn resolve_storage_root(override_root: Option<&Path>) -> Result<PathBuf> {
    let root = match override_root {
        Some(p) => p.to_path_buf(),
        None => dirs::document_dir()
            .ok_or_else(|| BankError::NotFound(PathBuf::from("<documents>")))?
            .join(GAME_DIR),
    };
    if !root.is_dir() {
        return Err(BankError::NotFound(root));
    }
    Ok(root)
}

pub fn accounts_dir(root: &Path, accounts: &str) -> Result<PathBuf> {
    let dir = root.join(accounts);
    if !dir.is_dir() {
        return Err(BankError::NotFound(dir));
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let got = resolve_storage_root(Some(dir.path())).unwrap();
        assert_eq!(got, dir.path());

        let missing = dir.path().join("nope");
        match resolve_storage_root(Some(&missing)) {
            Err(BankError::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn accounts_dir_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            accounts_dir(dir.path(), "Accounts"),
            Err(BankError::NotFound(_))
        ));
        std::fs::create_dir(dir.path().join("Accounts")).unwrap();
        assert!(accounts_dir(dir.path(), "Accounts").is_ok());
    }
}
