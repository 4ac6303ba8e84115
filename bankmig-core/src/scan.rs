use std::path::Path;

use walkdir::WalkDir;

use crate::account::Account;
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::evaluate::has_old_banks;
use crate::names::DisplayNameResolver;
use crate::paths::accounts_dir;

/// Walks `<root>/<accounts>/<network-id>/<handle>`. Read-only; every call to
/// [`Scanner::accounts`] re-walks the tree.
#[derive(Clone, Copy)]
pub struct Scanner<'a> {
    root: &'a Path,
    cfg: &'a MigrationConfig,
    names: &'a dyn DisplayNameResolver,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &'a Path, cfg: &'a MigrationConfig, names: &'a dyn DisplayNameResolver) -> Self {
        Self { root, cfg, names }
    }

    /// Lazily yields in-scope accounts that hold at least one manifest file at
    /// the old location. Fails up front if the accounts directory is missing.
    pub fn accounts(self) -> Result<impl Iterator<Item = Account> + 'a> {
        let base = accounts_dir(self.root, &self.cfg.accounts_dir)?;
        let Scanner { root, cfg, names } = self;

        let it = WalkDir::new(base)
            .min_depth(2)
            .max_depth(2)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .filter_map(move |e| {
                let handle = e.file_name().to_str()?;
                if !handle.starts_with(&cfg.handle_prefix) {
                    tracing::debug!(handle, "handle out of scope");
                    return None;
                }
                let network_id = e.path().parent()?.file_name()?.to_str()?;
                let account = Account::new(e.path(), network_id, handle, cfg);
                if !has_old_banks(&account, cfg) {
                    tracing::debug!(handle, "no old banks");
                    return None;
                }
                let name = names.display_name(root, &account);
                Some(account.with_display_name(name))
            });
        Ok(it)
    }

    pub fn scan(self) -> Result<Vec<Account>> {
        Ok(self.accounts()?.collect())
    }
}
