use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::account::Account;
use crate::config::MigrationConfig;
use crate::copy::copy_with_backup;
use crate::error::{BankError, Result};
use crate::evaluate::{MigrationFileSet, evaluate};
use crate::names::{DisplayNameResolver, NoDisplayNames};
use crate::resign::{ResignOutcome, resign};
use crate::scan::Scanner;

/// An account plus the files chosen for it, in manifest order.
#[derive(Clone, Debug)]
pub struct Selection {
    pub account: Account,
    pub files: Vec<String>,
    /// Selected files that already exist at the new location.
    pub collisions: Vec<String>,
}

impl Selection {
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }

    /// Acknowledge that every collision will be backed up and overwritten.
    pub(crate) fn confirm(self) -> Confirmed {
        Confirmed(self)
    }
}

/// A selection whose gate said yes. Built only inside [`Migrator::migrate`].
#[derive(Clone, Debug)]
pub(crate) struct Confirmed(Selection);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct BatchResult {
    pub migrated_count: usize,
    pub backup_count: usize,
    pub migrated: Vec<String>,
    pub failed: Vec<FailedFile>,
    /// Copied fine but the signature could not be rewritten. Still counted
    /// as migrated.
    pub resign_failures: Vec<FailedFile>,
}

impl BatchResult {
    pub fn failed_filenames(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.file.as_str()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Completed,
    PartialFailure,
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct MigrationReport {
    pub state: BatchState,
    pub result: BatchResult,
}

#[derive(Debug)]
pub struct AccountReport {
    pub handle: String,
    pub report: Result<MigrationReport>,
}

pub struct Migrator {
    root: PathBuf,
    config: MigrationConfig,
    names: Box<dyn DisplayNameResolver>,
}

impl Migrator {
    pub fn new(root: PathBuf, config: MigrationConfig) -> Self {
        Self {
            root,
            config,
            names: Box::new(NoDisplayNames),
        }
    }

    pub fn with_names(mut self, names: Box<dyn DisplayNameResolver>) -> Self {
        self.names = names;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    fn scanner(&self) -> Scanner<'_> {
        Scanner::new(&self.root, &self.config, self.names.as_ref())
    }

    pub fn scan(&self) -> Result<Vec<Account>> {
        self.scanner().scan()
    }

    pub fn find_account(&self, handle: &str) -> Result<Account> {
        self.scanner()
            .accounts()?
            .find(|a| a.handle == handle)
            .ok_or_else(|| BankError::UnknownAccount(handle.to_string()))
    }

    pub fn evaluate(&self, account: &Account) -> MigrationFileSet {
        evaluate(account, &self.config)
    }

    /// Pick `files` for migration. Each must currently be migratable;
    /// duplicates collapse and the result follows manifest order.
    pub fn select(&self, account: &Account, files: &[String]) -> Result<Selection> {
        let set = self.evaluate(account);
        if let Some(bad) = files.iter().find(|f| !set.is_migratable(f)) {
            return Err(BankError::NotMigratable(bad.clone()));
        }
        let chosen: Vec<String> = set
            .migratable
            .iter()
            .filter(|f| files.contains(*f))
            .cloned()
            .collect();
        self.selection_from(account, chosen, &set)
    }

    pub fn select_all(&self, account: &Account) -> Result<Selection> {
        let set = self.evaluate(account);
        self.selection_from(account, set.migratable.clone(), &set)
    }

    fn selection_from(
        &self,
        account: &Account,
        files: Vec<String>,
        set: &MigrationFileSet,
    ) -> Result<Selection> {
        if files.is_empty() {
            return Err(BankError::EmptySelection);
        }
        let collisions = files.iter().filter(|f| set.collides(f)).cloned().collect();
        Ok(Selection {
            account: account.clone(),
            files,
            collisions,
        })
    }

    /// Ask `gate` to acknowledge the selection, then run it. A declined gate
    /// touches nothing.
    pub fn migrate(
        &self,
        selection: Selection,
        gate: impl FnOnce(&Selection) -> bool,
    ) -> Result<MigrationReport> {
        if !gate(&selection) {
            info!(handle = %selection.account.handle, "migration cancelled");
            return Ok(MigrationReport {
                state: BatchState::Cancelled,
                result: BatchResult::default(),
            });
        }
        self.run(selection.confirm())
    }

    /// Copy then resign each selected file, one at a time. Per-file failures
    /// are recorded and the batch carries on.
    fn run(&self, confirmed: Confirmed) -> Result<MigrationReport> {
        let Selection { account, files, .. } = confirmed.0;
        fs::create_dir_all(&account.new_bank_dir)?;

        info!(
            handle = %account.handle,
            from = %account.old_bank_dir.display(),
            to = %account.new_bank_dir.display(),
            files = files.len(),
            "migrating"
        );

        let mut result = BatchResult::default();
        for file in &files {
            let src = account.old_path(file);
            let dst = account.new_path(file);
            let label = self.config.label_for(file);

            match copy_with_backup(&src, &dst, self.config.max_backup_probe) {
                Ok(out) => {
                    if let Some(bak) = &out.backup {
                        result.backup_count += 1;
                        info!(file = %file, backup = %bak.display(), "backup");
                    }
                    result.migrated_count += 1;
                    result.migrated.push(file.clone());
                    info!(file = %file, label, bytes = out.bytes, "migrated");

                    if self.config.resign {
                        let outcome =
                            resign(&dst, &self.config.new_publisher_id, &account.handle);
                        if let ResignOutcome::Failed(why) = outcome {
                            warn!(file = %file, error = %why, "resign failed; copy kept");
                            result.resign_failures.push(FailedFile {
                                file: file.clone(),
                                reason: why.to_string(),
                            });
                        }
                    }
                }
                Err(e) if e.is_per_file() => {
                    warn!(file = %file, error = %e, "migration of file failed");
                    result.failed.push(FailedFile {
                        file: file.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let state = if result.failed.is_empty() {
            BatchState::Completed
        } else {
            BatchState::PartialFailure
        };
        info!(
            handle = %account.handle,
            migrated = result.migrated_count,
            backups = result.backup_count,
            failed = result.failed.len(),
            "batch finished"
        );
        Ok(MigrationReport { state, result })
    }

    /// Every scanned account as its own batch. Accounts share nothing, so the
    /// batches run in parallel; each batch stays sequential.
    pub fn migrate_all(
        &self,
        gate: impl Fn(&Selection) -> bool + Sync,
    ) -> Result<Vec<AccountReport>> {
        let accounts = self.scan()?;
        Ok(accounts
            .par_iter()
            .map(|account| AccountReport {
                handle: account.handle.clone(),
                report: self
                    .select_all(account)
                    .and_then(|sel| self.migrate(sel, &gate)),
            })
            .collect())
    }
}
