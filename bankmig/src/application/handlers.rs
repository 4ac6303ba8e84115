use std::io::{BufRead, Write};
use std::path::PathBuf;

use bankmig_core::error::{BankError, Result};
use bankmig_core::migrate::Selection;
use bankmig_core::resign::{resign, verify};
use bankmig_core::{
    AccountReport, BatchState, MigrationConfig, MigrationReport, Migrator, ResignOutcome,
    ShortcutNameResolver, resolve_storage_root,
};

use crate::presentation::cli::GlobalArgs;

fn load_config(g: &GlobalArgs) -> Result<MigrationConfig> {
    match &g.config {
        Some(p) => MigrationConfig::load(p),
        None => Ok(MigrationConfig::default()),
    }
}

fn migrator_from_args(g: &GlobalArgs, no_resign: bool) -> Result<Migrator> {
    let mut cfg = load_config(g)?;
    if no_resign {
        cfg.resign = false;
    }
    let root = resolve_storage_root(g.root.as_deref())?;
    Ok(Migrator::new(root, cfg).with_names(Box::new(ShortcutNameResolver)))
}

fn ask(prompt: &str) -> bool {
    eprint!("{prompt} (y/n): ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    line.trim().eq_ignore_ascii_case("y")
}

fn describe(m: &Migrator, sel: &Selection) {
    let cfg = m.config();
    eprintln!("account: {}", sel.account.title());
    eprintln!("  from: {}", sel.account.old_bank_dir.display());
    eprintln!("  to:   {}", sel.account.new_bank_dir.display());
    for f in &sel.files {
        let mark = if sel.collisions.contains(f) { "!" } else { "+" };
        eprintln!("  {mark} {f} ({})", cfg.label_for(f));
    }
    if sel.has_collisions() {
        eprintln!(
            "  {} existing file(s) will be backed up as .bakN and overwritten",
            sel.collisions.len()
        );
    }
}

fn print_report(handle: &str, report: &MigrationReport) {
    let r = &report.result;
    match report.state {
        BatchState::Cancelled => {
            eprintln!("migrate: {handle} cancelled");
            return;
        }
        BatchState::Completed => eprintln!("migrate: {handle} OK"),
        BatchState::PartialFailure => eprintln!("migrate: {handle} finished with failures"),
    }
    eprintln!("  migrated: {}", r.migrated_count);
    if r.backup_count > 0 {
        eprintln!("  backups:  {}", r.backup_count);
    }
    for f in &r.failed {
        eprintln!("  failed:   {} ({})", f.file, f.reason);
    }
    for f in &r.resign_failures {
        eprintln!("  unsigned: {} ({})", f.file, f.reason);
    }
}

pub fn handle_scan(g: &GlobalArgs) -> Result<()> {
    let m = migrator_from_args(g, false)?;
    let accounts = m.scan()?;
    if accounts.is_empty() {
        eprintln!("scan: no accounts with banks left to migrate");
        return Ok(());
    }
    for (i, a) in accounts.iter().enumerate() {
        let set = m.evaluate(a);
        println!(
            "{:>2}. handle={} network={} name={} migratable={} collisions={}",
            i + 1,
            a.handle,
            a.network_id,
            a.display_name.as_deref().unwrap_or("-"),
            set.migratable.len(),
            set.collisions.len()
        );
    }
    Ok(())
}

pub fn handle_status(g: &GlobalArgs, handle: &str) -> Result<()> {
    let m = migrator_from_args(g, false)?;
    let account = m.find_account(handle)?;
    let set = m.evaluate(&account);
    println!("{}", account.title());
    for f in &set.migratable {
        println!("  migratable {f} ({})", m.config().label_for(f));
    }
    for f in &set.collisions {
        println!("  collision  {f} ({})", m.config().label_for(f));
    }
    Ok(())
}

pub fn handle_migrate(
    g: &GlobalArgs,
    handle: &str,
    files: Vec<String>,
    yes: bool,
    no_resign: bool,
) -> Result<()> {
    let m = migrator_from_args(g, no_resign)?;
    let account = m.find_account(handle)?;
    let sel = if files.is_empty() {
        m.select_all(&account)?
    } else {
        m.select(&account, &files)?
    };
    describe(&m, &sel);
    let report = m.migrate(sel, |_| yes || ask("start migration?"))?;
    print_report(handle, &report);
    match report.result.failed.len() {
        0 => Ok(()),
        failed => Err(BankError::BatchFailed { failed }),
    }
}

pub fn handle_migrate_all(g: &GlobalArgs, yes: bool, no_resign: bool) -> Result<()> {
    let m = migrator_from_args(g, no_resign)?;
    if !yes && !ask("migrate every scanned account, backing up existing files?") {
        eprintln!("migrate-all: cancelled");
        return Ok(());
    }
    let reports: Vec<AccountReport> = m.migrate_all(|_| true)?;
    if reports.is_empty() {
        eprintln!("migrate-all: nothing to do");
    }
    let mut failed = 0;
    for r in reports {
        match r.report {
            Ok(report) => {
                failed += report.result.failed.len();
                print_report(&r.handle, &report);
            }
            Err(e) => {
                failed += 1;
                eprintln!("migrate: {} failed: {e}", r.handle);
            }
        }
    }
    match failed {
        0 => Ok(()),
        failed => Err(BankError::BatchFailed { failed }),
    }
}

pub fn handle_resign(
    g: &GlobalArgs,
    file: PathBuf,
    owner: Option<String>,
    user: String,
) -> Result<()> {
    let owner = match owner {
        Some(o) => o,
        None => load_config(g)?.new_publisher_id,
    };
    match resign(&file, &owner, &user) {
        ResignOutcome::Failed(why) => Err(BankError::Resign {
            file: file.display().to_string(),
            reason: why.to_string(),
        }),
        done => {
            let sig = done.signature().unwrap_or_default();
            eprintln!("resign: {} -> {sig}", file.display());
            Ok(())
        }
    }
}

pub fn handle_verify(
    g: &GlobalArgs,
    file: PathBuf,
    owner: Option<String>,
    user: String,
) -> Result<()> {
    let owner = match owner {
        Some(o) => o,
        None => load_config(g)?.new_publisher_id,
    };
    if !verify(&file, &owner, &user)? {
        return Err(BankError::SignatureMismatch(file));
    }
    eprintln!("verify: OK");
    Ok(())
}

pub fn handle_init_config(out: PathBuf) -> Result<()> {
    MigrationConfig::default().save(&out)?;
    eprintln!("init-config: wrote {}", out.display());
    Ok(())
}
