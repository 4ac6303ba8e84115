use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::tempdir;
use walkdir::WalkDir;

const OLD: &str = "5-S2-1-11831282";
const NEW: &str = "5-S2-1-10786818";
const HANDLE: &str = "5-S2-1-777";

const BANK: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Bank version=\"1\">\n    <Section name=\"Hero\">\n        <Key name=\"Level\">\n            <Value int=\"30\"/>\n        </Key>\n    </Section>\n</Bank>\n";

fn bin() -> Command {
    let mut c = Command::new(env!("CARGO_BIN_EXE_bankmig"));
    c.env("RUST_LOG", "warn").stdin(Stdio::null());
    c
}

fn run(root: &Path, args: &[&str]) -> Output {
    bin()
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("spawn bankmig")
}

fn seed(root: &Path) {
    let acct = root.join("Accounts").join("9001").join(HANDLE).join("Banks");
    fs::create_dir_all(acct.join(OLD)).unwrap();
    fs::create_dir_all(acct.join(NEW)).unwrap();
    fs::write(acct.join(OLD).join("HSF.SC2Bank"), BANK).unwrap();
    fs::write(acct.join(OLD).join("PBRPG.SC2Bank"), BANK).unwrap();
    fs::write(acct.join(NEW).join("HSF.SC2Bank"), "older").unwrap();
}

fn backups(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|n| n.contains(".bak"))
        .collect();
    out.sort();
    out
}

#[test]
fn scan_lists_the_seeded_account() {
    let tmp = tempdir().unwrap();
    seed(tmp.path());
    let out = run(tmp.path(), &["scan"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(HANDLE));
    assert!(stdout.contains("migratable=2"));
    assert!(stdout.contains("collisions=1"));
}

#[test]
fn migrate_without_yes_and_no_input_is_cancelled() {
    let tmp = tempdir().unwrap();
    seed(tmp.path());
    let out = run(tmp.path(), &["migrate", HANDLE]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cancelled"));
    assert!(backups(tmp.path()).is_empty());
}

#[test]
fn migrate_yes_backs_up_and_signs() {
    let tmp = tempdir().unwrap();
    seed(tmp.path());
    let out = run(tmp.path(), &["migrate", HANDLE, "--yes"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(backups(tmp.path()), vec!["HSF.SC2Bank.bak1"]);

    let new_hsf = tmp
        .path()
        .join("Accounts/9001")
        .join(HANDLE)
        .join("Banks")
        .join(NEW)
        .join("HSF.SC2Bank");
    let v = run(
        tmp.path(),
        &["verify", new_hsf.to_str().unwrap(), "--user", HANDLE],
    );
    assert!(v.status.success(), "{}", String::from_utf8_lossy(&v.stderr));

    // second run makes a second backup
    let again = run(tmp.path(), &["migrate", HANDLE, "--yes", "--file", "HSF.SC2Bank"]);
    assert!(again.status.success());
    assert_eq!(
        backups(tmp.path()),
        vec!["HSF.SC2Bank.bak1", "HSF.SC2Bank.bak2"]
    );
}

#[test]
fn missing_root_fails() {
    let tmp = tempdir().unwrap();
    let out = run(&tmp.path().join("absent"), &["scan"]);
    assert!(!out.status.success());
}

#[test]
fn unknown_file_is_rejected() {
    let tmp = tempdir().unwrap();
    seed(tmp.path());
    let out = run(tmp.path(), &["migrate", HANDLE, "--yes", "--file", "CDRPG.SC2Bank"]);
    assert!(!out.status.success());
    assert!(backups(tmp.path()).is_empty());
}

#[test]
fn init_config_round_trips_through_config_flag() {
    let tmp = tempdir().unwrap();
    seed(tmp.path());
    let cfg = tmp.path().join("cfg.json");
    let out = bin().arg("init-config").arg(&cfg).output().unwrap();
    assert!(out.status.success());
    let out = run(tmp.path(), &["--config", cfg.to_str().unwrap(), "status", HANDLE]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("migratable PBRPG.SC2Bank"));
    assert!(stdout.contains("collision  HSF.SC2Bank"));
}

#[test]
fn failed_file_gives_nonzero_exit() {
    let tmp = tempdir().unwrap();
    seed(tmp.path());
    let new = tmp.path().join("Accounts/9001").join(HANDLE).join("Banks").join(NEW);
    fs::write(new.join("HSF.SC2Bank.bak1"), "kept").unwrap();
    let cfg = tmp.path().join("cfg.json");
    fs::write(&cfg, r#"{"max_backup_probe":1}"#).unwrap();

    let out = run(
        tmp.path(),
        &["--config", cfg.to_str().unwrap(), "migrate", HANDLE, "--yes"],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed:   HSF.SC2Bank"), "{stderr}");
    assert!(new.join("PBRPG.SC2Bank").exists());
    assert_eq!(fs::read_to_string(new.join("HSF.SC2Bank")).unwrap(), "older");
}
