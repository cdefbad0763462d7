//! Command-line behavior that needs no network access

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's configuration and credentials
fn qpr(dir: &Path) -> Command {
    let config = dir.join("config.json");
    std::fs::write(&config, "{}").unwrap();

    let mut cmd = Command::cargo_bin("qpr").unwrap();
    cmd.arg("--config")
        .arg(config)
        .env_remove("QPR_REPO")
        .env_remove("QPR_WORKER_URL")
        .env_remove("QPR_BATCH_CAPACITY")
        .env_remove("QPR_MAX_FILE_SIZE")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env("NO_COLOR", "1");
    cmd
}

fn paper(dir: &TempDir, name: &str, len: usize) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, vec![b'%'; len]).unwrap();
    path.display().to_string()
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("qpr")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("contribute"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_missing_title_fails_before_network() {
    let dir = TempDir::new().unwrap();
    let file = paper(&dir, "endsem.pdf", 128);

    qpr(dir.path())
        .args(["contribute", "--yes", "--group"])
        .arg(format!("Physics/PHY403/2025={file}"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a pull request title"));
}

#[test]
fn test_bad_folder_path_is_reported() {
    let dir = TempDir::new().unwrap();
    let file = paper(&dir, "endsem.pdf", 128);

    qpr(dir.path())
        .args(["contribute", "--yes", "--title", "Papers", "--group"])
        .arg(format!("Physics={file}"))
        .assert()
        .failure();
}

#[test]
fn test_dry_run_prints_batches() {
    let dir = TempDir::new().unwrap();
    let mid = paper(&dir, "midsem.pdf", 256);
    let end = paper(&dir, "endsem.pdf", 256);

    qpr(dir.path())
        .args(["contribute", "--dry-run", "--title", "PHY403 papers", "--group"])
        .arg(format!("Physics/PHY403/2025={mid}::Midsem 2025.pdf,{end}"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run - no changes will be made"))
        .stdout(predicate::str::contains("Batch 1/1: 2 file(s)"))
        .stdout(predicate::str::contains("Physics/PHY403/2025/Midsem 2025.pdf"))
        .stdout(predicate::str::contains("Physics/PHY403/2025/endsem.pdf"));
}

#[test]
fn test_dry_run_splits_on_capacity() {
    let dir = TempDir::new().unwrap();
    let a = paper(&dir, "a.pdf", 600);
    let b = paper(&dir, "b.pdf", 600);

    qpr(dir.path())
        .env("QPR_BATCH_CAPACITY", "1000")
        .args(["contribute", "--dry-run", "--title", "Papers", "--group"])
        .arg(format!("Math/MTH201/2024={a},{b}"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch 1/2: 1 file(s)"))
        .stdout(predicate::str::contains("Batch 2/2: 1 file(s)"));
}

#[test]
fn test_email_requires_direct() {
    let dir = TempDir::new().unwrap();
    let file = paper(&dir, "endsem.pdf", 128);

    qpr(dir.path())
        .args(["contribute", "--email", "ms21001@iisermohali.ac.in", "--group"])
        .arg(format!("Physics/PHY403/2025={file}"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--direct"));
}
