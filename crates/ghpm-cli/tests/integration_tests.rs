//! End-to-end tests driving the ghpm binary against a temporary home.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test context that sets up a temporary ghpm home and bin directory
struct TestContext {
    temp_dir: TempDir,
    home: PathBuf,
    bin: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let home = temp_dir.path().join("ghpm");
        let bin = temp_dir.path().join("bin");
        Self {
            temp_dir,
            home,
            bin,
        }
    }

    fn ghpm_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_ghpm");
        let mut cmd = Command::new(bin_path);
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("GHPM_HOME", &self.home);
        cmd.env("GHPM_BIN_PATH", &self.bin);
        // nothing listens here; commands that reach the network fail fast
        cmd.env("GHPM_GITHUB_API", "http://127.0.0.1:9");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("GHPM_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.ghpm_cmd()
            .args(args)
            .output()
            .expect("failed to run ghpm")
    }

    /// Lay down an installed package the way `install` leaves it.
    fn seed_package(&self, owner: &str, repo: &str, tag: &str) -> (PathBuf, PathBuf) {
        let package = self.home.join("packages").join(repo);
        fs::create_dir_all(package.join("bin")).unwrap();
        let binary = package.join("bin").join(repo);
        fs::write(&binary, "#!/bin/sh\n").unwrap();

        fs::create_dir_all(&self.bin).unwrap();
        let link = self.bin.join(repo);
        std::os::unix::fs::symlink(&binary, &link).unwrap();

        let record = serde_json::json!({
            "package": {
                "owner": owner,
                "repo": repo,
                "version": { "value": tag, "components": null }
            },
            "installation": { "package": &package, "symlink": [&link] }
        });
        let metadata = self.home.join("metadata");
        fs::create_dir_all(&metadata).unwrap();
        fs::write(
            metadata.join(repo),
            serde_json::to_string_pretty(&record).unwrap(),
        )
        .unwrap();

        (package, link)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Usage:"));
    assert!(out.contains("install"));
    assert!(out.contains("uninstall"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    assert!(ctx.run(&["--version"]).status.success());
}

#[test]
fn test_list_empty_home() {
    let ctx = TestContext::new();
    let output = ctx.run(&["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("no packages installed"));
}

#[test]
fn test_list_installed_package() {
    let ctx = TestContext::new();
    ctx.seed_package("sharkdp", "bat", "v0.24.0");

    let output = ctx.run(&["list"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("1 packages installed"));
    assert!(out.contains("sharkdp/bat"));
    assert!(out.contains("v0.24.0"));
}

#[test]
fn test_list_malformed_record_fails() {
    let ctx = TestContext::new();
    let metadata = ctx.home.join("metadata");
    fs::create_dir_all(&metadata).unwrap();
    fs::write(metadata.join("broken"), "{").unwrap();

    let output = ctx.run(&["list"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_uninstall_missing_package() {
    let ctx = TestContext::new();
    let output = ctx.run(&["uninstall", "nothing"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("package 'nothing' isn't installed"));
}

#[test]
fn test_uninstall_installed_package() {
    let ctx = TestContext::new();
    let (package, link) = ctx.seed_package("sharkdp", "bat", "v0.24.0");

    let output = ctx.run(&["uninstall", "sharkdp/bat"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("uninstalled package 'sharkdp/bat'"));
    assert!(!package.exists());
    assert!(fs::symlink_metadata(&link).is_err());
    assert!(!ctx.home.join("metadata/bat").exists());

    let output = ctx.run(&["list"]);
    assert!(stdout(&output).contains("no packages installed"));
}

#[test]
fn test_dot_prefixed_package_lists_and_uninstalls() {
    let ctx = TestContext::new();
    let (package, link) = ctx.seed_package("acme", ".dotfiles", "v1");

    let output = ctx.run(&["list"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("1 packages installed"));
    assert!(out.contains("acme/.dotfiles"));

    let output = ctx.run(&["uninstall", ".dotfiles"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("uninstalled package 'acme/.dotfiles'"));
    assert!(!package.exists());
    assert!(fs::symlink_metadata(&link).is_err());
    assert!(!ctx.home.join("metadata/.dotfiles").exists());
}

#[test]
fn test_network_failure_exits_with_error() {
    let ctx = TestContext::new();
    let output = ctx.run(&["search", "bat"]);
    assert_eq!(output.status.code(), Some(1));

    let output = ctx.run(&["install", "bat"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!ctx.home.join("packages/bat").exists());
}

#[test]
fn test_log_file_is_written() {
    let ctx = TestContext::new();
    ctx.run(&["list"]);
    assert!(ctx.home.join("logs/ghpm.log").exists());
}
