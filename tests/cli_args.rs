//! Tests for the `cliroute` binary: runner options, listing and exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Scratch directory with an empty config and a manifest directory holding
/// `ok` (always succeeds) and `bad` (always fails).
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "").unwrap();
        let scripts = temp.path().join("scripts");
        fs::create_dir(&scripts).unwrap();
        write_manifest(&scripts, "ok.toml", "ok", "Always succeeds", "true");
        write_manifest(&scripts, "bad.toml", "bad", "Always fails", "false");
        Self { temp }
    }

    fn config(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    fn scripts(&self) -> PathBuf {
        self.temp.path().join("scripts")
    }

    fn run(&self, args: &[&str]) -> Output {
        cliroute_cmd()
            .arg("--config")
            .arg(self.config())
            .arg("--manifest-dir")
            .arg(self.scripts())
            .args(args)
            .output()
            .expect("Failed to execute command")
    }
}

fn write_manifest(dir: &Path, file: &str, name: &str, description: &str, command: &str) {
    let content = format!(
        "name = \"{name}\"\ndescription = \"{description}\"\ncommand = \"{command}\"\nsupports = [\"-R\", \"-v\"]\n\n[positional]\nname = \"files\"\n"
    );
    fs::write(dir.join(file), content).unwrap();
}

fn cliroute_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cliroute"))
}

#[test]
fn test_help_shows_runner_options() {
    let output = cliroute_cmd()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--scripts"));
    assert!(stdout.contains("--manifest-dir"));
    assert!(stdout.contains("--strict-routing"));
}

#[test]
fn test_list_shows_loaded_scripts() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available scripts:"));
    assert!(stdout.contains("ok: Always succeeds"));
    assert!(stdout.contains("bad: Always fails"));
    assert!(stdout.contains("Supports: --recursive, --verbose, -R, -v"));
}

#[test]
fn test_list_json() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--list", "--json"]);

    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bad", "ok"]);
    assert_eq!(listing[1]["description"], "Always succeeds");
}

#[test]
fn test_json_requires_list() {
    let output = cliroute_cmd()
        .arg("--json")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_explicit_config_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let output = cliroute_cmd()
        .arg("--config")
        .arg(temp.path().join("nope.toml"))
        .arg("--list")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "{stderr}");
}

#[test]
fn test_unknown_script_is_a_usage_error() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--scripts", "ok,ghost", "a.txt"]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Routing failed"), "{stdout}");
    assert!(stdout.contains("ghost"), "{stdout}");
}

#[test]
fn test_broken_manifest_is_reported_but_others_load() {
    let workspace = Workspace::new();
    fs::write(workspace.scripts().join("broken.toml"), "name = ").unwrap();

    let output = workspace.run(&["--list"]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.toml"), "{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok: Always succeeds"));
}

#[cfg(unix)]
#[test]
fn test_failing_script_sets_exit_code_and_others_still_run() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--scripts", "bad,ok", "a.txt", "-R", "--unknown"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Executed 2 script(s): 1 passed, 1 failed"), "{stdout}");
    assert!(stdout.contains("✓ ok"), "{stdout}");
    assert!(stdout.contains("✗ bad"), "{stdout}");
}

#[cfg(unix)]
#[test]
fn test_all_scripts_pass() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--scripts", "ok", "a.txt", "-v"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 passed, 0 failed"), "{stdout}");
}

#[cfg(unix)]
#[test]
fn test_strict_routing_rejects_unknown_flags() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--strict-routing", "--scripts", "ok", "a.txt", "--unknown"]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--unknown"), "{stdout}");
}
