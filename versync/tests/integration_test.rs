use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Root module at 1.0.0 with one nested module and two manifests.
fn create_project(root: &Path) {
    write(root, ".version", "1.0.0\n");
    write(root, "package.json", "{\n  \"name\": \"web\",\n  \"version\": \"1.0.0\"\n}\n");
    write(root, "api/.version", "1.0.0\n");
    write(
        root,
        "api/Cargo.toml",
        "[package]\nname = \"api\"\nversion = \"1.0.0\" # synced\n",
    );
    write(root, "node_modules/dep/.version", "9.9.9\n");
}

fn get_versync_binary() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.join("target").join("debug").join("versync")
}

fn versync(root: &Path, args: &[&str]) -> std::process::Output {
    Command::new(get_versync_binary())
        .args(args)
        .arg("--root")
        .arg(root)
        .output()
        .expect("Failed to execute versync")
}

#[test]
#[ignore]
fn test_discover_json() {
    let temp_dir = TempDir::new().unwrap();
    create_project(temp_dir.path());

    let output = versync(temp_dir.path(), &["discover", "--json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["modules"].as_array().unwrap().len(), 2);
    assert_eq!(json["manifests"].as_array().unwrap().len(), 2);
    assert!(json["mismatches"].as_array().unwrap().is_empty());
}

#[test]
#[ignore]
fn test_doctor_reports_drift() {
    let temp_dir = TempDir::new().unwrap();
    create_project(temp_dir.path());
    write(temp_dir.path(), "api/.version", "1.2.0\n");

    let output = versync(temp_dir.path(), &["doctor"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("api/.version"));

    let output = versync(temp_dir.path(), &["doctor", "--expected", "1.2.0"]);
    assert!(!output.status.success());
}

#[test]
#[ignore]
fn test_doctor_consistent_project() {
    let temp_dir = TempDir::new().unwrap();
    create_project(temp_dir.path());

    let output = versync(temp_dir.path(), &["doctor"]);
    assert!(output.status.success());
}

#[test]
#[ignore]
fn test_bump_with_sync() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_project(root);

    let output = versync(root, &["bump", "minor", "--sync", "--format", "text"]);
    assert!(output.status.success());

    assert_eq!(fs::read_to_string(root.join(".version")).unwrap(), "1.1.0\n");
    assert_eq!(fs::read_to_string(root.join("api/.version")).unwrap(), "1.1.0\n");
    assert!(fs::read_to_string(root.join("package.json"))
        .unwrap()
        .contains("\"version\": \"1.1.0\""));
    assert!(fs::read_to_string(root.join("api/Cargo.toml"))
        .unwrap()
        .contains("version = \"1.1.0\" # synced"));
    assert_eq!(
        fs::read_to_string(root.join("node_modules/dep/.version")).unwrap(),
        "9.9.9\n"
    );
}

#[test]
#[ignore]
fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_project(root);

    let output = versync(root, &["set", "2.0.0", "--dry-run", "--sync", "--format", "json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["new_version"] == "2.0.0"));
    assert_eq!(fs::read_to_string(root.join(".version")).unwrap(), "1.0.0\n");
}

#[test]
#[ignore]
fn test_pre_release_quiet() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_project(root);

    let output = versync(root, &["pre", "rc", "--parallel", "--format", "quiet"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Success: 2 module(s) updated"));
    assert_eq!(fs::read_to_string(root.join("api/.version")).unwrap(), "1.0.1-rc.1\n");
}

#[test]
#[ignore]
fn test_invalid_set_version_fails() {
    let temp_dir = TempDir::new().unwrap();
    create_project(temp_dir.path());

    let output = versync(temp_dir.path(), &["set", "banana"]);
    assert!(!output.status.success());
}

#[test]
#[ignore]
fn test_empty_project_has_no_modules() {
    let temp_dir = TempDir::new().unwrap();

    let output = versync(temp_dir.path(), &["discover", "--json", "--modules-only"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.as_array().unwrap().is_empty());

    let output = versync(temp_dir.path(), &["bump", "patch"]);
    assert!(!output.status.success());
}
