use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn dv_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dv");
    path
}

const FEBRUARY: &str = "\u{feff}日時,名称,PF,トピック,起源,背景,影響\n\
2024-02-01,Alpha Quest,PC,発表,Studio A,\"Announced at a showcase, with a trailer\",High\n\
2024-02-14,Beta Racer,\"PS5, Switch\",発売,Studio B,Sequel,Medium\n\
2024-02-07,<script>alert(1)</script>,PC,アップデート,Studio C,Patch,Low\n";

const JANUARY: &str = "日時,名称,PF,トピック,起源,背景,影響\n\
2024-01-20,Gamma Tactics,Switch,発売,Studio D,Port,Low\n";

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("manifest.json"),
        r#"{
  "updated": "2024-03-01",
  "defaultMonth": "2024-02",
  "files": [
    { "month": "2024-02", "path": "data/2024-02.csv" },
    { "month": "2024-01", "path": "data/2024-01.csv" },
    { "month": "2023-12", "path": "data/missing.csv" }
  ]
}"#,
    )
    .unwrap();
    fs::write(data_dir.join("2024-02.csv"), FEBRUARY).unwrap();
    fs::write(data_dir.join("2024-01.csv"), JANUARY).unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[data]
root = "{}"
manifest = "data/manifest.json"

[server]
bind = "127.0.0.1:7332"
"#,
        root.display()
    );
    let config_path = config_dir.join("dv.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_dv(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dv_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dv binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_months_lists_manifest() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dv(&config_path, &["months"]);
    assert!(success, "months failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Updated: 2024-03-01"));
    assert!(stdout.contains("2024-01"));

    let default_line = stdout
        .lines()
        .find(|line| line.starts_with("2024-02"))
        .expect("default month listed");
    assert!(default_line.contains("yes"));
}

#[test]
fn test_search_default_month_newest_first() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dv(&config_path, &["search"]);
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Month: 2024-02"));
    assert!(stdout.contains("Records: 3"));

    let beta = stdout.find("Beta Racer").unwrap();
    let alpha = stdout.find("Alpha Quest").unwrap();
    assert!(beta < alpha, "expected newest record first:\n{}", stdout);
}

#[test]
fn test_search_query_matches_quoted_field() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_dv(&config_path, &["search", "SHOWCASE"]);
    assert!(success);
    assert!(stdout.contains("Records: 1"));
    assert!(stdout.contains("Alpha Quest"));
}

#[test]
fn test_search_platform_chips_are_any_of() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_dv(
        &config_path,
        &["search", "--platform", "Switch", "--platform", "PC"],
    );
    assert!(success);
    assert!(stdout.contains("Records: 3"));

    let (stdout, _, success) = run_dv(
        &config_path,
        &["search", "--platform", "Switch", "--topic", "発表"],
    );
    assert!(success);
    assert!(stdout.contains("Records: 0"));
}

#[test]
fn test_search_json_output() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dv(
        &config_path,
        &["search", "--month", "2024-01", "--format", "json"],
    );
    assert!(success, "search failed: stderr={}", stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["month"], "2024-01");
    assert_eq!(value["count"], 1);
    assert_eq!(value["records"][0]["name"], "Gamma Tactics");
    assert_eq!(value["records"][0]["id"], "2024-01-20-0");
}

#[test]
fn test_search_html_escapes_content() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_dv(&config_path, &["search", "--format", "html"]);
    assert!(success);
    assert!(stdout.contains("<!doctype html>"));
    assert!(stdout.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!stdout.contains("<script>alert(1)</script>"));
}

#[test]
fn test_search_unknown_format_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_dv(&config_path, &["search", "--format", "xml"]);
    assert!(!success);
    assert!(stderr.contains("Unknown output format"));
}

#[test]
fn test_unknown_month_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_dv(&config_path, &["search", "--month", "1999-01"]);
    assert!(!success);
    assert!(stderr.contains("month not found in manifest: 1999-01"));
}

#[test]
fn test_missing_dataset_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_dv(&config_path, &["search", "--month", "2023-12"]);
    assert!(!success);
    assert!(stderr.contains("2023-12"));
}

#[test]
fn test_tags_lists_sorted_unique() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dv(&config_path, &["tags", "--field", "platform"]);
    assert!(success, "tags failed: stderr={}", stderr);
    assert!(stdout.contains("platform (3)"));
    assert!(!stdout.contains("topic"));

    let tags: Vec<&str> = stdout
        .lines()
        .filter(|line| line.starts_with("  "))
        .map(str::trim)
        .collect();
    assert_eq!(tags, vec!["PC", "PS5", "Switch"]);
}

#[test]
fn test_tags_unknown_field_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_dv(&config_path, &["tags", "--field", "genre"]);
    assert!(!success);
    assert!(stderr.contains("Unknown tag field"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");

    let (_, stderr, success) = run_dv(&missing, &["months"]);
    assert!(!success);
    assert!(stderr.contains("nope.toml"));
}

#[test]
fn test_browse_session_from_stdin() {
    let (_tmp, config_path) = setup_test_env();

    let mut child = Command::new(dv_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("browse")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all("/platform PC\nalpha\n/reset all\n/quit\n".as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "browse failed: {}", stdout);

    assert!(stdout.contains("Months: [2024-02] 2024-01 2023-12"));
    let counts: Vec<&str> = stdout
        .lines()
        .filter(|line| line.starts_with("Records: "))
        .collect();
    assert_eq!(
        counts,
        vec!["Records: 3", "Records: 2", "Records: 1", "Records: 3"]
    );
}
