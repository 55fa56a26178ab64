use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ragdesk_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ragdesk"))
}

/// Write a config and corpus into a temp dir. The embedding and generation
/// providers point at a port with nothing listening, so any command that
/// reaches a provider fails fast.
fn setup_test_env(corpus: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("documents.json"), corpus).unwrap();

    let config_content = r#"[corpus]
path = "../data/documents.json"

[retrieval]
top_k = 2

[embedding]
provider = "ollama"
model = "nomic-embed-text"
dims = 4
url = "http://127.0.0.1:9"
max_retries = 0
timeout_secs = 2

[generation]
provider = "ollama"
model = "llama3.2"
url = "http://127.0.0.1:9"
max_retries = 0
timeout_secs = 2

[server]
bind = "127.0.0.1:0"
"#;

    let config_path = config_dir.join("ragdesk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

const CORPUS: &str = r#"[
  {"title": "Home Insurance", "content": "Covers fire, flood and theft of contents."},
  {"title": "Car Insurance", "content": "Covers collision damage and third-party liability."},
  {"title": "Travel Insurance", "content": "Covers lost luggage and overseas medical costs."}
]"#;

fn run_ragdesk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ragdesk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ragdesk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_check_reports_corpus() {
    let (_tmp, config_path) = setup_test_env(CORPUS);

    let (stdout, stderr, success) = run_ragdesk(&config_path, &["check"]);
    assert!(success, "check failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Documents:   3"), "{}", stdout);
    assert!(stdout.contains("Top-K:       2"), "{}", stdout);
    assert!(stdout.contains("OK"));
}

#[test]
fn test_check_empty_corpus_fails() {
    let (_tmp, config_path) = setup_test_env("[]");

    let (stdout, stderr, success) = run_ragdesk(&config_path, &["check"]);
    assert!(!success, "check should fail: stdout={}", stdout);
    assert!(stderr.contains("corpus is empty"), "{}", stderr);
}

#[test]
fn test_check_malformed_record_fails() {
    let (_tmp, config_path) = setup_test_env(r#"[{"title": "no content"}]"#);

    let (_, stderr, success) = run_ragdesk(&config_path, &["check"]);
    assert!(!success);
    assert!(stderr.contains("Invalid corpus file"), "{}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_ragdesk(&tmp.path().join("absent.toml"), &["check"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}

#[test]
fn test_ask_reports_unreachable_provider() {
    let (_tmp, config_path) = setup_test_env(CORPUS);

    let (stdout, stderr, success) = run_ragdesk(&config_path, &["ask", "Is fire covered?"]);
    assert!(!success, "ask should fail: stdout={}", stdout);
    assert!(stderr.contains("Ollama"), "{}", stderr);
}

#[test]
fn test_search_rejects_zero_k() {
    let (_tmp, config_path) = setup_test_env(CORPUS);

    let (_, stderr, success) = run_ragdesk(&config_path, &["search", "fire", "--k", "0"]);
    assert!(!success);
    assert!(stderr.contains("--k must be greater than zero"), "{}", stderr);
}

#[test]
fn test_completions_without_config() {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, success) =
        run_ragdesk(&tmp.path().join("absent.toml"), &["completions", "bash"]);
    assert!(success, "completions failed: {}", stderr);
    assert!(stdout.contains("ragdesk"));
}
