use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_citelink-cli") {
        return PathBuf::from(path);
    }
    if let Some(path) = env::var_os("CARGO_BIN_EXE_citelink_cli") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("citelink-cli");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "citelink_cli_{}_{}_{}.txt",
        name,
        now.as_secs(),
        now.subsec_nanos()
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

const MESSAGE_JSON: &str = r#"{
  "id": "m1",
  "role": "assistant",
  "content": "Findings:\na) first [1]\nb) second [2]",
  "citations": [
    { "title": "Annual Report", "quote": "q", "category": "Reports" },
    { "title": "Bylaws", "quote": "q" }
  ],
  "createdAt": "2024-06-01T12:00:00Z"
}"#;

#[test]
fn plain_text_renders_markers_as_broken() {
    let input = temp_file("plain", "See [1] for details.\n");
    let output = Command::new(bin_path())
        .args([input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("citelink-marker--broken"));
}

#[test]
fn json_message_renders_blocks_and_markers() {
    let input = temp_file("message", MESSAGE_JSON);
    let output = Command::new(bin_path())
        .args(["--json", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<p>Findings:</p>"));
    assert!(stdout.contains("type=\"a\""));
    assert!(stdout.contains("data-citation-number=\"2\""));
    assert!(!stdout.contains("citelink-marker--broken"));
}

#[test]
fn fragment_replay_traces_effects_and_telemetry() {
    let input = temp_file("fragment", MESSAGE_JSON);
    let output = Command::new(bin_path())
        .args(["--json", "--fragment", "#cite-c2", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("deep_link_highlight"));
    assert!(stderr.contains("scroll citation 1 into view"));
    assert!(stderr.contains("replace fragment with #cite-c2"));
}

#[test]
fn unresolvable_fragment_exits_nonzero() {
    let input = temp_file("bad_fragment", MESSAGE_JSON);
    let output = Command::new(bin_path())
        .args(["--json", "--fragment", "#cite-c9", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
}
