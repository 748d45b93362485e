// Integration tests for the `livegrid` binary's headless surface.
// Run with: cargo test -p livegrid-cli --test cli_tests
//
// Manual smoke test (needs a TTY and a running server):
//   livegrid --url ws://127.0.0.1:9123
//   Verify: header turns green, Enter edits, Esc discards, q exits cleanly.

use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};

fn livegrid(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_livegrid"));
    cmd.arg("--config").arg(config);
    cmd.env_remove("LIVEGRID_URL");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("settings.json");
    std::fs::write(&path, body).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A local URL where nothing is listening.
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_show_reads_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"{
        // team server
        "server.url": "ws://10.1.2.3:9123",
        "grid.rows": 40
    }"#,
    );

    let output = livegrid(&config)
        .args(["config", "show", "--connect-timeout-ms", "0", "--no-auto-connect"])
        .output()
        .expect("livegrid config show");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let shown: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(shown["server.url"], "ws://10.1.2.3:9123");
    assert_eq!(shown["grid.rows"], 40);
    assert_eq!(shown["grid.cols"], 20);
    assert!(shown["server.connectTimeoutMs"].is_null());
    assert_eq!(shown["server.autoConnect"], false);
}

#[test]
fn config_url_flag_wins() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{ "server.url": "ws://file:1" }"#);

    let output = livegrid(&config)
        .args(["--url", "ws://flag:2", "config", "show"])
        .output()
        .expect("livegrid config show");
    let shown: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(shown["server.url"], "ws://flag:2");
}

#[test]
fn config_path_prints_given_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "{}");

    let output = livegrid(&config).args(["config", "path"]).output().expect("livegrid config path");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), config.display().to_string());
}

#[test]
fn config_invalid_file_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{ "grid.rows": "lots" }"#);

    let output = livegrid(&config).args(["config", "show"]).output().expect("livegrid config show");
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid settings"));
}

// ---------------------------------------------------------------------------
// set / watch exit codes
// ---------------------------------------------------------------------------

#[test]
fn set_rejects_bad_cell_reference() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "{}");

    let output = livegrid(&config).args(["set", "3B", "1"]).output().expect("livegrid set");
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("invalid cell reference: 3B"), "stderr: {}", err);
    assert!(err.contains("hint:"));
}

#[test]
fn watch_refused_exits_connect() {
    let dir = tempfile::tempdir().unwrap();
    let url = refused_url();
    let config = write_config(dir.path(), &format!(r#"{{ "server.url": "{}" }}"#, url));

    let output = livegrid(&config).arg("watch").output().expect("livegrid watch");
    assert_eq!(output.status.code(), Some(20));
    assert!(stderr(&output).contains(&format!("Failed to connect to {}", url)));
}

#[test]
fn set_refused_exits_connect() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "{}");

    let output = livegrid(&config)
        .args(["--url", &refused_url(), "set", "A1", "5"])
        .output()
        .expect("livegrid set");
    assert_eq!(output.status.code(), Some(20));
}

#[test]
fn watch_handshake_timeout_exits_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "{}");
    // Accepts TCP, never answers the websocket handshake
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let output = livegrid(&config)
        .args(["--url", &url, "--connect-timeout-ms", "200", "watch"])
        .output()
        .expect("livegrid watch");
    assert_eq!(output.status.code(), Some(22));
    assert!(stderr(&output).contains("timed out"));
    drop(listener);
}
