//! Integration tests for the `mihoctl` binary.
//!
//! Config tests point `MIHOCTL_CONFIG` at a temp file. Daemon tests run
//! the binary against a wiremock server standing in for mihomo.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// The `mihoctl` binary with env isolation: config lives at `config`
/// and no `MIHOCTL_*` override leaks in from the caller.
fn mihoctl_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mihoctl");
    cmd.env("MIHOCTL_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("MIHOCTL_API_ADDRESS")
        .env_remove("MIHOCTL_SECRET")
        .env_remove("MIHOCTL_TEST_URL")
        .env_remove("MIHOCTL_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn proxies_body(selected: &str) -> serde_json::Value {
    json!({
        "proxies": {
            "Proxy": {
                "name": "Proxy",
                "type": "Selector",
                "udp": true,
                "all": ["A", "B", "C"],
                "now": selected,
                "history": []
            },
            "A": { "name": "A", "type": "Shadowsocks", "udp": true, "history": [] },
            "B": { "name": "B", "type": "Vmess", "udp": false, "history": [] },
            "C": { "name": "C", "type": "Trojan", "udp": true, "history": [] }
        }
    })
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = mihoctl_cmd(&dir.path().join("config.toml")).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("select")
                .and(predicate::str::contains("test-group"))
                .and(predicate::str::contains("connections")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mihoctl"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_close_requires_id_or_all() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .arg("close")
        .assert()
        .failure();
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_env() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    mihoctl_cmd(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_set_then_show_masks_secret() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    mihoctl_cmd(&config)
        .args(["config", "set", "api_address", "http://10.0.0.1:9090/"])
        .assert()
        .success();
    mihoctl_cmd(&config)
        .args(["config", "set", "secret", "supersecretvalue"])
        .assert()
        .success();

    let stored = std::fs::read_to_string(&config).unwrap();
    assert!(stored.contains("http://10.0.0.1:9090"));

    mihoctl_cmd(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://10.0.0.1:9090")
                .and(predicate::str::contains("sup****lue"))
                .and(predicate::str::contains("supersecretvalue").not()),
        );
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_config_set_invalid_timeout_fails() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .args(["config", "set", "timeout", "soon"])
        .assert()
        .code(1);
}

// ── Daemon commands ─────────────────────────────────────────────────

#[test]
fn test_unreachable_daemon_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    mihoctl_cmd(&dir.path().join("config.toml"))
        .args(["--api-address", "http://127.0.0.1:1", "--timeout", "500", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not connect"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_group_members() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proxies_body("B")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mihoctl_cmd(&dir.path().join("config.toml"));
    cmd.args(["-a", &server.uri(), "-o", "plain", "list", "Proxy"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "A\nB\nC\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_unknown_group_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proxies_body("A")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mihoctl_cmd(&dir.path().join("config.toml"));
    cmd.args(["-a", &server.uri(), "list", "Nope"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Nope"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_select_confirms_new_member() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/Proxy"))
        .and(body_json(json!({ "name": "C" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proxies_body("C")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mihoctl_cmd(&dir.path().join("config.toml"));
    cmd.args(["-a", &server.uri(), "select", "Proxy", "C"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Proxy → C"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_select_unknown_member_exits_one() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/Proxy"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Proxy not found" })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mihoctl_cmd(&dir.path().join("config.toml"));
    cmd.args(["-a", &server.uri(), "select", "Proxy", "Z"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Not found"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_test_group_reports_failures_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proxies_body("A")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/group/Proxy/delay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "A": 120, "C": 340 })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mihoctl_cmd(&dir.path().join("config.toml"));
    cmd.args(["-a", &server.uri(), "-o", "plain", "test-group", "Proxy"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "A\t120\nB\tfailed\nC\t340\n"
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 node failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_probe_failure_exits_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxies/B/delay"))
        .respond_with(ResponseTemplate::new(504).set_body_json(json!({ "message": "Timeout" })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cmd = mihoctl_cmd(&dir.path().join("config.toml"));
    cmd.args(["-a", &server.uri(), "test", "B"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Timeout"));
}
