//! Integration tests for the `truckgate` CLI binary.
//!
//! Parsing, help, completions and config handling run without a backend;
//! the backend-bound commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_HOME: &str = "/tmp/truckgate-cli-test-nonexistent";

/// Build a [`Command`] for the `truckgate` binary with env isolation.
///
/// Clears all `TRUCKGATE_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn truckgate_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("truckgate");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("TRUCKGATE_PROFILE")
        .env_remove("TRUCKGATE_BACKEND")
        .env_remove("TRUCKGATE_API_KEY")
        .env_remove("TRUCKGATE_OUTPUT")
        .env_remove("TRUCKGATE_INSECURE")
        .env_remove("TRUCKGATE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn truckgate_cmd() -> assert_cmd::Command {
    truckgate_in(Path::new(NO_HOME))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> Output {
    let mut cmd = truckgate_cmd();
    cmd.arg("--backend").arg(server.uri()).args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = truckgate_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    truckgate_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("monitor")
            .and(predicate::str::contains("plates"))
            .and(predicate::str::contains("cameras"))
            .and(predicate::str::contains("health")),
    );
}

#[test]
fn test_version_flag() {
    truckgate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("truckgate"));
}

#[test]
fn test_completions_bash() {
    truckgate_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    truckgate_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = truckgate_cmd().arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("foobar"), "Expected the bad subcommand echoed:\n{text}");
}

#[test]
fn test_invalid_output_format() {
    truckgate_cmd()
        .args(["--output", "xml", "cameras", "list"])
        .assert()
        .code(2);
}

#[test]
fn test_cameras_list_no_backend() {
    truckgate_cmd()
        .args(["cameras", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No gate backend configured"));
}

#[test]
fn test_unknown_profile() {
    truckgate_cmd()
        .args(["--profile", "nope", "--backend", "http://127.0.0.1:9", "health"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn test_non_http_backend_rejected() {
    truckgate_cmd()
        .args(["--backend", "ftp://gate.local", "health"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_plate_rejected_before_network() {
    // Nothing listens on the discard port; a network call would exit 7.
    truckgate_cmd()
        .args(["--backend", "http://127.0.0.1:9", "plates", "add", "ABC"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid value for plate"));
}

#[test]
fn test_monitor_requires_camera() {
    truckgate_cmd()
        .args(["--backend", "http://127.0.0.1:9", "monitor"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--camera"));
}

#[test]
fn test_unreachable_backend_is_connection_error() {
    truckgate_cmd()
        .args(["--backend", "http://127.0.0.1:9", "--timeout", "2", "cameras", "list"])
        .assert()
        .code(7);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_follows_xdg() {
    let home = tempfile::tempdir().unwrap();
    truckgate_in(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(home.path().to_str().unwrap()));
}

#[test]
fn test_config_show_no_config() {
    truckgate_cmd()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn test_config_set_then_show_redacts_key() {
    let home = tempfile::tempdir().unwrap();
    truckgate_in(home.path())
        .args(["config", "set", "backend", "http://gate.local:5001"])
        .assert()
        .success();
    truckgate_in(home.path())
        .args(["config", "set", "api_key", "s3cret"])
        .assert()
        .success();

    truckgate_in(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://gate.local:5001")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("s3cret").not()),
        );

    truckgate_in(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    truckgate_in(home.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_set_default_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    truckgate_in(home.path())
        .args(["config", "set-default", "yard"])
        .assert()
        .code(2);
}

#[test]
fn test_config_subcommands_exist() {
    for sub in ["init", "show", "path", "set", "profiles", "set-default", "set-key"] {
        truckgate_cmd()
            .args(["config", sub, "--help"])
            .assert()
            .success();
    }
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_cameras_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/camera/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cameras": [
                { "id": 0, "name": "Kamera 0", "resolution": "640x480", "fps": 30 },
                { "id": 1, "resolution": "1280x720" }
            ],
            "current_camera": 0,
            "camera_active": false
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "json", "cameras", "list"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let cameras: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cameras.as_array().unwrap().len(), 2);
    assert_eq!(cameras[1]["name"], "Camera 1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plates_check_plain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/check-plate"))
        .and(body_json(json!({ "plate_number": "34ABC1234" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plate_number": "34ABC1234",
            "authorized": true,
            "gate_action": "open"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "plates", "check", "34 abc 1234"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "authorized");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plates_remove_by_number() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plates": [
                { "id": 12, "plate_number": "34ABC1234", "created_at": "2024-05-01T08:00:00+00:00" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/plates/12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "ok" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["--yes", "plates", "remove", "34abc1234"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plates_remove_needs_yes_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plates": [{ "id": 12, "plate_number": "34ABC1234" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["plates", "remove", "12"]).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plates_add_duplicate_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/plates"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "Plaka zaten mevcut"
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["plates", "add", "34ABC1234"]).await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_monitor_streams_detection_and_stops() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/camera/start"))
        .and(body_json(json!({ "camera_id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "message": "ok", "camera_id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/detection/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/detection/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "has_result": true,
            "result": {
                "plate_text": "34ABC1234",
                "vehicle_type": "truck",
                "confidence": 0.91,
                "gate_action": "open",
                "is_authorized": true,
                "timestamp": "2024-05-01T10:15:30"
            }
        })))
        .mount(&server)
        .await;
    for stop in ["/api/detection/stop", "/api/camera/stop"] {
        Mock::given(method("POST"))
            .and(path(stop))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut cmd = truckgate_cmd();
    cmd.env("TRUCKGATE_DEFAULTS__SESSION__GRACE_DELAY_MS", "0")
        .arg("--backend")
        .arg(server.uri())
        .args([
            "-o",
            "json-compact",
            "monitor",
            "--camera",
            "1",
            "--duration",
            "2",
            "--poll-interval",
            "200",
        ]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    // The same result is served on every poll but dispatched once.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout:\n{stdout}");
    let detection: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(detection["plate_text"], "34ABC1234");
    assert_eq!(detection["gate_action"], "open");
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_monitor_interrupted_during_startup_stops_camera() {
    use std::process::{Command, Stdio};
    use std::time::Duration;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/camera/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "message": "ok", "camera_id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/detection/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "has_result": false })))
        .mount(&server)
        .await;
    for endpoint in [
        "/api/detection/start",
        "/api/detection/stop",
        "/api/camera/stop",
    ] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let child = Command::new(env!("CARGO_BIN_EXE_truckgate"))
        .env("HOME", NO_HOME)
        .env("XDG_CONFIG_HOME", NO_HOME)
        .env("NO_COLOR", "1")
        .env_remove("TRUCKGATE_PROFILE")
        .env_remove("TRUCKGATE_API_KEY")
        .env_remove("RUST_LOG")
        .env("TRUCKGATE_DEFAULTS__SESSION__GRACE_DELAY_MS", "1500")
        .args(["--backend", &server.uri(), "monitor", "--camera", "1"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // Once the camera start has arrived the signal handler is installed
    // and the session is sitting in its grace delay.
    let mut waited = Duration::ZERO;
    loop {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.iter().any(|r| r.url.path() == "/api/camera/start") {
            break;
        }
        assert!(waited < Duration::from_secs(10), "camera start never arrived");
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }

    let kill = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let output = tokio::task::spawn_blocking(move || child.wait_with_output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Interrupted"),
        "{}",
        combined_output(&output)
    );
}
