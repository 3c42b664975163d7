//! Integration tests for the monbo binary.
//!
//! Each test writes a config file pointing the log into a temporary
//! directory, runs the binary and checks its JSON or file output. Provider
//! credentials are removed from the environment so maps use the solid
//! background.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Temporary workspace with a config file.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let log = dir.path().join("monbo.log");
        fs::write(
            dir.path().join("config.ini"),
            format!("[logging]\nfile = {}\n", log.display()),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Run a CLI command and capture output.
    fn run(&self, args: &[&str]) -> Output {
        let config = self.path("config.ini");
        Command::new(env!("CARGO_BIN_EXE_monbo"))
            .arg("--config")
            .arg(&config)
            .args(args)
            .env_remove("GCP_MAPS_PLATFORM_API_KEY")
            .env_remove("GCP_MAPS_PLATFORM_SIGNATURE_SECRET")
            .env_remove("OVERLAP_THRESHOLD_PERCENTAGE")
            .output()
            .expect("Failed to execute CLI command")
    }
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!("{} failed:\nstdout: {}\nstderr: {}", context, stdout, stderr);
    }
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn str_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

const THREE_FARMS: &str = r#"[
  {"id": "A", "coordinates": [{"lng": 0, "lat": 0}, {"lng": 1, "lat": 0}, {"lng": 1, "lat": 1}, {"lng": 0, "lat": 1}]},
  {"id": "B", "coordinates": [{"lng": 0.5, "lat": 0.5}, {"lng": 1.5, "lat": 0.5}, {"lng": 1.5, "lat": 1.5}, {"lng": 0.5, "lat": 1.5}]},
  {"id": "C", "legacy": "[(2, 0), (2, 1), (3, 1), (3, 0)]"}
]"#;

#[test]
fn test_validate_reports_overlap() {
    let ws = Workspace::new();
    let farms = ws.write("farms.json", THREE_FARMS);

    let output = ws.run(&["validate", str_arg(&farms)]);
    assert_success(&output, "validate");

    let report = stdout_json(&output);
    let statuses: Vec<&str> = report["farms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["NOT_VALID", "NOT_VALID", "VALID"]);
    assert_eq!(report["inconsistencies"].as_array().unwrap().len(), 1);
}

#[test]
fn test_validate_rejects_out_of_range_threshold() {
    let ws = Workspace::new();
    let farms = ws.write("farms.json", THREE_FARMS);

    let output = ws.run(&["validate", str_arg(&farms), "--threshold", "120"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("threshold"));
}

#[test]
fn test_area_uses_default_point_radius() {
    let ws = Workspace::new();
    let farms = ws.write(
        "farms.json",
        r#"[{"id": "p", "coordinates": [{"lng": -50.456, "lat": 10.123}]}]"#,
    );

    let output = ws.run(&["area", str_arg(&farms)]);
    assert_success(&output, "area");

    let areas = stdout_json(&output);
    let area = areas[0]["area"].as_f64().unwrap();
    let expected = std::f64::consts::PI * 50.0 * 50.0;
    assert!((area - expected).abs() / expected < 0.01, "area {}", area);
    assert_eq!(areas[0]["kind"], "Point");
}

#[test]
fn test_contract_violation_fails_the_command() {
    let ws = Workspace::new();
    let farms = ws.write(
        "farms.json",
        r#"[{"id": "bad", "radius": 10, "coordinates": [{"lng": 0, "lat": 0}, {"lng": 1, "lat": 0}]}]"#,
    );

    let output = ws.run(&["area", str_arg(&farms)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Farm 'bad'"));
}

#[test]
fn test_render_without_credentials_writes_png() {
    let ws = Workspace::new();
    let farms = ws.write(
        "farms.json",
        r#"[{"id": "f", "coordinates": [{"lng": -50.46, "lat": 10.12}, {"lng": -50.45, "lat": 10.12}, {"lng": -50.45, "lat": 10.13}, {"lng": -50.46, "lat": 10.13}]}]"#,
    );
    let png = ws.path("map.png");

    let output = ws.run(&["render", str_arg(&farms), "--farm", "f", "-o", str_arg(&png)]);
    assert_success(&output, "render");

    let bytes = fs::read(&png).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_config_init_and_path() {
    let ws = Workspace::new();
    let target = ws.path("fresh.ini");

    let output = Command::new(env!("CARGO_BIN_EXE_monbo"))
        .args(["--config", str_arg(&target), "config", "init"])
        .output()
        .unwrap();
    assert_success(&output, "config init");
    let text = fs::read_to_string(&target).unwrap();
    assert!(text.contains("[overlap]"));
    assert!(text.contains("threshold_percentage = 0"));

    let output = Command::new(env!("CARGO_BIN_EXE_monbo"))
        .args(["--config", str_arg(&target), "config", "path"])
        .output()
        .unwrap();
    assert_success(&output, "config path");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), str_arg(&target));
}

#[test]
fn test_half_configured_credentials_fail_before_running() {
    let ws = Workspace::new();
    let farms = ws.write("farms.json", THREE_FARMS);
    let log = ws.path("monbo.log");
    ws.write(
        "config.ini",
        &format!("[provider]\napi_key = key\n[logging]\nfile = {}\n", log.display()),
    );

    let output = ws.run(&["validate", str_arg(&farms)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GCP_MAPS_PLATFORM_SIGNATURE_SECRET"), "{}", stderr);
}
