//! CLI integration tests

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Isolated working directory that also serves as `$HOME`
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, value.to_string()).expect("Failed to write input");
        path
    }

    fn sizer(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_sizer"))
            .args(args)
            .env("HOME", self.dir.path())
            .env("NO_COLOR", "1")
            .env_remove("SIZER_API_URL")
            .env_remove("SIZER_CATALOG")
            .output()
            .expect("Failed to execute command")
    }

    fn sizer_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--format", "json"];
        full.extend_from_slice(args);
        let output = self.sizer(&full);
        assert!(
            output.status.success(),
            "sizer failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("Output should be JSON")
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("Temp path should be UTF-8")
}

fn reference_k8s_input() -> Value {
    json!({
        "distribution": "kubernetes",
        "technology": "dotnet",
        "prod_apps": {"medium": 70},
        "non_prod_apps": {"medium": 70},
        "environments": ["dev", "test", "prod"]
    })
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Sandbox::new().sizer(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("infrastructure sizing"), "Should show about text");
    for command in ["k8s", "vm", "growth", "preview"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("--remote"), "Should show remote option");
    assert!(stdout.contains("SIZER_API_URL"), "Should show env var");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Sandbox::new().sizer(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("sizer"), "Should show binary name");
}

#[test]
fn test_k8s_reference_portfolio() {
    let sandbox = Sandbox::new();
    let input = sandbox.write_json("k8s.json", &reference_k8s_input());

    let result = sandbox.sizer_json(&["k8s", path_str(&input)]);
    let rows = result["environments"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(result["grand_total"]["total_nodes"], 26);
}

#[test]
fn test_k8s_table_output() {
    let sandbox = Sandbox::new();
    let input = sandbox.write_json("k8s.json", &reference_k8s_input());

    let output = sandbox.sizer(&["k8s", path_str(&input)]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Kubernetes Sizing"));
    assert!(stdout.contains("Workers"));
    assert!(stdout.contains("Total"));
    assert!(stdout.contains("26 nodes"));
}

#[test]
fn test_k8s_validation_error_names_field() {
    let sandbox = Sandbox::new();
    let mut input = reference_k8s_input();
    input["environments"] = json!([]);
    let input = sandbox.write_json("k8s.json", &input);

    let output = sandbox.sizer(&["k8s", path_str(&input)]);
    assert!(!output.status.success(), "Empty environments should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("environments"), "Should name the field: {}", stderr);
}

#[test]
fn test_vm_active_passive() {
    let sandbox = Sandbox::new();
    let input = sandbox.write_json(
        "vm.json",
        &json!({
            "technology": "dotnet",
            "environments": [{
                "environment": "prod",
                "roles": [{"role": "web", "instances": 2, "tier": "medium"}],
                "ha_pattern": "active_passive"
            }]
        }),
    );

    let result = sandbox.sizer_json(&["vm", path_str(&input)]);
    assert_eq!(result["grand_total"]["total_vms"], 3);
    assert_eq!(result["environments"][0]["roles"][0]["effective_instances"], 3);
}

#[test]
fn test_growth_with_cost_model_flag() {
    let sandbox = Sandbox::new();
    let input = sandbox.write_json(
        "growth.json",
        &json!({
            "baseline": {"k8s": reference_k8s_input()},
            "settings": {
                "annual_growth_rate": 20.0,
                "projection_years": 5,
                "pattern": "linear",
                "start_year": 2026
            }
        }),
    );

    let result = sandbox.sizer_json(&["growth", path_str(&input), "--cost-model", "aws"]);
    let points = result["points"].as_array().unwrap();
    assert_eq!(points.len(), 6);
    assert_eq!(points[5]["projected_apps"], 280);
    assert_eq!(points[5]["calendar_year"], 2031);
    assert_eq!(result["cost_model"], "aws");
}

#[test]
fn test_growth_table_flags_critical_limits() {
    let sandbox = Sandbox::new();
    let input = sandbox.write_json(
        "growth.json",
        &json!({
            "baseline": {"metrics": {"apps": 1000, "pods": 30000, "nodes": 3000}},
            "settings": {"annual_growth_rate": 20.0, "projection_years": 3, "start_year": 2026}
        }),
    );

    let output = sandbox.sizer(&["growth", path_str(&input)]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Cluster Limit Warnings"));
    assert!(stdout.contains("critical"));
    assert!(stdout.contains("first in 2029"));
}

#[test]
fn test_preview_role() {
    let result = Sandbox::new().sizer_json(&[
        "preview",
        "role",
        "--role",
        "app",
        "--tier",
        "medium",
        "--technology",
        "java",
    ]);
    assert_eq!(result["cpu_cores"], 4);
    assert_eq!(result["ram_gb"], 12);
}

#[test]
fn test_preview_ha_and_lb() {
    let sandbox = Sandbox::new();

    let ha = sandbox.sizer_json(&["preview", "ha", "active-passive"]);
    assert_eq!(ha["multiplier"], 2.0);

    let lb = sandbox.sizer_json(&["preview", "lb", "ha_pair"]);
    assert_eq!(lb["vm_count"], 2);
}

#[test]
fn test_catalog_overrides_apply_locally() {
    let sandbox = Sandbox::new();
    let catalog = sandbox.write_json(
        "catalog.json",
        &json!({
            "load_balancers": [{
                "option": "ha_pair",
                "specs": {"vm_count": 3, "cpu_per_vm": 2, "ram_per_vm": 4}
            }]
        }),
    );

    let lb = sandbox.sizer_json(&["--catalog", path_str(&catalog), "preview", "lb", "ha_pair"]);
    assert_eq!(lb["vm_count"], 3);
}

#[test]
fn test_config_file_default_format() {
    let sandbox = Sandbox::new();
    let config_dir = sandbox.dir.path().join(".config").join("sizer");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), r#"{"default_format": "json"}"#).unwrap();

    let output = sandbox.sizer(&["preview", "ha", "n_plus_2"]);
    assert!(output.status.success());
    let result: Value = serde_json::from_slice(&output.stdout).expect("Config should select JSON");
    assert_eq!(result["multiplier"], 3.0);
}

/// Test invalid enum value error handling
#[test]
fn test_invalid_tier_rejected() {
    let output = Sandbox::new().sizer(&[
        "preview",
        "role",
        "--role",
        "app",
        "--tier",
        "huge",
        "--technology",
        "java",
    ]);

    assert!(!output.status.success(), "Unknown tier should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("huge"), "Should echo the bad value");
}

/// Test missing input file error handling
#[test]
fn test_missing_input_file() {
    let output = Sandbox::new().sizer(&["k8s", "/nonexistent/k8s.json"]);

    assert!(!output.status.success(), "Missing file should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read input file"));
}

/// Test missing required argument error handling
#[test]
fn test_missing_argument() {
    let output = Sandbox::new().sizer(&["vm"]);

    assert!(!output.status.success(), "Missing argument should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing argument"
    );
}
