use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "asha-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_missions_writes_output() {
    let exe = env!("CARGO_BIN_EXE_asha-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-missions", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available missions"));
    assert!(content.contains("The Salt Trader"));
}

#[test]
fn cli_scholar_run_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_asha-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args(["--report", "json", "--seeds", "1,2", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let missions = report["missions"].as_array().expect("missions array");
    assert!(!missions.is_empty());
    assert!(missions.iter().all(|run| run["passed"] == true));
    assert!(
        report["realms"]
            .as_array()
            .expect("realms array")
            .iter()
            .all(|realm| realm["percent"] == 100)
    );
}

#[test]
fn cli_custom_catalog_with_unknown_simulation_fails() {
    let exe = env!("CARGO_BIN_EXE_asha-tester");
    let catalog_path = temp_path("catalog");
    std::fs::write(
        &catalog_path,
        r#"{ "missions": [{ "id": 101, "title": "Mystery", "simulationType": "mining" }] }"#,
    )
    .expect("write catalog");
    let output_path = temp_path("markdown");
    let status = Command::new(exe)
        .args(["--report", "markdown", "--catalog"])
        .arg(&catalog_path)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert_eq!(status.code(), Some(1));
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("unknown simulation type 'mining'"));
}

#[test]
fn cli_rejects_unknown_mission_ids() {
    let exe = env!("CARGO_BIN_EXE_asha-tester");
    let output = Command::new(exe)
        .args(["--missions", "999"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mission 999 not found"));
}

#[test]
fn cli_wanderer_exits_cleanly_even_when_runs_fail() {
    let exe = env!("CARGO_BIN_EXE_asha-tester");
    let output_path = temp_path("wanderer");
    let status = Command::new(exe)
        .args([
            "--strategy",
            "wanderer",
            "--missions",
            "101,104",
            "--max-steps",
            "50",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Total runs: 2"));
}
