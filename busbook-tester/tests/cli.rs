use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "busbook-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_busbook-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("stale-price"));
}

#[test]
fn cli_runs_all_logic_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_busbook-tester");
    let output_path = temp_path("run");
    let status = Command::new(exe)
        .args([
            "--mode",
            "logic",
            "--scenarios",
            "all",
            "--seeds",
            "7,99",
            "--date",
            "2026-11-02",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let results: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let runs = results.as_array().expect("array of results");
    assert_eq!(runs.len(), 24);
    assert!(runs.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_rejects_malformed_date() {
    let exe = env!("CARGO_BIN_EXE_busbook-tester");
    let status = Command::new(exe)
        .args(["--date", "11/02/2026"])
        .status()
        .expect("run cli");
    assert!(!status.success());
}
