use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

fn run_feed(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_shadertoy-feed"))
        .env_remove("SHADERTOY_FEED_CONFIG")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run shadertoy-feed");
    (
        output.status.success(),
        String::from_utf8(output.stdout).expect("utf-8 stdout"),
    )
}

fn frame_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json frame line"))
        .collect()
}

#[test]
fn captures_once_and_swaps_shader() {
    let root = TempDir::new().unwrap();
    let captures = root.path().join("captures");

    let (ok, stdout) = run_feed(&[
        "--size",
        "16x8",
        "--frames",
        "6",
        "--step-ms",
        "100",
        "--trigger-frame",
        "3",
        "--captures",
        captures.to_str().unwrap(),
        "--next-shader",
        "alt.slang",
    ]);
    assert!(ok);

    let lines = frame_lines(&stdout);
    assert_eq!(lines.len(), 6);
    for line in &lines[1..3] {
        let rate = line["shaderInputs"]["iFrameRate"].as_f64().unwrap();
        assert!((rate - 10.0).abs() < 1e-4);
    }
    assert_eq!(
        lines[2]["shaderPath"],
        Value::from("RenderPasses/Shadertoy/Shadertoy.ps.slang")
    );
    assert_eq!(lines[3]["shaderPath"], Value::from("alt.slang"));

    let native = captures.join("ShadertoyOutput3_native.png");
    let manual = captures.join("ShadertoyOutput3_manual.png");
    assert!(native.exists());
    assert!(manual.exists());
    assert_eq!(std::fs::read_dir(&captures).unwrap().count(), 2);
}

#[test]
fn short_run_writes_no_captures() {
    let root = TempDir::new().unwrap();
    let captures = root.path().join("captures");

    let (ok, stdout) = run_feed(&[
        "--frames",
        "2",
        "--trigger-frame",
        "5",
        "--captures",
        captures.to_str().unwrap(),
    ]);
    assert!(ok);
    assert_eq!(frame_lines(&stdout).len(), 2);
    assert!(!captures.exists());
}

#[test]
fn config_subcommand_prints_resolved_toml() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("feeder.toml");
    std::fs::write(&path, "[window]\nwidth = 320\nheight = 200\n").unwrap();

    let (ok, stdout) = run_feed(&["--config", path.to_str().unwrap(), "config"]);
    assert!(ok);
    assert!(stdout.contains("width = 320"));
    assert!(stdout.contains("trigger_frame = 10000"));
}

#[test]
fn invalid_config_fails() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("feeder.toml");
    std::fs::write(&path, "[capture]\ntrigger_frame = 0\n").unwrap();

    let (ok, _) = run_feed(&["--config", path.to_str().unwrap()]);
    assert!(!ok);
}
