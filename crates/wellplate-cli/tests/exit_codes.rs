use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

#[test]
fn exit_code_usage_is_1_for_missing_args() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let status = Command::new(bin)
        .args(["layout"])
        .status()
        .expect("run wellplate");
    assert_eq!(status.code(), Some(1));
}

#[test]
fn exit_code_usage_is_1_for_unknown_command() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let status = Command::new(bin)
        .args(["shuffle"])
        .status()
        .expect("run wellplate");
    assert_eq!(status.code(), Some(1));
}

#[test]
fn help_exits_cleanly() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let status = Command::new(bin)
        .args(["--help"])
        .status()
        .expect("run wellplate --help");
    assert_eq!(status.code(), Some(0));
}

#[test]
fn exit_code_input_is_2_for_missing_file() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let out_dir = tempfile::tempdir().expect("tempdir");
    let missing = out_dir.path().join("nope.yaml");

    let status = Command::new(bin)
        .args([
            "layout",
            missing.to_string_lossy().as_ref(),
            "--output",
            out_dir.path().join("output").to_string_lossy().as_ref(),
        ])
        .status()
        .expect("run wellplate layout");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn exit_code_input_is_2_for_invalid_yaml() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let out_dir = tempfile::tempdir().expect("tempdir");
    let bad = out_dir.path().join("bad.yaml");
    std::fs::write(&bad, "kind: [pcr,").expect("write bad yaml");

    let status = Command::new(bin)
        .args([
            "layout",
            bad.to_string_lossy().as_ref(),
            "--output",
            out_dir.path().join("output").to_string_lossy().as_ref(),
        ])
        .status()
        .expect("run wellplate layout");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn exit_code_input_is_2_for_malformed_batch_record() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let out_dir = tempfile::tempdir().expect("tempdir");
    let batch = workspace_root().join("fixtures/batches/not_a_batch.json");

    let status = Command::new(bin)
        .args([
            "export",
            batch.to_string_lossy().as_ref(),
            "--operator",
            "jdoe",
            "--output",
            out_dir.path().to_string_lossy().as_ref(),
        ])
        .status()
        .expect("run wellplate export");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn exit_code_processing_is_3_for_ineligible_rerun_sample() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let input = workspace_root().join("fixtures/sessions/rerun_ineligible.yaml");
    let out_dir = tempfile::tempdir().expect("tempdir");

    let output = Command::new(bin)
        .args([
            "layout",
            input.to_string_lossy().as_ref(),
            "--output",
            out_dir.path().join("output").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run wellplate layout");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("25_71"), "stderr: {stderr}");
    assert!(!out_dir.path().join("output/layout.yaml").exists());
}

#[test]
fn exit_code_success_is_0() {
    let bin = env!("CARGO_BIN_EXE_wellplate");
    let input = workspace_root().join("fixtures/sessions/pcr.yaml");
    let out_dir = tempfile::tempdir().expect("tempdir");

    let status = Command::new(bin)
        .args([
            "layout",
            input.to_string_lossy().as_ref(),
            "--output",
            out_dir.path().join("output").to_string_lossy().as_ref(),
        ])
        .status()
        .expect("run wellplate layout");
    assert_eq!(status.code(), Some(0));
}
