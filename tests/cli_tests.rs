//! CLI tests that run the `joiner` binary without ffmpeg

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn joiner() -> Command {
    let mut cmd = Command::cargo_bin("joiner").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("CONCATX_FFPROBE", "/nonexistent/concatx-ffprobe")
        .env("CONCATX_FFMPEG", "/nonexistent/concatx-ffmpeg");
    cmd
}

#[test]
fn help_lists_commands() {
    joiner()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("concat"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("progress"));
}

#[test]
fn plan_with_one_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    joiner()
        .current_dir(dir.path())
        .args(["plan", "only.mp4", "--output", "out.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "At least two items are required for concatenation.",
        ));
}

#[test]
fn unprobeable_inputs_cancel_the_concatenation() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.mp4");
    joiner()
        .current_dir(dir.path())
        .args(["concat", "a.mp4", "b.mp4", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Concatenation cancelled! Some items are invalid or are still being processed.",
        ));
    assert!(!output.exists());
}

#[test]
fn concat_refuses_non_empty_output_without_force() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.mp4");
    std::fs::write(&output, b"existing").unwrap();

    joiner()
        .current_dir(dir.path())
        .args(["concat", "a.mp4", "b.mp4", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(std::fs::read(&output).unwrap(), b"existing");
}

#[test]
fn progress_reports_percentage() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("job.progress");
    std::fs::write(
        &file,
        "frame=100\nout_time_us=15000000\nspeed=3.0x\nprogress=continue\n",
    )
    .unwrap();

    joiner()
        .arg("progress")
        .arg(&file)
        .args(["--duration", "00:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress: 50.0%"))
        .stdout(predicate::str::contains("ETA: 5s"));
}

#[test]
fn progress_json_output() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("job.progress");
    std::fs::write(&file, "out_time_us=2000000\nprogress=end\n").unwrap();

    joiner()
        .arg("progress")
        .arg(&file)
        .args(["--duration", "2", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"finished\": true"))
        .stdout(predicate::str::contains("\"percent\": 100.0"));
}

#[test]
fn invalid_duration_is_a_usage_error() {
    joiner()
        .args(["progress", "job.progress", "--duration", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--duration"));
}

#[test]
fn broken_config_file_fails_early() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[tools\n").unwrap();

    joiner()
        .arg("--config")
        .arg(&config)
        .args(["progress", "job.progress", "--duration", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

/// Stand-in ffprobe reporting a two second 1080p H.264 file for any input
#[cfg(unix)]
fn fake_ffprobe(dir: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-ffprobe");
    std::fs::write(
        &script,
        r#"#!/bin/sh
cat <<'JSON'
{
  "streams": [
    {
      "index": 0,
      "codec_type": "video",
      "codec_name": "h264",
      "codec_tag_string": "avc1",
      "width": 1920,
      "height": 1080,
      "time_base": "1/12800",
      "r_frame_rate": "25/1",
      "avg_frame_rate": "25/1"
    }
  ],
  "format": { "duration": "2.0" }
}
JSON
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn plan_output_has_no_scratch_paths() {
    let dir = TempDir::new().unwrap();
    let ffprobe = fake_ffprobe(dir.path());

    let assert = joiner()
        .current_dir(dir.path())
        .env("CONCATX_FFPROBE", &ffprobe)
        .args(["plan", "a.mp4", "b.mp4", "--output", "out.mp4", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<manifest>"))
        .stdout(predicate::str::contains("<progress-file>"))
        .stdout(predicate::str::contains("progress_file").not());

    let summary: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(summary["strategy"], "demuxer");
    assert_eq!(summary["item_count"], 2);
}

#[cfg(unix)]
#[test]
fn plan_text_output_uses_placeholders() {
    let dir = TempDir::new().unwrap();
    let ffprobe = fake_ffprobe(dir.path());

    joiner()
        .current_dir(dir.path())
        .env("CONCATX_FFPROBE", &ffprobe)
        .args(["plan", "a.mp4", "b.mp4", "--output", "out.mp4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-i <manifest>"))
        .stdout(predicate::str::contains("Manifest:").not())
        .stdout(predicate::str::contains("Progress file:").not());
}

#[cfg(unix)]
#[test]
fn failed_ffmpeg_removes_the_output_it_created() {
    let dir = TempDir::new().unwrap();
    let ffprobe = fake_ffprobe(dir.path());
    let output = dir.path().join("out.mp4");

    joiner()
        .current_dir(dir.path())
        .env("CONCATX_FFPROBE", &ffprobe)
        .env("CONCATX_FFMPEG", "false")
        .args(["concat", "a.mp4", "b.mp4", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ffmpeg failed with exit code 1"));
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn failed_ffmpeg_keeps_an_output_that_already_existed() {
    let dir = TempDir::new().unwrap();
    let ffprobe = fake_ffprobe(dir.path());
    let output = dir.path().join("out.mp4");
    std::fs::write(&output, b"").unwrap();

    joiner()
        .current_dir(dir.path())
        .env("CONCATX_FFPROBE", &ffprobe)
        .env("CONCATX_FFMPEG", "false")
        .args(["concat", "a.mp4", "b.mp4", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ffmpeg failed with exit code 1"));
    assert!(output.exists());
}
