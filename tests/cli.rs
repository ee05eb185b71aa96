use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_config(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp config");
    tmp.write_all(xml.as_bytes()).expect("write config");
    tmp
}

#[test]
fn summary_run_spins_default_star() {
    let mut cmd = Command::cargo_bin("shape-scene").expect("binary exists");
    cmd.arg("--summary-only").arg("--frames").arg("100");
    cmd.assert()
        .success()
        .stdout(contains("Loaded star scene with 4 nodes"))
        .stdout(contains(" - Camera"))
        .stdout(contains(" - Ambient"))
        .stdout(contains(" - Sun"))
        .stdout(contains("Mesh Star: 60 vertices, 36 triangles"))
        .stdout(contains("Viewport 1280x720 (aspect 1.778)"))
        .stdout(contains("Final rotation: 1.00 rad"))
        .stdout(contains("Rendered 100 frame(s)"));
}

#[test]
fn shape_flag_overrides_config_file() {
    let config = write_config(
        r#"<config>
  <shape>star</shape>
  <width>800</width>
  <height>800</height>
</config>
"#,
    );
    let mut cmd = Command::cargo_bin("shape-scene").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .arg("--shape")
        .arg("hexagon")
        .arg("--summary-only")
        .arg("--frames")
        .arg("0");
    cmd.assert()
        .success()
        .stdout(contains("Loaded hexagon scene with 4 nodes"))
        .stdout(contains("Mesh Hexagon: 36 vertices, 20 triangles"))
        .stdout(contains("Viewport 800x800 (aspect 1.000)"))
        .stdout(contains("Final rotation: 0.00 rad"))
        .stdout(contains("Rendered 0 frame(s)"));
}

#[test]
fn invalid_outline_fails_with_reason() {
    let config = write_config("<config><points>2</points></config>");
    let mut cmd = Command::cargo_bin("shape-scene").expect("binary exists");
    cmd.arg("--config").arg(config.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("Error:"))
        .stderr(contains("at least 3"));
}

#[test]
fn unknown_argument_is_rejected() {
    let mut cmd = Command::cargo_bin("shape-scene").expect("binary exists");
    cmd.arg("--bogus");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --bogus"));
}
