//! End-to-end tests of the `facl` binary.
//!
//! | Code | Meaning                                     |
//! |------|---------------------------------------------|
//! |  0   | Success, or show mode with per-ACL warnings |
//! |  1   | Usage error or failed ACL update            |

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;

fn facl() -> Command {
    Command::cargo_bin("facl").expect("facl binary must be available")
}

fn scratch_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"payload").expect("write scratch file");
    path
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn missing_filename_is_a_usage_error() {
    let output = facl().output().expect("run facl");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("Missing filename"));
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_permission_is_a_usage_error() {
    let output = facl()
        .args(["--perm", "Teleport", "file"])
        .output()
        .expect("run facl");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("Teleport"));
}

#[test]
fn help_lists_the_flags() {
    let output = facl().arg("--help").output().expect("run facl");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--uid", "--perm", "--show", "--verbose"] {
        assert!(stdout.contains(flag), "help is missing {flag}:\n{stdout}");
    }
}

#[test]
fn show_mode_exits_zero_even_when_reads_fail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = facl()
        .arg("--show")
        .arg(dir.path().join("does-not-exist"))
        .output()
        .expect("run facl");
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("Failed to get extended ACL"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn patch_mode_reports_missing_extended_support() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = scratch_file(&dir, "target");
    let output = facl().arg(&file).output().expect("run facl");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr_of(&output).contains(acl::EXTENDED_UNSUPPORTED));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn verbose_flags_do_not_change_the_outcome() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = scratch_file(&dir, "target");
    let output = facl().arg("-vvv").arg(&file).output().expect("run facl");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains(acl::EXTENDED_UNSUPPORTED));
}

#[cfg(target_os = "macos")]
#[test]
fn patch_mode_creates_then_augments_the_owner_entry() {
    use std::os::unix::fs::MetadataExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let file = scratch_file(&dir, "target");
    let uid = fs::metadata(&file).expect("metadata").uid().to_string();

    let first = facl()
        .args(["--uid", &uid, "--perm", "Read"])
        .arg(&file)
        .output()
        .expect("run facl");
    assert!(first.status.success(), "{}", stderr_of(&first));
    assert_eq!(
        String::from_utf8_lossy(&first.stdout),
        format!("Before: <none>\nAfter: allow:user:{uid}:Read\n")
    );

    let second = facl()
        .args(["--uid", &uid, "--perm", "Write"])
        .arg(&file)
        .output()
        .expect("run facl");
    assert!(second.status.success(), "{}", stderr_of(&second));
    assert_eq!(
        String::from_utf8_lossy(&second.stdout),
        format!("Before: allow:user:{uid}:Read\nAfter: allow:user:{uid}:Read, Write\n")
    );

    let acl = acl::Acl::get_file_extended(&file).expect("reload");
    assert_eq!(acl.len(), 1);
}
