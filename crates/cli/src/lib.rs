#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the `facl` command. Given a file it either prints the ACLs
//! the platform can read (`--show`) or grants a user a set of permissions
//! through the file's extended ACL, printing the ACL before and after.
//!
//! # Design
//!
//! [`run`] accepts the arguments together with handles for standard output and
//! error so the whole command can be driven from tests. A
//! [`clap`](https://docs.rs/clap/) builder parses the flags; the ACL work is
//! delegated to the [`acl`] crate, and the `-v` count configures tracing
//! through the [`logging`] crate.
//!
//! # Errors
//!
//! A missing FILE, a parse failure, or any ACL failure while patching exits
//! with code `1` and a diagnostic on standard error. In show mode failures are
//! reported per category and the command still exits with `0`.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = cli::run(["facl"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 1);
//! assert_eq!(String::from_utf8(stderr).unwrap(), "Missing filename\n");
//! ```

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use logging::VerbosityConfig;

mod command_builder;
mod patch;
mod show;

pub use patch::{PatchError, PatchOutcome, apply_grant, describe_extended, modify_or_add};

/// Exit code of a successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code of a failed run.
pub const EXIT_FAILURE: i32 = 1;

/// Runs the command with `arguments` (program name first) and returns the
/// process exit code.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let parsed = match command_builder::parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => {
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(stdout, "{error}").is_err() {
                        return EXIT_FAILURE;
                    }
                    EXIT_SUCCESS
                }
                _ => {
                    let _ = write!(stderr, "{error}");
                    EXIT_FAILURE
                }
            };
        }
    };

    logging::init_tracing(&VerbosityConfig::from_verbose_level(parsed.verbose));

    let Some(path) = parsed.file else {
        let _ = writeln!(stderr, "Missing filename");
        return EXIT_FAILURE;
    };

    if parsed.show {
        return match show::show(&path, stdout, stderr) {
            Ok(()) => EXIT_SUCCESS,
            Err(_) => EXIT_FAILURE,
        };
    }

    let before = match patch::describe_extended(&path) {
        Ok(before) => before,
        Err(error) => return report_patch_error(stderr, &error),
    };
    if writeln!(stdout, "Before: {before}").is_err() {
        return EXIT_FAILURE;
    }

    let result = patch::modify_or_add(&path, parsed.uid, &parsed.perms)
        .and_then(|_| patch::describe_extended(&path));
    match result {
        Ok(after) => {
            if writeln!(stdout, "After: {after}").is_err() {
                return EXIT_FAILURE;
            }
            EXIT_SUCCESS
        }
        Err(error) => report_patch_error(stderr, &error),
    }
}

fn report_patch_error<Err: Write>(stderr: &mut Err, error: &PatchError) -> i32 {
    tracing::debug!(error = ?error.acl_error(), "patch failed");
    let _ = writeln!(stderr, "{}: {error}", command_builder::PROGRAM_NAME);
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(args: &[&str]) -> (i32, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(args.iter().copied(), &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).expect("utf8 stdout"),
            String::from_utf8(stderr).expect("utf8 stderr"),
        )
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn missing_filename_exits_with_one() {
        let (code, stdout, stderr) = run_with(&["facl"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(stdout.is_empty());
        assert_eq!(stderr, "Missing filename\n");
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, stdout, stderr) = run_with(&["facl", "--help"]);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(stdout.contains("--uid"), "{stdout}");
        assert!(stderr.is_empty());
    }

    #[test]
    fn help_on_a_closed_stdout_fails() {
        let mut stderr = Vec::new();
        let code = run(["facl", "--help"], &mut ClosedPipe, &mut stderr);
        assert_eq!(code, EXIT_FAILURE);
    }

    #[test]
    fn bad_flag_exits_with_one() {
        let (code, _, stderr) = run_with(&["facl", "--bogus", "file"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(stderr.contains("--bogus"), "{stderr}");
    }

    #[test]
    fn show_mode_never_fails_on_acl_errors() {
        let tree = test_support::ScratchTree::new().expect("tree");
        let missing = tree.missing("absent");
        let path = missing.to_str().expect("utf8 path");
        let (code, _, stderr) = run_with(&["facl", "--show", path]);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(stderr.contains("Failed to get extended ACL"), "{stderr}");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn patch_mode_fails_without_extended_acls() {
        let tree = test_support::ScratchTree::new().expect("tree");
        let file = tree.file("target", b"data", 0o644).expect("file");
        let path = file.to_str().expect("utf8 path");
        let (code, stdout, stderr) = run_with(&["facl", "--perm", "Read", path]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(stdout.is_empty());
        assert!(stderr.starts_with("facl: getting extended ACL from"), "{stderr}");
        assert!(stderr.contains(acl::EXTENDED_UNSUPPORTED), "{stderr}");
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn closed_stdout_stops_before_patching() {
        let tree = test_support::ScratchTree::new().expect("tree");
        let file = tree.file("target", b"data", 0o644).expect("file");
        let path = file.to_str().expect("utf8 path");
        let mut stderr = Vec::new();

        let code = run(["facl", path], &mut ClosedPipe, &mut stderr);

        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(patch::describe_extended(&file).expect("describe"), "<none>");
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn patch_mode_prints_before_and_after() {
        use std::os::unix::fs::MetadataExt;

        let tree = test_support::ScratchTree::new().expect("tree");
        let file = tree.file("target", b"data", 0o644).expect("file");
        let uid = std::fs::metadata(&file).expect("metadata").uid().to_string();
        let path = file.to_str().expect("utf8 path");
        let (code, stdout, stderr) = run_with(&["facl", "--uid", &uid, path]);
        assert_eq!(code, EXIT_SUCCESS, "{stderr}");
        assert_eq!(
            stdout,
            format!(
                "Before: <none>\nAfter: allow:user:{uid}:ReadExtAttributes, WriteExtAttributes\n"
            )
        );
    }
}
