use std::io::{self, Write};
use std::path::Path;

use acl::{Acl, AclType};

/// Prints every ACL category of `path` that the platform can read.
///
/// Categories that fail are reported on `stderr` and skipped.
pub(crate) fn show<Out, Err>(path: &Path, stdout: &mut Out, stderr: &mut Err) -> io::Result<()>
where
    Out: Write,
    Err: Write,
{
    for category in [AclType::Access, AclType::Extended] {
        let loaded = match category {
            AclType::Access => Acl::get_file_access(path),
            AclType::Default => Acl::get_file_default(path),
            AclType::Extended => Acl::get_file_extended(path),
        };
        match loaded {
            Ok(acl) => {
                write!(stdout, "ACL repr:\n{acl}")?;
                acl.free();
            }
            Err(error) => {
                tracing::debug!(path = %path.display(), %category, %error, "skipping ACL category");
                writeln!(
                    stderr,
                    "Failed to get {} from {} ({error})",
                    label(category),
                    path.display()
                )?;
            }
        }
    }
    Ok(())
}

const fn label(category: AclType) -> &'static str {
    match category {
        AclType::Extended => "extended ACL",
        AclType::Default => "default ACL",
        AclType::Access => "ACL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_both_categories_and_succeeds() {
        let tree = test_support::ScratchTree::new().expect("tree");
        let missing = tree.missing("absent");
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        show(&missing, &mut stdout, &mut stderr).expect("show");

        let errors = String::from_utf8(stderr).expect("utf8");
        assert!(errors.contains("Failed to get ACL from"), "{errors}");
        assert!(errors.contains("Failed to get extended ACL from"), "{errors}");
        assert!(stdout.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn access_acl_is_printed_on_linux() {
        let tree = test_support::ScratchTree::new().expect("tree");
        let file = tree.file("plain", b"data", 0o640).expect("file");
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        show(&file, &mut stdout, &mut stderr).expect("show");

        let output = String::from_utf8(stdout).expect("utf8");
        let errors = String::from_utf8(stderr).expect("utf8");
        if errors.contains("Failed to get ACL from") {
            eprintln!("skipping: filesystem lacks POSIX ACL support: {errors}");
            return;
        }
        assert_eq!(output, "ACL repr:\nuser::rw-\ngroup::r--\nother::---\n");
        assert!(errors.contains(acl::EXTENDED_UNSUPPORTED), "{errors}");
    }
}
