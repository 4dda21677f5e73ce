use std::io;
use std::path::{Path, PathBuf};

use crate::AclType;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AclError>;

/// Error produced when reading, editing, or committing an ACL fails.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    /// The operating system rejected an ACL call.
    #[error("failed to {context} '{}': {source}", path.display())]
    Io {
        /// Operation being performed when the error occurred.
        context: &'static str,
        /// Path involved in the failing operation.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The path carries no ACL of the requested category.
    #[error("no {category} ACL on '{}'", path.display())]
    NotFound {
        /// Category that was requested.
        category: AclType,
        /// Path that was queried.
        path: PathBuf,
    },

    /// The requested ACL category does not exist on this platform.
    #[error("{0}")]
    Unsupported(&'static str),

    /// A tag, qualifier, or permission was rejected for the entry it targets.
    #[error("{operation}: {reason}")]
    InvalidArgument {
        /// Name of the rejecting operation.
        operation: &'static str,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A numeric id could not be mapped to or from the platform identity token.
    #[error("{operation}({id}): {message}")]
    Identity {
        /// Name of the resolving call.
        operation: &'static str,
        /// Numeric id being resolved.
        id: u32,
        /// Message reported by the platform.
        message: String,
    },

    /// The ACL does not satisfy the structural rules of its category.
    #[error("invalid ACL: {0}")]
    Invalid(String),

    /// Textual ACL input could not be parsed.
    #[error("malformed ACL entry '{entry}': {reason}")]
    Parse {
        /// Offending entry text.
        entry: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A stored ACL blob did not match the expected layout.
    #[error("malformed ACL attribute: {reason}")]
    Decode {
        /// What was wrong with the blob.
        reason: String,
    },
}

impl AclError {
    pub(crate) fn io(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_argument(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(entry: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            entry: entry.to_owned(),
            reason: reason.into(),
        }
    }

    /// Maps an OS error to [`AclError::NotFound`] when it reports `ENOENT`,
    /// otherwise wraps it as [`AclError::Io`].
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub(crate) fn from_os(
        context: &'static str,
        category: AclType,
        path: &Path,
        source: io::Error,
    ) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                category,
                path: path.to_path_buf(),
            }
        } else {
            Self::io(context, path, source)
        }
    }

    /// Returns `true` when the path has no ACL of the requested category, so
    /// callers can build a fresh one instead of failing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` when either the platform or the filesystem lacks ACL
    /// support for the requested category.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::Unsupported(_) => true,
            Self::Io { source, .. } => is_unsupported_os_error(source),
            _ => false,
        }
    }

    /// Returns the underlying OS error, if any.
    #[must_use]
    pub const fn os_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(unix)]
fn is_unsupported_os_error(error: &io::Error) -> bool {
    matches!(error.raw_os_error(), Some(code) if code == libc::ENOTSUP || code == libc::EOPNOTSUPP)
        || error.kind() == io::ErrorKind::Unsupported
}

#[cfg(not(unix))]
fn is_unsupported_os_error(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::Unsupported
}
