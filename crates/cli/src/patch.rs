//! Granting a user permissions through the extended ACL of a file.

use std::fmt;
use std::path::Path;

use acl::{Acl, AclError, Perm, Tag};
use tracing::{debug, info};

/// Failure of a patch step, with the step it happened in.
#[derive(Debug, thiserror::Error)]
#[error("{context}: {source}")]
pub struct PatchError {
    context: String,
    #[source]
    source: AclError,
}

impl PatchError {
    fn new(context: impl Into<String>, source: AclError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }

    /// Underlying ACL error.
    #[must_use]
    pub const fn acl_error(&self) -> &AclError {
        &self.source
    }
}

/// How a grant changed an ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// An existing allow entry for the user gained the permissions.
    Modified {
        /// Position of the updated entry.
        index: usize,
    },
    /// A new allow entry was appended.
    Added {
        /// Position of the new entry.
        index: usize,
    },
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modified { index } => write!(f, "modified entry {index}"),
            Self::Added { index } => write!(f, "added entry {index}"),
        }
    }
}

/// Adds `perms` to the first allow entry for `uid`, or appends one.
///
/// Walks the ACL with its entry cursor. Only `ExtendedAllow` entries whose
/// qualifier is the user `uid` match; group entries with the same numeric id
/// are left alone. Other entries, and their inheritance flags, are kept as
/// loaded.
///
/// # Errors
///
/// Fails when an allow entry has no readable qualifier, or when a
/// permission cannot be stored.
pub fn apply_grant(acl: &mut Acl, uid: u32, perms: &[Perm]) -> acl::Result<PatchOutcome> {
    let mut cursor = acl.first_entry();
    while let Some(mut entry) = cursor {
        let matches =
            entry.tag() == Tag::ExtendedAllow && entry.qualifier()?.uid() == Some(uid);
        if matches {
            let index = entry.index();
            let mut permset = entry.permset_mut();
            for perm in perms {
                permset.add_perm(*perm)?;
            }
            return Ok(PatchOutcome::Modified { index });
        }
        cursor = acl.next_entry();
    }

    let mut entry = acl.create_entry()?;
    entry.set_tag(Tag::ExtendedAllow)?;
    entry.set_qualifier_id(uid)?;
    let mut permset = entry.permset_mut();
    for perm in perms {
        permset.add_perm(*perm)?;
    }
    Ok(PatchOutcome::Added {
        index: entry.index(),
    })
}

/// Loads the extended ACL of `path`, grants `perms` to `uid`, and commits it.
///
/// A file without an extended ACL starts from an empty one.
pub fn modify_or_add(path: &Path, uid: u32, perms: &[Perm]) -> Result<PatchOutcome, PatchError> {
    let mut acl = match Acl::get_file_extended(path) {
        Ok(acl) => acl,
        Err(error) if error.is_not_found() => {
            debug!(path = %path.display(), "no extended ACL yet; starting empty");
            Acl::new()
        }
        Err(error) => {
            return Err(PatchError::new(
                format!("getting extended ACL from {}", path.display()),
                error,
            ));
        }
    };

    let outcome = apply_grant(&mut acl, uid, perms).map_err(|error| {
        PatchError::new(format!("granting uid {uid} on {}", path.display()), error)
    })?;
    acl.set_file_extended(path).map_err(|error| {
        PatchError::new(format!("setting extended ACLs on {}", path.display()), error)
    })?;
    info!(path = %path.display(), uid, %outcome, "patched extended ACL");
    Ok(outcome)
}

/// Renders the extended ACL of `path`, or `<none>` when it has none.
pub fn describe_extended(path: &Path) -> Result<String, PatchError> {
    match Acl::get_file_extended(path) {
        Ok(acl) => Ok(acl.to_text().trim_end().to_owned()),
        Err(error) if error.is_not_found() => Ok("<none>".to_owned()),
        Err(error) => Err(PatchError::new(
            format!("getting extended ACL from {}", path.display()),
            error,
        )),
    }
}
