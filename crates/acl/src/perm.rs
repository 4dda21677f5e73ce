//! Atomic ACL permissions and the per-platform capability table.
//!
//! Darwin exposes the full NFSv4-flavoured permission vocabulary through its
//! extended ACLs. Every other platform only understands the three permission
//! bits derived from the file mode, so the remaining permissions are rejected
//! there before any OS call is made.

use std::fmt;
use std::str::FromStr;

use crate::error::AclError;

/// One atomic permission that an ACL entry can grant or deny.
///
/// Variants are declared in canonical table order; [`Permset`](crate::Permset)
/// renders its contents in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Perm {
    /// Read file data.
    Read = 0,
    /// Write file data.
    Write = 1,
    /// Execute the file.
    Execute = 2,
    /// Delete the object itself.
    Delete = 3,
    /// Append to file data.
    Append = 4,
    /// Delete an entry within a directory.
    DeleteChild = 5,
    /// Read basic attributes.
    ReadAttributes = 6,
    /// Write basic attributes.
    WriteAttributes = 7,
    /// Read extended attributes.
    ReadExtAttributes = 8,
    /// Write extended attributes.
    WriteExtAttributes = 9,
    /// Read the ACL itself.
    ReadSecurity = 10,
    /// Write the ACL itself.
    WriteSecurity = 11,
    /// Change the owner.
    ChangeOwner = 12,
    /// Synchronize on the object.
    Synchronize = 13,
}

/// Permissions understood on platforms whose ACLs derive from mode bits.
const MODE_PERMS: [Perm; 3] = [Perm::Read, Perm::Write, Perm::Execute];

#[cfg(target_os = "macos")]
const SUPPORTED: &[Perm] = &Perm::ALL;

#[cfg(not(target_os = "macos"))]
const SUPPORTED: &[Perm] = &MODE_PERMS;

impl Perm {
    /// Canonical table of every permission, in rendering order.
    pub const ALL: [Self; 14] = [
        Self::Read,
        Self::Write,
        Self::Execute,
        Self::Delete,
        Self::Append,
        Self::DeleteChild,
        Self::ReadAttributes,
        Self::WriteAttributes,
        Self::ReadExtAttributes,
        Self::WriteExtAttributes,
        Self::ReadSecurity,
        Self::WriteSecurity,
        Self::ChangeOwner,
        Self::Synchronize,
    ];

    /// Directory spelling of [`Perm::Read`].
    pub const LIST_DIRECTORY: Self = Self::Read;
    /// Directory spelling of [`Perm::Write`].
    pub const ADD_FILE: Self = Self::Write;
    /// Directory spelling of [`Perm::Execute`].
    pub const SEARCH: Self = Self::Execute;
    /// Directory spelling of [`Perm::Append`].
    pub const ADD_SUBDIRECTORY: Self = Self::Append;

    /// Returns the human-readable name used in textual renderings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Execute => "Execute",
            Self::Delete => "Delete",
            Self::Append => "Append",
            Self::DeleteChild => "DeleteChild",
            Self::ReadAttributes => "ReadAttributes",
            Self::WriteAttributes => "WriteAttributes",
            Self::ReadExtAttributes => "ReadExtAttributes",
            Self::WriteExtAttributes => "WriteExtAttributes",
            Self::ReadSecurity => "ReadSecurity",
            Self::WriteSecurity => "WriteSecurity",
            Self::ChangeOwner => "ChangeOwner",
            Self::Synchronize => "Synchronize",
        }
    }

    /// Bit occupied by this permission inside a [`Permset`](crate::Permset).
    #[must_use]
    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u8)
    }

    /// Permissions the current platform can store.
    #[must_use]
    pub fn supported() -> &'static [Self] {
        SUPPORTED
    }

    /// Returns `true` when the current platform can store this permission.
    #[must_use]
    pub fn is_supported(self) -> bool {
        SUPPORTED.contains(&self)
    }

    /// Returns `true` for the read/write/execute triple that maps onto mode bits.
    #[must_use]
    pub fn is_mode_perm(self) -> bool {
        MODE_PERMS.contains(&self)
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Perm {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|perm| perm.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AclError::parse(trimmed, "unknown permission name"))
    }
}
