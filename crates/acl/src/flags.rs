//! Inheritance flags of Darwin extended ACLs.
//!
//! Darwin tags every extended entry with a flag set that controls how the
//! entry propagates into new children of a directory, and the ACL itself with
//! a small set of ACL-wide flags. POSIX ACLs have neither, so both sets stay
//! empty on Linux.

use std::fmt;
use std::ops::BitOr;

use crate::error::{AclError, Result};

/// Inheritance flags of one extended entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntryFlags(u8);

impl EntryFlags {
    /// The entry was inherited from the parent directory.
    pub const INHERITED: Self = Self(1 << 0);
    /// New files created in the directory inherit the entry.
    pub const FILE_INHERIT: Self = Self(1 << 1);
    /// New directories created in the directory inherit the entry.
    pub const DIRECTORY_INHERIT: Self = Self(1 << 2);
    /// Inheritance stops after the first generation.
    pub const LIMIT_INHERIT: Self = Self(1 << 3);
    /// The entry only affects children, not the directory itself.
    pub const ONLY_INHERIT: Self = Self(1 << 4);

    /// Every flag with the name used in the text form, in rendering order.
    pub const ALL: [(Self, &'static str); 5] = [
        (Self::INHERITED, "inherited"),
        (Self::FILE_INHERIT, "file_inherit"),
        (Self::DIRECTORY_INHERIT, "directory_inherit"),
        (Self::LIMIT_INHERIT, "limit_inherit"),
        (Self::ONLY_INHERIT, "only_inherit"),
    ];

    /// Returns an empty flag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns `true` when every flag of `other` is present.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Adds the flags of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Removes the flags of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Returns `true` when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the single flags that are present.
    pub fn iter(self) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .map(|(flag, _)| flag)
            .filter(move |flag| self.contains(*flag))
    }

    pub(crate) fn parse(text: &str, names: &str) -> Result<Self> {
        let mut flags = Self::new();
        for name in names.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let Some((flag, _)) = Self::ALL
                .into_iter()
                .find(|(_, known)| known.eq_ignore_ascii_case(name))
            else {
                return Err(AclError::parse(text, format!("unknown entry flag '{name}'")));
            };
            flags.insert(flag);
        }
        Ok(flags)
    }
}

impl BitOr for EntryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for EntryFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Self::ALL {
            if self.contains(flag) {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Flags that apply to an extended ACL as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AclFlags(u8);

impl AclFlags {
    /// Inheritance into children is deferred until the ACL is next written.
    pub const DEFER_INHERIT: Self = Self(1 << 0);
    /// The object does not inherit entries from its parent.
    pub const NO_INHERIT: Self = Self(1 << 1);

    /// Every flag, in rendering order.
    pub const ALL: [Self; 2] = [Self::DEFER_INHERIT, Self::NO_INHERIT];

    /// Returns an empty flag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns `true` when every flag of `other` is present.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Adds the flags of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns `true` when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AclFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
