use std::fmt;

use crate::error::{AclError, Result};
use crate::perm::Perm;

const MODE_READ: u32 = 0o4;
const MODE_WRITE: u32 = 0o2;
const MODE_EXECUTE: u32 = 0o1;

/// Set of [`Perm`] flags carried by one ACL entry.
///
/// A `Permset` is a plain value. The copy embedded in an entry is edited
/// through [`PermsetMut`](crate::PermsetMut) or replaced wholesale with
/// [`EntryMut::set_permset`](crate::EntryMut::set_permset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Permset(u16);

impl Permset {
    /// Returns an empty permission set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Adds `perm` to the set. Adding a present permission is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`AclError::InvalidArgument`] when the platform cannot
    /// store `perm`.
    pub fn add_perm(&mut self, perm: Perm) -> Result<()> {
        if !perm.is_supported() {
            return Err(AclError::invalid_argument(
                "add_perm",
                format!("{perm} is not supported on this platform"),
            ));
        }
        self.0 |= perm.bit();
        Ok(())
    }

    /// Removes `perm` from the set.
    pub fn remove_perm(&mut self, perm: Perm) {
        self.0 &= !perm.bit();
    }

    /// Removes every permission.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` when `perm` is present.
    #[must_use]
    pub const fn contains(&self, perm: Perm) -> bool {
        self.0 & perm.bit() != 0
    }

    /// Returns `true` when no permission is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the present permissions in canonical table order.
    pub fn iter(&self) -> impl Iterator<Item = Perm> + '_ {
        Perm::ALL.into_iter().filter(|perm| self.contains(*perm))
    }

    /// Builds a set from an `rwx` triple encoded as `r=4, w=2, x=1`.
    ///
    /// Bits above the triple are ignored.
    #[must_use]
    pub const fn from_mode_bits(bits: u32) -> Self {
        let mut set = 0;
        if bits & MODE_READ != 0 {
            set |= Perm::Read.bit();
        }
        if bits & MODE_WRITE != 0 {
            set |= Perm::Write.bit();
        }
        if bits & MODE_EXECUTE != 0 {
            set |= Perm::Execute.bit();
        }
        Self(set)
    }

    /// Returns the `rwx` triple of this set; other permissions are dropped.
    #[must_use]
    pub const fn mode_bits(&self) -> u32 {
        let mut bits = 0;
        if self.contains(Perm::Read) {
            bits |= MODE_READ;
        }
        if self.contains(Perm::Write) {
            bits |= MODE_WRITE;
        }
        if self.contains(Perm::Execute) {
            bits |= MODE_EXECUTE;
        }
        bits
    }

    /// Renders the `rwx` triple as `ls`-style text, e.g. `rw-`.
    #[must_use]
    pub fn mode_string(&self) -> String {
        format!(
            "{}{}{}",
            if self.contains(Perm::Read) { 'r' } else { '-' },
            if self.contains(Perm::Write) { 'w' } else { '-' },
            if self.contains(Perm::Execute) { 'x' } else { '-' }
        )
    }

    /// Returns `true` when every present permission is part of the `rwx` triple.
    #[must_use]
    pub fn is_mode_only(&self) -> bool {
        self.iter().all(Perm::is_mode_perm)
    }

    pub(crate) const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub(crate) const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl FromIterator<Perm> for Permset {
    /// Collects permissions without the platform check; callers committing
    /// the result still go through entry validation.
    fn from_iter<I: IntoIterator<Item = Perm>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |acc, perm| acc | perm.bit()))
    }
}

impl fmt::Display for Permset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, perm) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(perm.name())?;
        }
        Ok(())
    }
}
