//! ACL entries and the views that expose them.
//!
//! An [`Acl`] owns its entries as [`AclEntry`] records. Callers reach them
//! through [`Entry`] and [`EntryMut`], which pair a position with a borrow of
//! the owning ACL, and through [`PermsetMut`] for in-place permission edits.
//! Because the views borrow the ACL they cannot outlive it.

use std::fmt;

use crate::acl::Acl;
use crate::error::{AclError, Result};
use crate::flags::EntryFlags;
use crate::perm::Perm;
use crate::permset::Permset;
use crate::qualifier::{ACL_UNDEFINED_ID, Qualifier};
use crate::tag::Tag;
use crate::text;

/// Owned `(tag, qualifier, permset)` record, plus the inheritance flags of
/// Darwin extended entries.
///
/// Records live inside an [`Acl`], or detached after [`Entry::copy`] until
/// [`Acl::push_entry`] attaches them to a target ACL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AclEntry {
    tag: Tag,
    qualifier: Qualifier,
    permset: Permset,
    flags: EntryFlags,
}

impl AclEntry {
    /// Returns a record with an undefined tag, no qualifier, and no permissions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tag: Tag::Undefined,
            qualifier: Qualifier::None,
            permset: Permset::new(),
            flags: EntryFlags::new(),
        }
    }

    /// Builds a fully populated record, applying the same checks as the setters.
    pub fn with(tag: Tag, qualifier: Qualifier, permset: Permset) -> Result<Self> {
        let mut entry = Self::new();
        entry.set_tag(tag)?;
        if !qualifier.is_none() {
            entry.set_qualifier(qualifier)?;
        }
        entry.set_permset(permset)?;
        Ok(entry)
    }

    /// Returns the entry kind.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Sets the entry kind.
    ///
    /// A bound qualifier that no longer fits the new kind is dropped, and so
    /// are inheritance flags when the new kind is not extended.
    ///
    /// # Errors
    ///
    /// Rejects [`Tag::Undefined`] and kinds that cannot carry the permissions
    /// already present.
    pub fn set_tag(&mut self, tag: Tag) -> Result<()> {
        if tag == Tag::Undefined {
            return Err(AclError::invalid_argument(
                "set_tag",
                "an entry cannot be reset to the undefined tag",
            ));
        }
        if let Some(perm) = self.permset.iter().find(|perm| !tag.accepts(*perm)) {
            return Err(AclError::invalid_argument(
                "set_tag",
                format!("{tag} entries cannot carry {perm}"),
            ));
        }
        self.tag = tag;
        if !qualifier_fits(tag, self.qualifier) {
            self.qualifier = Qualifier::None;
        }
        if !tag.is_extended() {
            self.flags = EntryFlags::new();
        }
        Ok(())
    }

    /// Returns the bound subject.
    ///
    /// # Errors
    ///
    /// Fails when the tag takes no qualifier or none has been bound.
    pub fn qualifier(&self) -> Result<Qualifier> {
        if !self.tag.takes_qualifier() {
            return Err(AclError::invalid_argument(
                "get_qualifier",
                format!("{} entries have no qualifier", self.tag),
            ));
        }
        if self.qualifier.is_none() {
            return Err(AclError::invalid_argument(
                "get_qualifier",
                "no qualifier is set",
            ));
        }
        Ok(self.qualifier)
    }

    /// Binds the subject of the entry.
    ///
    /// Named user entries take a user, named group entries take a group, and
    /// Darwin's extended entries take either.
    pub fn set_qualifier(&mut self, qualifier: Qualifier) -> Result<()> {
        if !self.tag.takes_qualifier() {
            return Err(AclError::invalid_argument(
                "set_qualifier",
                format!("{} entries do not take a qualifier", self.tag),
            ));
        }
        let Some(id) = qualifier.id() else {
            return Err(AclError::invalid_argument(
                "set_qualifier",
                "a qualifier needs a user or group id",
            ));
        };
        if id == ACL_UNDEFINED_ID {
            return Err(AclError::Identity {
                operation: "set_qualifier",
                id,
                message: "id does not name a user or group".to_owned(),
            });
        }
        if !qualifier_fits(self.tag, qualifier) {
            return Err(AclError::invalid_argument(
                "set_qualifier",
                format!("{} entries cannot name {qualifier}", self.tag),
            ));
        }
        self.qualifier = qualifier;
        Ok(())
    }

    /// Binds a numeric id, reading it as a group for [`Tag::Group`] and as a
    /// user otherwise.
    pub fn set_qualifier_id(&mut self, id: u32) -> Result<()> {
        let qualifier = if self.tag == Tag::Group {
            Qualifier::Group(id)
        } else {
            Qualifier::User(id)
        };
        self.set_qualifier(qualifier)
    }

    /// Returns a copy of the permission set.
    #[must_use]
    pub const fn permset(&self) -> Permset {
        self.permset
    }

    /// Replaces the permission set.
    ///
    /// # Errors
    ///
    /// Rejects permissions the tag cannot carry.
    pub fn set_permset(&mut self, permset: Permset) -> Result<()> {
        if let Some(perm) = permset.iter().find(|perm| !self.tag.accepts(*perm)) {
            return Err(AclError::invalid_argument(
                "set_permset",
                format!("{} entries cannot carry {perm}", self.tag),
            ));
        }
        self.permset = permset;
        Ok(())
    }

    /// Adds one permission, checking it against the tag and the platform.
    pub fn add_perm(&mut self, perm: Perm) -> Result<()> {
        if !self.tag.accepts(perm) {
            return Err(AclError::invalid_argument(
                "add_perm",
                format!("{} entries cannot carry {perm}", self.tag),
            ));
        }
        self.permset.add_perm(perm)
    }

    /// Returns the inheritance flags.
    #[must_use]
    pub const fn flags(&self) -> EntryFlags {
        self.flags
    }

    /// Replaces the inheritance flags.
    ///
    /// # Errors
    ///
    /// Only extended entries carry flags; other kinds reject a non-empty set.
    pub fn set_flags(&mut self, flags: EntryFlags) -> Result<()> {
        if !flags.is_empty() && !self.tag.is_extended() {
            return Err(AclError::invalid_argument(
                "set_flags",
                format!("{} entries do not carry inheritance flags", self.tag),
            ));
        }
        self.flags = flags;
        Ok(())
    }

    /// Raw qualifier, without the tag checks of [`AclEntry::qualifier`].
    pub(crate) const fn bound_qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Builds a record from trusted backend data.
    pub(crate) const fn from_parts(tag: Tag, qualifier: Qualifier, permset: Permset) -> Self {
        Self {
            tag,
            qualifier,
            permset,
            flags: EntryFlags::new(),
        }
    }

    /// Attaches flags read from the OS without re-checking the tag.
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub(crate) const fn with_native_flags(mut self, flags: EntryFlags) -> Self {
        self.flags = flags;
        self
    }
}

const fn qualifier_fits(tag: Tag, qualifier: Qualifier) -> bool {
    match (tag, qualifier) {
        (_, Qualifier::None) => true,
        (Tag::User, Qualifier::User(_)) | (Tag::Group, Qualifier::Group(_)) => true,
        (Tag::ExtendedAllow | Tag::ExtendedDeny, _) => true,
        _ => false,
    }
}

impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        text::write_entry(f, self)
    }
}

/// Read-only view of an entry inside an [`Acl`].
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    record: &'a AclEntry,
    index: usize,
}

impl<'a> Entry<'a> {
    pub(crate) const fn new(record: &'a AclEntry, index: usize) -> Self {
        Self { record, index }
    }

    /// Position of the entry within its ACL.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the entry kind.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.record.tag()
    }

    /// Returns the bound subject; see [`AclEntry::qualifier`].
    pub fn qualifier(&self) -> Result<Qualifier> {
        self.record.qualifier()
    }

    /// Returns a copy of the permission set.
    #[must_use]
    pub const fn permset(&self) -> Permset {
        self.record.permset()
    }

    /// Returns the inheritance flags.
    #[must_use]
    pub const fn flags(&self) -> EntryFlags {
        self.record.flags()
    }

    /// Duplicates the entry into a record not attached to any ACL.
    #[must_use]
    pub const fn copy(&self) -> AclEntry {
        *self.record
    }

    /// Borrows the underlying record.
    #[must_use]
    pub const fn record(&self) -> &'a AclEntry {
        self.record
    }
}

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.record, f)
    }
}

/// Mutable view of an entry inside an [`Acl`].
#[derive(Debug)]
pub struct EntryMut<'a> {
    acl: &'a mut Acl,
    index: usize,
}

impl<'a> EntryMut<'a> {
    pub(crate) fn new(acl: &'a mut Acl, index: usize) -> Self {
        debug_assert!(index < acl.len());
        Self { acl, index }
    }

    fn record(&self) -> &AclEntry {
        &self.acl.entries[self.index]
    }

    fn record_mut(&mut self) -> &mut AclEntry {
        &mut self.acl.entries[self.index]
    }

    /// Position of the entry within its ACL.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the entry kind.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.record().tag()
    }

    /// Sets the entry kind; see [`AclEntry::set_tag`].
    pub fn set_tag(&mut self, tag: Tag) -> Result<()> {
        self.record_mut().set_tag(tag)
    }

    /// Returns the bound subject; see [`AclEntry::qualifier`].
    pub fn qualifier(&self) -> Result<Qualifier> {
        self.record().qualifier()
    }

    /// Binds the subject; see [`AclEntry::set_qualifier`].
    pub fn set_qualifier(&mut self, qualifier: Qualifier) -> Result<()> {
        self.record_mut().set_qualifier(qualifier)
    }

    /// Binds a numeric id; see [`AclEntry::set_qualifier_id`].
    pub fn set_qualifier_id(&mut self, id: u32) -> Result<()> {
        self.record_mut().set_qualifier_id(id)
    }

    /// Returns a copy of the permission set.
    #[must_use]
    pub fn permset(&self) -> Permset {
        self.record().permset()
    }

    /// Returns a live handle that edits the entry's permissions in place.
    pub fn permset_mut(&mut self) -> PermsetMut<'_> {
        PermsetMut {
            entry: self.record_mut(),
        }
    }

    /// Replaces the permission set; see [`AclEntry::set_permset`].
    pub fn set_permset(&mut self, permset: Permset) -> Result<()> {
        self.record_mut().set_permset(permset)
    }

    /// Returns the inheritance flags.
    #[must_use]
    pub fn flags(&self) -> EntryFlags {
        self.record().flags()
    }

    /// Replaces the inheritance flags; see [`AclEntry::set_flags`].
    pub fn set_flags(&mut self, flags: EntryFlags) -> Result<()> {
        self.record_mut().set_flags(flags)
    }

    /// Duplicates the entry into a record not attached to any ACL.
    #[must_use]
    pub fn copy(&self) -> AclEntry {
        *self.record()
    }

    /// Overwrites this entry with the contents of `source`.
    pub fn copy_from(&mut self, source: &AclEntry) {
        *self.record_mut() = *source;
    }

    /// Removes the entry from its ACL and returns the detached record.
    pub fn remove(self) -> AclEntry {
        self.acl.remove_at(self.index)
    }

    /// Downgrades to a read-only view.
    #[must_use]
    pub fn as_entry(&self) -> Entry<'_> {
        Entry::new(self.record(), self.index)
    }
}

impl fmt::Display for EntryMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.record(), f)
    }
}

/// Live handle on the permission set embedded in an entry.
#[derive(Debug)]
pub struct PermsetMut<'a> {
    entry: &'a mut AclEntry,
}

impl PermsetMut<'_> {
    /// Adds one permission; see [`AclEntry::add_perm`].
    pub fn add_perm(&mut self, perm: Perm) -> Result<()> {
        self.entry.add_perm(perm)
    }

    /// Removes every permission.
    pub fn clear_perms(&mut self) {
        self.entry.permset.clear();
    }

    /// Removes one permission.
    pub fn remove_perm(&mut self, perm: Perm) {
        self.entry.permset.remove_perm(perm);
    }

    /// Returns `true` when `perm` is present.
    #[must_use]
    pub fn contains(&self, perm: Perm) -> bool {
        self.entry.permset.contains(perm)
    }

    /// Returns a copy of the current set.
    #[must_use]
    pub fn get(&self) -> Permset {
        self.entry.permset
    }
}

impl fmt::Display for PermsetMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entry.permset, f)
    }
}
