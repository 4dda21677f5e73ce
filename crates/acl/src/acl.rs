//! # Overview
//!
//! [`Acl`] is the in-memory mirror of one filesystem ACL. It owns an ordered
//! arena of [`AclEntry`] records, a restartable entry cursor, and the state of
//! its round trip through the filesystem.
//!
//! # Design
//!
//! Loading copies the OS representation into the arena; committing rebuilds
//! the OS representation from it. Every edit in between is local, and OS
//! handles never escape a backend call. Entries are reached through borrowed
//! views ([`Entry`], [`EntryMut`]), so a released ACL cannot be touched.
//!
//! # Invariants
//!
//! - Entries keep insertion order (or the order the OS reported on load).
//! - The cursor only moves through [`Acl::first_entry`] and
//!   [`Acl::next_entry`]; both need `&mut self`, so two cursors can never
//!   run over the same instance at once. [`Acl::iter`] gives independent
//!   read-only passes.

use std::fmt;
use std::path::Path;

use crate::backend::{AccessAclSupport, ExtendedAclSupport, PlatformAccess, PlatformExtended};
use crate::entry::{AclEntry, Entry, EntryMut};
use crate::error::{AclError, Result};
use crate::flags::AclFlags;
use crate::permset::Permset;
use crate::qualifier::Qualifier;
use crate::tag::Tag;
use crate::text;

/// Category of ACL attached to a filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclType {
    /// POSIX access ACL consulted on every access check.
    Access,
    /// POSIX default ACL inherited by objects created inside a directory.
    Default,
    /// Darwin extended ACL.
    Extended,
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Access => "access",
            Self::Default => "default",
            Self::Extended => "extended",
        })
    }
}

/// Lifecycle position of an [`Acl`].
///
/// Release is not a state: [`Acl::free`] consumes the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclState {
    /// Created empty and not yet tied to any file.
    Unbound,
    /// Read from a file.
    Loaded,
    /// Entries were added locally.
    Populated,
    /// Written back to a file.
    Committed,
}

/// Ordered collection of ACL entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acl {
    pub(crate) entries: Vec<AclEntry>,
    flags: AclFlags,
    cursor: usize,
    state: AclState,
}

impl Default for Acl {
    fn default() -> Self {
        Self::new()
    }
}

impl Acl {
    /// Creates an empty ACL not associated with any file.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            flags: AclFlags::new(),
            cursor: 0,
            state: AclState::Unbound,
        }
    }

    /// Creates an empty ACL with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub(crate) fn loaded(entries: Vec<AclEntry>) -> Self {
        Self {
            entries,
            flags: AclFlags::new(),
            cursor: 0,
            state: AclState::Loaded,
        }
    }

    /// Builds the minimal POSIX ACL equivalent to the permission bits of `mode`.
    ///
    /// The result holds `user::`, `group::`, and `other::` entries and no
    /// mask. Bits above the permission triplets are ignored.
    #[must_use]
    pub fn from_mode(mode: u32) -> Self {
        let entries = vec![
            AclEntry::from_parts(
                Tag::UserObj,
                Qualifier::None,
                Permset::from_mode_bits(mode >> 6),
            ),
            AclEntry::from_parts(
                Tag::GroupObj,
                Qualifier::None,
                Permset::from_mode_bits(mode >> 3),
            ),
            AclEntry::from_parts(Tag::Other, Qualifier::None, Permset::from_mode_bits(mode)),
        ];
        Self {
            entries,
            flags: AclFlags::new(),
            cursor: 0,
            state: AclState::Populated,
        }
    }

    /// Creates a fresh ACL seeded with the platform's base entries for `path`.
    ///
    /// Where extended ACLs exist this is one allow entry for the owner derived
    /// from the owner mode bits; elsewhere the ACL starts empty.
    pub fn with_base_entries(path: &Path) -> Result<Self> {
        let mut acl = Self::new();
        PlatformExtended::default().add_base_entries(&mut acl, path)?;
        Ok(acl)
    }

    /// Parses the textual form produced by [`Acl::to_text`].
    pub fn from_text(input: &str) -> Result<Self> {
        let entries = text::parse(input)?;
        Ok(Self {
            entries,
            flags: AclFlags::new(),
            cursor: 0,
            state: AclState::Populated,
        })
    }

    /// Loads the access ACL of `path`.
    pub fn get_file_access(path: &Path) -> Result<Self> {
        PlatformAccess::default().get_file(path, AclType::Access)
    }

    /// Loads the default ACL of the directory at `path`.
    pub fn get_file_default(path: &Path) -> Result<Self> {
        PlatformAccess::default().get_file(path, AclType::Default)
    }

    /// Loads the extended ACL of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::NotFound`] when the file carries no extended ACL,
    /// and [`AclError::Unsupported`] on platforms without extended ACLs.
    pub fn get_file_extended(path: &Path) -> Result<Self> {
        PlatformExtended::default().get_file_extended(path)
    }

    /// Commits this ACL as the access ACL of `path`.
    pub fn set_file_access(&mut self, path: &Path) -> Result<()> {
        PlatformAccess::default().set_file(path, AclType::Access, self)?;
        self.state = AclState::Committed;
        Ok(())
    }

    /// Commits this ACL as the default ACL of the directory at `path`.
    ///
    /// Committing an empty ACL removes the default ACL.
    pub fn set_file_default(&mut self, path: &Path) -> Result<()> {
        PlatformAccess::default().set_file(path, AclType::Default, self)?;
        self.state = AclState::Committed;
        Ok(())
    }

    /// Removes the default ACL of the directory at `path`.
    pub fn delete_file_default(path: &Path) -> Result<()> {
        PlatformAccess::default().delete_default(path)
    }

    /// Commits this ACL as the extended ACL of `path`, replacing prior content.
    pub fn set_file_extended(&mut self, path: &Path) -> Result<()> {
        PlatformExtended::default().set_file_extended(path, self)?;
        self.state = AclState::Committed;
        Ok(())
    }

    /// Appends an undefined entry and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Fails when the ACL cannot hold more entries.
    pub fn create_entry(&mut self) -> Result<EntryMut<'_>> {
        if self.entries.len() >= u32::MAX as usize {
            return Err(AclError::invalid_argument(
                "create_entry",
                "entry count limit reached",
            ));
        }
        Ok(self.push_entry(AclEntry::new()))
    }

    /// Attaches a detached record at the end of the ACL.
    pub fn push_entry(&mut self, entry: AclEntry) -> EntryMut<'_> {
        self.entries.push(entry);
        if self.state == AclState::Unbound {
            self.state = AclState::Populated;
        }
        let index = self.entries.len() - 1;
        EntryMut::new(self, index)
    }

    /// Rewinds the cursor and returns the first entry.
    pub fn first_entry(&mut self) -> Option<EntryMut<'_>> {
        self.cursor = 0;
        self.next_entry()
    }

    /// Returns the entry under the cursor and advances it, or `None` once
    /// every entry has been visited.
    pub fn next_entry(&mut self) -> Option<EntryMut<'_>> {
        let index = self.cursor;
        if index >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(EntryMut::new(self, index))
    }

    /// Iterates over the entries without touching the cursor.
    pub fn iter(&self) -> Entries<'_> {
        Entries {
            inner: self.entries.iter().enumerate(),
        }
    }

    /// Returns the entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Entry<'_>> {
        self.entries
            .get(index)
            .map(|record| Entry::new(record, index))
    }

    /// Returns a mutable view of the entry at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<EntryMut<'_>> {
        if index < self.entries.len() {
            Some(EntryMut::new(self, index))
        } else {
            None
        }
    }

    /// Finds the first entry with the given tag and qualifier.
    pub fn find_mut(&mut self, tag: Tag, qualifier: Qualifier) -> Option<EntryMut<'_>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.tag() == tag && entry.bound_qualifier() == qualifier)?;
        Some(EntryMut::new(self, index))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the ACL holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ACL-wide inheritance flags.
    #[must_use]
    pub const fn flags(&self) -> AclFlags {
        self.flags
    }

    /// Replaces the ACL-wide inheritance flags.
    ///
    /// Only extended ACLs store them; [`Acl::validate`] rejects a POSIX ACL
    /// that carries any.
    pub fn set_flags(&mut self, flags: AclFlags) {
        self.flags = flags;
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> AclState {
        self.state
    }

    /// Releases the ACL. Dropping it has the same effect.
    pub fn free(self) {
        drop(self);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> AclEntry {
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.entries.remove(index)
    }

    /// Returns `true` when any entry is a Darwin extended entry.
    #[must_use]
    pub fn is_extended(&self) -> bool {
        self.entries.iter().any(|entry| entry.tag().is_extended())
    }

    /// Recomputes the mask entry as the union of the group class permissions.
    ///
    /// A mask is created when named user or group entries exist and none is
    /// present yet.
    pub fn calc_mask(&mut self) {
        let mut union = Permset::new();
        let mut needs_mask = false;
        for entry in &self.entries {
            match entry.tag() {
                Tag::User | Tag::Group => {
                    needs_mask = true;
                    union = union.union(entry.permset());
                }
                Tag::GroupObj => union = union.union(entry.permset()),
                _ => {}
            }
        }

        let mode_perms = Permset::from_mode_bits(0o7);
        let union = union.intersection(mode_perms);
        let mask = AclEntry::from_parts(Tag::Mask, Qualifier::None, union);
        let existing = self.entries.iter().position(|entry| entry.tag() == Tag::Mask);
        if let Some(index) = existing {
            self.entries[index] = mask;
        } else if needs_mask {
            self.push_entry(mask);
        }
    }

    /// Checks the structural rules of the ACL's category.
    ///
    /// ACLs holding extended entries must consist of allow/deny entries that
    /// each name a subject. All other ACLs must form a valid POSIX.1e ACL.
    pub fn validate(&self) -> Result<()> {
        if self.is_extended() {
            self.validate_extended()
        } else {
            self.validate_posix()
        }
    }

    pub(crate) fn validate_extended(&self) -> Result<()> {
        for entry in &self.entries {
            if !entry.tag().is_extended() {
                return Err(AclError::Invalid(format!(
                    "{} entry in an extended ACL",
                    entry.tag()
                )));
            }
            if entry.bound_qualifier().is_none() {
                return Err(AclError::Invalid(format!(
                    "{} entry without a qualifier",
                    entry.tag()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn validate_posix(&self) -> Result<()> {
        let mut user_obj = 0;
        let mut group_obj = 0;
        let mut other = 0;
        let mut mask = 0;
        let mut named = Vec::new();

        if !self.flags.is_empty() {
            return Err(AclError::Invalid(
                "inheritance flags on a POSIX ACL".to_owned(),
            ));
        }
        for entry in &self.entries {
            match entry.tag() {
                Tag::UserObj => user_obj += 1,
                Tag::GroupObj => group_obj += 1,
                Tag::Other => other += 1,
                Tag::Mask => mask += 1,
                Tag::User | Tag::Group => {
                    let qualifier = entry.bound_qualifier();
                    if qualifier.is_none() {
                        return Err(AclError::Invalid(format!(
                            "{} entry without a qualifier",
                            entry.tag()
                        )));
                    }
                    if named.contains(&qualifier) {
                        return Err(AclError::Invalid(format!("duplicate entry for {qualifier}")));
                    }
                    named.push(qualifier);
                }
                tag @ (Tag::Undefined | Tag::ExtendedAllow | Tag::ExtendedDeny) => {
                    return Err(AclError::Invalid(format!("{tag} entry in a POSIX ACL")));
                }
            }
        }

        for (count, label) in [
            (user_obj, "user::"),
            (group_obj, "group::"),
            (other, "other::"),
        ] {
            if count != 1 {
                return Err(AclError::Invalid(format!(
                    "expected exactly one {label} entry, found {count}"
                )));
            }
        }
        if mask > 1 {
            return Err(AclError::Invalid("more than one mask:: entry".to_owned()));
        }
        if mask == 0 && !named.is_empty() {
            return Err(AclError::Invalid(
                "named entries require a mask:: entry".to_owned(),
            ));
        }
        Ok(())
    }

    /// Renders the ACL in its textual form, one entry per line.
    ///
    /// Complete entries parse back with [`Acl::from_text`]. Entries that are
    /// still incomplete (undefined tag, missing qualifier) render as
    /// `undefined::`, `user:?:---`, or `allow::` and are rejected by the parser.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = Entry<'a>;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Independent iterator over the entries of an [`Acl`].
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, AclEntry>>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(index, record)| Entry::new(record, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}
