use std::fmt;

use crate::perm::Perm;

/// Kind of an ACL entry.
///
/// `ExtendedAllow` and `ExtendedDeny` are Darwin's extended entries; the
/// remaining kinds form the POSIX.1e model used by Linux and FreeBSD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Freshly created entry whose kind has not been set.
    #[default]
    Undefined,
    /// Darwin entry granting permissions to a user or group.
    ExtendedAllow,
    /// Darwin entry denying permissions to a user or group.
    ExtendedDeny,
    /// Owning user of the file.
    UserObj,
    /// Named user.
    User,
    /// Owning group of the file.
    GroupObj,
    /// Named group.
    Group,
    /// Upper bound for the group class.
    Mask,
    /// Everyone not matched by another entry.
    Other,
}

impl Tag {
    /// Returns `true` when entries of this kind name a subject.
    #[must_use]
    pub const fn takes_qualifier(self) -> bool {
        matches!(
            self,
            Self::User | Self::Group | Self::ExtendedAllow | Self::ExtendedDeny
        )
    }

    /// Returns `true` for Darwin's extended allow/deny kinds.
    #[must_use]
    pub const fn is_extended(self) -> bool {
        matches!(self, Self::ExtendedAllow | Self::ExtendedDeny)
    }

    /// Returns `true` for the POSIX.1e kinds.
    #[must_use]
    pub const fn is_posix(self) -> bool {
        matches!(
            self,
            Self::UserObj | Self::User | Self::GroupObj | Self::Group | Self::Mask | Self::Other
        )
    }

    /// Returns `true` when an entry of this kind can carry `perm`.
    ///
    /// POSIX entries only know the read/write/execute triple.
    #[must_use]
    pub fn accepts(self, perm: Perm) -> bool {
        if self.is_posix() {
            perm.is_mode_perm()
        } else {
            perm.is_supported()
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::ExtendedAllow => "allow",
            Self::ExtendedDeny => "deny",
            Self::UserObj | Self::User => "user",
            Self::GroupObj | Self::Group => "group",
            Self::Mask => "mask",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Undefined => "undefined",
            Self::ExtendedAllow => "extended-allow",
            Self::ExtendedDeny => "extended-deny",
            Self::UserObj => "user-obj",
            Self::User => "user",
            Self::GroupObj => "group-obj",
            Self::Group => "group",
            Self::Mask => "mask",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifier_bearing_tags() {
        assert!(Tag::User.takes_qualifier());
        assert!(Tag::Group.takes_qualifier());
        assert!(Tag::ExtendedAllow.takes_qualifier());
        assert!(Tag::ExtendedDeny.takes_qualifier());
        for tag in [Tag::Undefined, Tag::UserObj, Tag::GroupObj, Tag::Mask, Tag::Other] {
            assert!(!tag.takes_qualifier(), "{tag}");
        }
    }

    #[test]
    fn families_are_disjoint() {
        assert!(Tag::ExtendedDeny.is_extended());
        assert!(!Tag::ExtendedDeny.is_posix());
        assert!(Tag::Mask.is_posix());
        assert!(!Tag::Undefined.is_posix());
        assert!(!Tag::Undefined.is_extended());
    }

    #[test]
    fn posix_tags_only_accept_mode_perms() {
        assert!(Tag::UserObj.accepts(Perm::Execute));
        assert!(!Tag::UserObj.accepts(Perm::Delete));
        assert!(Tag::ExtendedAllow.accepts(Perm::Read));
    }
}
