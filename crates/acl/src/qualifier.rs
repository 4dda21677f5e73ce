use std::fmt;

/// Id reserved by POSIX.1e for "no qualifier".
pub const ACL_UNDEFINED_ID: u32 = u32::MAX;

/// Subject an ACL entry applies to.
///
/// Darwin stores subjects as membership UUIDs that may name either a user or
/// a group; the variant records which one the UUID resolved to so a group is
/// never mistaken for a user id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// No subject is bound.
    #[default]
    None,
    /// A user id.
    User(u32),
    /// A group id.
    Group(u32),
}

impl Qualifier {
    /// Returns the user id, or `None` when the subject is absent or a group.
    #[must_use]
    pub const fn uid(self) -> Option<u32> {
        match self {
            Self::User(uid) => Some(uid),
            _ => None,
        }
    }

    /// Returns the group id, or `None` when the subject is absent or a user.
    #[must_use]
    pub const fn gid(self) -> Option<u32> {
        match self {
            Self::Group(gid) => Some(gid),
            _ => None,
        }
    }

    /// Returns the numeric id regardless of kind.
    #[must_use]
    pub const fn id(self) -> Option<u32> {
        match self {
            Self::User(id) | Self::Group(id) => Some(id),
            Self::None => None,
        }
    }

    /// Returns `true` when no subject is bound.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::User(uid) => write!(f, "user:{uid}"),
            Self::Group(gid) => write!(f, "group:{gid}"),
        }
    }
}
