#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod acl;
mod backend;
mod entry;
mod error;
mod flags;
mod perm;
mod permset;
mod posix_xattr;
mod qualifier;
mod tag;
mod text;

#[cfg(target_os = "linux")]
mod acl_linux;
#[cfg(target_os = "macos")]
mod acl_macos;

pub use crate::acl::{Acl, AclState, AclType, Entries};
pub use crate::backend::{
    ACCESS_UNSUPPORTED, AccessAclSupport, EXTENDED_UNSUPPORTED, ExtendedAclSupport,
    PlatformAccess, PlatformExtended, Unsupported,
};
pub use crate::entry::{AclEntry, Entry, EntryMut, PermsetMut};
pub use crate::error::{AclError, Result};
pub use crate::flags::{AclFlags, EntryFlags};
pub use crate::perm::Perm;
pub use crate::permset::Permset;
pub use crate::qualifier::{ACL_UNDEFINED_ID, Qualifier};
pub use crate::tag::Tag;

#[cfg(target_os = "linux")]
pub use crate::acl_linux::XattrAccess;
#[cfg(target_os = "macos")]
pub use crate::acl_macos::Supported;
