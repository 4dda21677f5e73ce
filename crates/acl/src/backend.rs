//! Platform capabilities behind [`Acl`]'s file operations.
//!
//! Each ACL category is reached through a capability trait with one
//! implementation per platform, picked at build time:
//!
//! | Capability              | macOS       | Linux         | elsewhere     |
//! |-------------------------|-------------|---------------|---------------|
//! | [`ExtendedAclSupport`]  | `Supported` | `Unsupported` | `Unsupported` |
//! | [`AccessAclSupport`]    | `Unsupported` | `XattrAccess` | `Unsupported` |

use std::path::Path;

use crate::acl::{Acl, AclType};
use crate::entry::AclEntry;
use crate::error::{AclError, Result};
use crate::permset::Permset;
use crate::qualifier::Qualifier;
use crate::tag::Tag;

/// Fixed error returned for extended ACL requests where the platform has none.
pub const EXTENDED_UNSUPPORTED: &str = "extended ACLs are only supported on macOS";

/// Fixed error returned for POSIX ACL requests where the platform has none.
pub const ACCESS_UNSUPPORTED: &str = "POSIX access and default ACLs are not supported on this platform";

/// Reading and writing Darwin extended ACLs.
pub trait ExtendedAclSupport {
    /// Loads the extended ACL of `path`.
    fn get_file_extended(&self, path: &Path) -> Result<Acl>;

    /// Replaces the extended ACL of `path` with `acl`.
    fn set_file_extended(&self, path: &Path, acl: &Acl) -> Result<()>;

    /// Appends the entries a fresh ACL for `path` starts from.
    fn add_base_entries(&self, acl: &mut Acl, path: &Path) -> Result<()>;
}

/// Reading and writing POSIX access and default ACLs.
pub trait AccessAclSupport {
    /// Loads the ACL of the given category.
    fn get_file(&self, path: &Path, ty: AclType) -> Result<Acl>;

    /// Replaces the ACL of the given category.
    fn set_file(&self, path: &Path, ty: AclType, acl: &Acl) -> Result<()>;

    /// Removes the default ACL of a directory.
    fn delete_default(&self, path: &Path) -> Result<()>;
}

/// Capability for platforms lacking an ACL category.
///
/// Every request fails with a fixed error before any OS call is made, except
/// base-entry synthesis which has nothing to add.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl ExtendedAclSupport for Unsupported {
    fn get_file_extended(&self, _path: &Path) -> Result<Acl> {
        Err(AclError::Unsupported(EXTENDED_UNSUPPORTED))
    }

    fn set_file_extended(&self, _path: &Path, _acl: &Acl) -> Result<()> {
        Err(AclError::Unsupported(EXTENDED_UNSUPPORTED))
    }

    fn add_base_entries(&self, _acl: &mut Acl, _path: &Path) -> Result<()> {
        Ok(())
    }
}

impl AccessAclSupport for Unsupported {
    fn get_file(&self, _path: &Path, _ty: AclType) -> Result<Acl> {
        Err(AclError::Unsupported(ACCESS_UNSUPPORTED))
    }

    fn set_file(&self, _path: &Path, _ty: AclType, _acl: &Acl) -> Result<()> {
        Err(AclError::Unsupported(ACCESS_UNSUPPORTED))
    }

    fn delete_default(&self, _path: &Path) -> Result<()> {
        Err(AclError::Unsupported(ACCESS_UNSUPPORTED))
    }
}

/// Extended ACL capability of the current platform.
#[cfg(target_os = "macos")]
pub type PlatformExtended = crate::acl_macos::Supported;

/// Extended ACL capability of the current platform.
#[cfg(not(target_os = "macos"))]
pub type PlatformExtended = Unsupported;

/// POSIX ACL capability of the current platform.
#[cfg(target_os = "linux")]
pub type PlatformAccess = crate::acl_linux::XattrAccess;

/// POSIX ACL capability of the current platform.
#[cfg(not(target_os = "linux"))]
pub type PlatformAccess = Unsupported;

/// Builds the owner allow entry derived from the owner bits of `mode`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn owner_entry_from_mode(mode: u32, owner: u32) -> AclEntry {
    AclEntry::from_parts(
        Tag::ExtendedAllow,
        Qualifier::User(owner),
        Permset::from_mode_bits(mode >> 6),
    )
}

/// Rejects access-backend requests for the extended category.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn ensure_posix_type(operation: &'static str, ty: AclType) -> Result<()> {
    if ty == AclType::Extended {
        return Err(AclError::invalid_argument(
            operation,
            "extended ACLs are handled by the extended capability",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perm::Perm;

    #[test]
    fn unsupported_extended_fails_for_any_path() {
        for path in ["/definitely/not/here", "", "/"] {
            let error = Unsupported.get_file_extended(Path::new(path)).unwrap_err();
            assert!(matches!(error, AclError::Unsupported(EXTENDED_UNSUPPORTED)));
            assert_eq!(error.to_string(), EXTENDED_UNSUPPORTED);
        }
        let error = Unsupported
            .set_file_extended(Path::new("/"), &Acl::new())
            .unwrap_err();
        assert!(error.is_unsupported());
    }

    #[test]
    fn unsupported_access_fails_fast() {
        let error = AccessAclSupport::get_file(&Unsupported, Path::new("/"), AclType::Access)
            .unwrap_err();
        assert!(matches!(error, AclError::Unsupported(ACCESS_UNSUPPORTED)));
        assert!(Unsupported.delete_default(Path::new("/")).is_err());
    }

    #[test]
    fn unsupported_base_entries_are_a_no_op() {
        let mut acl = Acl::new();
        Unsupported
            .add_base_entries(&mut acl, Path::new("/nowhere"))
            .unwrap();
        assert!(acl.is_empty());
    }

    #[test]
    fn owner_entry_maps_owner_bits() {
        let entry = owner_entry_from_mode(0o640, 501);
        assert_eq!(entry.tag(), Tag::ExtendedAllow);
        assert_eq!(entry.qualifier().unwrap(), Qualifier::User(501));
        assert!(entry.permset().contains(Perm::Read));
        assert!(entry.permset().contains(Perm::Write));
        assert!(!entry.permset().contains(Perm::Execute));

        let exec_only = owner_entry_from_mode(0o177, 0);
        assert_eq!(exec_only.permset().to_string(), "Execute");
    }

    #[test]
    fn extended_type_is_rejected_by_access_backends() {
        assert!(ensure_posix_type("get_file", AclType::Extended).is_err());
        assert!(ensure_posix_type("get_file", AclType::Default).is_ok());
    }
}
