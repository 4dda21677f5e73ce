//! POSIX ACLs on Linux, stored as `system.posix_acl_*` extended attributes.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use tracing::debug;

use crate::acl::{Acl, AclType};
use crate::backend::{AccessAclSupport, ensure_posix_type};
use crate::error::{AclError, Result};
use crate::posix_xattr::{self, ACCESS_XATTR, DEFAULT_XATTR};

/// POSIX access and default ACLs read and written through extended attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct XattrAccess;

const fn attribute_name(ty: AclType) -> &'static str {
    match ty {
        AclType::Default => DEFAULT_XATTR,
        AclType::Access | AclType::Extended => ACCESS_XATTR,
    }
}

fn file_mode(path: &Path) -> Result<u32> {
    let metadata = fs::metadata(path).map_err(|error| AclError::io("stat", path, error))?;
    Ok(metadata.mode())
}

impl AccessAclSupport for XattrAccess {
    fn get_file(&self, path: &Path, ty: AclType) -> Result<Acl> {
        ensure_posix_type("get_file", ty)?;
        let stored = xattr::get_deref(path, attribute_name(ty))
            .map_err(|error| AclError::io("read ACL", path, error))?;

        let acl = match (stored, ty) {
            (Some(bytes), _) => Acl::loaded(posix_xattr::decode(&bytes)?),
            (None, AclType::Default) => Acl::loaded(Vec::new()),
            (None, _) => Acl::loaded(Acl::from_mode(file_mode(path)?).entries),
        };
        debug!(
            target: "acl::io",
            path = %path.display(),
            category = %ty,
            entries = acl.len(),
            "loaded ACL"
        );
        Ok(acl)
    }

    fn set_file(&self, path: &Path, ty: AclType, acl: &Acl) -> Result<()> {
        ensure_posix_type("set_file", ty)?;
        if ty == AclType::Default && acl.is_empty() {
            return self.delete_default(path);
        }

        acl.validate_posix()?;
        let bytes = posix_xattr::encode(acl)?;
        xattr::set_deref(path, attribute_name(ty), &bytes)
            .map_err(|error| AclError::io("apply ACL", path, error))?;
        debug!(
            target: "acl::io",
            path = %path.display(),
            category = %ty,
            entries = acl.len(),
            "committed ACL"
        );
        Ok(())
    }

    fn delete_default(&self, path: &Path) -> Result<()> {
        match xattr::remove_deref(path, DEFAULT_XATTR) {
            Ok(()) => {}
            Err(error) if error.raw_os_error() == Some(libc::ENODATA) => {}
            Err(error) => return Err(AclError::io("remove default ACL", path, error)),
        }
        debug!(target: "acl::io", path = %path.display(), "removed default ACL");
        Ok(())
    }
}
