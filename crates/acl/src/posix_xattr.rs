//! Kernel layout of POSIX ACLs stored in extended attributes.
//!
//! Linux keeps access and default ACLs in the `system.posix_acl_access` and
//! `system.posix_acl_default` attributes. Each value is a little-endian
//! version-2 header followed by fixed-size entries:
//!
//! ```text
//! u32 version            (= 2)
//! repeat {
//!     u16 tag
//!     u16 perm           (r=4, w=2, x=1)
//!     u32 id             (0xFFFF_FFFF for entries without a qualifier)
//! }
//! ```
//!
//! The kernel rejects entries that are not sorted by tag and then by id, so
//! [`encode`] sorts its output.

#![cfg_attr(not(target_os = "linux"), allow(dead_code))]

use crate::acl::Acl;
use crate::entry::AclEntry;
use crate::error::{AclError, Result};
use crate::permset::Permset;
use crate::qualifier::{ACL_UNDEFINED_ID, Qualifier};
use crate::tag::Tag;

/// Attribute holding the access ACL.
pub(crate) const ACCESS_XATTR: &str = "system.posix_acl_access";
/// Attribute holding the default ACL of a directory.
pub(crate) const DEFAULT_XATTR: &str = "system.posix_acl_default";

const VERSION: u32 = 0x0002;
const HEADER_LEN: usize = 4;
const ENTRY_LEN: usize = 8;

const TAG_USER_OBJ: u16 = 0x01;
const TAG_USER: u16 = 0x02;
const TAG_GROUP_OBJ: u16 = 0x04;
const TAG_GROUP: u16 = 0x08;
const TAG_MASK: u16 = 0x10;
const TAG_OTHER: u16 = 0x20;

fn tag_code(tag: Tag) -> Result<u16> {
    match tag {
        Tag::UserObj => Ok(TAG_USER_OBJ),
        Tag::User => Ok(TAG_USER),
        Tag::GroupObj => Ok(TAG_GROUP_OBJ),
        Tag::Group => Ok(TAG_GROUP),
        Tag::Mask => Ok(TAG_MASK),
        Tag::Other => Ok(TAG_OTHER),
        other => Err(AclError::Invalid(format!("{other} entry in a POSIX ACL"))),
    }
}

/// Serialises a POSIX ACL into the kernel layout.
pub(crate) fn encode(acl: &Acl) -> Result<Vec<u8>> {
    let mut records = Vec::with_capacity(acl.len());
    for entry in acl.iter() {
        let tag = tag_code(entry.tag())?;
        let id = entry.record().bound_qualifier().id().unwrap_or(ACL_UNDEFINED_ID);
        let perm = entry.permset().mode_bits() as u16;
        records.push((tag, id, perm));
    }
    records.sort_unstable_by_key(|(tag, id, _)| (*tag, *id));

    let mut buffer = Vec::with_capacity(HEADER_LEN + records.len() * ENTRY_LEN);
    buffer.extend_from_slice(&VERSION.to_le_bytes());
    for (tag, id, perm) in records {
        buffer.extend_from_slice(&tag.to_le_bytes());
        buffer.extend_from_slice(&perm.to_le_bytes());
        buffer.extend_from_slice(&id.to_le_bytes());
    }
    Ok(buffer)
}

/// Parses the kernel layout back into entries, in stored order.
pub(crate) fn decode(bytes: &[u8]) -> Result<Vec<AclEntry>> {
    let Some((header, body)) = bytes.split_first_chunk::<HEADER_LEN>() else {
        return Err(decode_error("attribute shorter than its header"));
    };
    let version = u32::from_le_bytes(*header);
    if version != VERSION {
        return Err(decode_error(format!("unsupported version {version}")));
    }
    if body.len() % ENTRY_LEN != 0 {
        return Err(decode_error(format!(
            "trailing {} bytes after the last entry",
            body.len() % ENTRY_LEN
        )));
    }

    body.chunks_exact(ENTRY_LEN)
        .map(|chunk| {
            let tag = u16::from_le_bytes([chunk[0], chunk[1]]);
            let perm = u16::from_le_bytes([chunk[2], chunk[3]]);
            let id = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            let (tag, qualifier) = match tag {
                TAG_USER_OBJ => (Tag::UserObj, Qualifier::None),
                TAG_USER => (Tag::User, Qualifier::User(id)),
                TAG_GROUP_OBJ => (Tag::GroupObj, Qualifier::None),
                TAG_GROUP => (Tag::Group, Qualifier::Group(id)),
                TAG_MASK => (Tag::Mask, Qualifier::None),
                TAG_OTHER => (Tag::Other, Qualifier::None),
                unknown => return Err(decode_error(format!("unknown tag {unknown:#x}"))),
            };
            Ok(AclEntry::from_parts(
                tag,
                qualifier,
                Permset::from_mode_bits(u32::from(perm)),
            ))
        })
        .collect()
}

fn decode_error(reason: impl Into<String>) -> AclError {
    AclError::Decode {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_minimal_acl_in_kernel_layout() {
        let bytes = encode(&Acl::from_mode(0o640)).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x02, 0x00, 0x00, 0x00, // version
                0x01, 0x00, 0x06, 0x00, 0xff, 0xff, 0xff, 0xff, // user::rw-
                0x04, 0x00, 0x04, 0x00, 0xff, 0xff, 0xff, 0xff, // group::r--
                0x20, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, // other::---
            ]
        );
    }

    #[test]
    fn encode_sorts_by_tag_then_id() {
        let acl = Acl::from_text(
            "other::r--\nuser:2000:rw-\nmask::rw-\nuser:1000:r--\ngroup::r--\nuser::rwx",
        )
        .unwrap();
        let entries = decode(&encode(&acl).unwrap()).unwrap();
        let rendered: Vec<String> = entries.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "user::rwx",
                "user:1000:r--",
                "user:2000:rw-",
                "group::r--",
                "mask::rw-",
                "other::r--",
            ]
        );
    }

    #[test]
    fn decodes_named_group() {
        let mut bytes = VERSION.to_le_bytes().to_vec();
        bytes.extend_from_slice(&TAG_GROUP.to_le_bytes());
        bytes.extend_from_slice(&5u16.to_le_bytes());
        bytes.extend_from_slice(&20u32.to_le_bytes());
        let entries = decode(&bytes).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tag(), Tag::Group);
        assert_eq!(entries[0].qualifier().unwrap(), Qualifier::Group(20));
        assert_eq!(entries[0].permset().mode_string(), "r-x");
    }

    #[test]
    fn rejects_extended_entries() {
        let acl = Acl::from_text("allow:user:501:Read").unwrap();
        assert!(matches!(encode(&acl), Err(AclError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_blobs() {
        assert!(decode(&[0x02, 0x00]).is_err());
        assert!(decode(&[0x01, 0x00, 0x00, 0x00]).is_err());
        assert!(decode(&[0x02, 0x00, 0x00, 0x00, 0x01]).is_err());

        let mut unknown_tag = VERSION.to_le_bytes().to_vec();
        unknown_tag.extend_from_slice(&[0x40, 0x00, 0x07, 0x00, 0, 0, 0, 0]);
        let error = decode(&unknown_tag).unwrap_err();
        assert!(error.to_string().contains("unknown tag 0x40"));
    }

    #[test]
    fn empty_body_decodes_to_no_entries() {
        assert!(decode(&VERSION.to_le_bytes()).unwrap().is_empty());
    }
}
