#![allow(unsafe_code)]

//! # macOS extended ACLs
//!
//! Darwin keeps NFSv4-style allow/deny ACLs (`ACL_TYPE_EXTENDED`) next to the
//! mode bits. Subjects are membership UUIDs, which are resolved to and from
//! numeric uids and gids with the `mbr_*` calls of libSystem.
//!
//! # Design
//!
//! Native ACL handles only live for the duration of one call. Loading walks
//! the native entries and copies them, inheritance flags included, into an
//! [`Acl`]; committing builds a fresh native ACL from the arena and hands it
//! to `acl_set_file`. Handles
//! and qualifier buffers are wrapped in guards that call `acl_free` on drop.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::ptr;

use tracing::debug;

use crate::acl::{Acl, AclType};
use crate::backend::{ExtendedAclSupport, owner_entry_from_mode};
use crate::entry::AclEntry;
use crate::error::{AclError, Result};
use crate::flags::{AclFlags, EntryFlags};
use crate::perm::Perm;
use crate::permset::Permset;
use crate::qualifier::{ACL_UNDEFINED_ID, Qualifier};
use crate::tag::Tag;

mod sys {
    #![allow(unsafe_code)]
    #![allow(non_camel_case_types)]

    use libc::{c_char, c_int, c_uchar, c_void};

    pub type acl_t = *mut c_void;
    pub type acl_entry_t = *mut c_void;
    pub type acl_permset_t = *mut c_void;
    pub type acl_flagset_t = *mut c_void;
    pub type acl_flag_t = c_int;
    pub type acl_tag_t = c_int;
    pub type acl_perm_t = c_int;
    pub type acl_type_t = c_int;
    pub type id_t = u32;

    pub const ACL_TYPE_EXTENDED: acl_type_t = 0x0000_0100;

    pub const ACL_FIRST_ENTRY: c_int = 0;
    pub const ACL_NEXT_ENTRY: c_int = -1;

    pub const ACL_UNDEFINED_TAG: acl_tag_t = 0;
    pub const ACL_EXTENDED_ALLOW: acl_tag_t = 1;
    pub const ACL_EXTENDED_DENY: acl_tag_t = 2;

    pub const ACL_READ_DATA: acl_perm_t = 1 << 1;
    pub const ACL_WRITE_DATA: acl_perm_t = 1 << 2;
    pub const ACL_EXECUTE: acl_perm_t = 1 << 3;
    pub const ACL_DELETE: acl_perm_t = 1 << 4;
    pub const ACL_APPEND_DATA: acl_perm_t = 1 << 5;
    pub const ACL_DELETE_CHILD: acl_perm_t = 1 << 6;
    pub const ACL_READ_ATTRIBUTES: acl_perm_t = 1 << 7;
    pub const ACL_WRITE_ATTRIBUTES: acl_perm_t = 1 << 8;
    pub const ACL_READ_EXTATTRIBUTES: acl_perm_t = 1 << 9;
    pub const ACL_WRITE_EXTATTRIBUTES: acl_perm_t = 1 << 10;
    pub const ACL_READ_SECURITY: acl_perm_t = 1 << 11;
    pub const ACL_WRITE_SECURITY: acl_perm_t = 1 << 12;
    pub const ACL_CHANGE_OWNER: acl_perm_t = 1 << 13;
    pub const ACL_SYNCHRONIZE: acl_perm_t = 1 << 20;

    pub const ACL_FLAG_DEFER_INHERIT: acl_flag_t = 1 << 0;
    pub const ACL_ENTRY_INHERITED: acl_flag_t = 1 << 4;
    pub const ACL_ENTRY_FILE_INHERIT: acl_flag_t = 1 << 5;
    pub const ACL_ENTRY_DIRECTORY_INHERIT: acl_flag_t = 1 << 6;
    pub const ACL_ENTRY_LIMIT_INHERIT: acl_flag_t = 1 << 7;
    pub const ACL_ENTRY_ONLY_INHERIT: acl_flag_t = 1 << 8;
    pub const ACL_FLAG_NO_INHERIT: acl_flag_t = 1 << 17;

    pub const ID_TYPE_UID: c_int = 0;
    pub const ID_TYPE_GID: c_int = 1;

    pub const UUID_LEN: usize = 16;

    unsafe extern "C" {
        pub fn acl_init(count: c_int) -> acl_t;
        pub fn acl_free(obj_p: *mut c_void) -> c_int;
        pub fn acl_get_file(path_p: *const c_char, ty: acl_type_t) -> acl_t;
        pub fn acl_set_file(path_p: *const c_char, ty: acl_type_t, acl: acl_t) -> c_int;
        pub fn acl_create_entry(acl_p: *mut acl_t, entry_p: *mut acl_entry_t) -> c_int;
        pub fn acl_get_entry(acl: acl_t, entry_id: c_int, entry_p: *mut acl_entry_t) -> c_int;
        pub fn acl_get_tag_type(entry: acl_entry_t, tag_type_p: *mut acl_tag_t) -> c_int;
        pub fn acl_set_tag_type(entry: acl_entry_t, tag_type: acl_tag_t) -> c_int;
        pub fn acl_get_qualifier(entry: acl_entry_t) -> *mut c_void;
        pub fn acl_set_qualifier(entry: acl_entry_t, qualifier: *const c_void) -> c_int;
        pub fn acl_get_permset(entry: acl_entry_t, permset_p: *mut acl_permset_t) -> c_int;
        pub fn acl_set_permset(entry: acl_entry_t, permset: acl_permset_t) -> c_int;
        pub fn acl_get_perm_np(permset: acl_permset_t, perm: acl_perm_t) -> c_int;
        pub fn acl_add_perm(permset: acl_permset_t, perm: acl_perm_t) -> c_int;
        pub fn acl_clear_perms(permset: acl_permset_t) -> c_int;
        pub fn acl_get_flagset_np(obj_p: *mut c_void, flagset_p: *mut acl_flagset_t) -> c_int;
        pub fn acl_set_flagset_np(obj_p: *mut c_void, flagset: acl_flagset_t) -> c_int;
        pub fn acl_get_flag_np(flagset: acl_flagset_t, flag: acl_flag_t) -> c_int;
        pub fn acl_add_flag_np(flagset: acl_flagset_t, flag: acl_flag_t) -> c_int;
        pub fn acl_clear_flags_np(flagset: acl_flagset_t) -> c_int;

        pub fn mbr_uid_to_uuid(uid: id_t, uu: *mut c_uchar) -> c_int;
        pub fn mbr_gid_to_uuid(gid: id_t, uu: *mut c_uchar) -> c_int;
        pub fn mbr_uuid_to_id(uu: *const c_uchar, id: *mut id_t, id_type: *mut c_int) -> c_int;
    }
}

/// Extended ACL capability backed by libSystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Supported;

/// Owned native ACL handle, released on drop.
struct NativeAcl(sys::acl_t);

impl NativeAcl {
    fn with_capacity(count: usize) -> io::Result<Self> {
        let count = libc::c_int::try_from(count).unwrap_or(libc::c_int::MAX);
        // Safety: `acl_init` has no preconditions and returns null on failure.
        let raw = unsafe { sys::acl_init(count) };
        if raw.is_null() {
            Err(io::Error::last_os_error())
        } else {
            Ok(Self(raw))
        }
    }

    const fn as_ptr(&self) -> sys::acl_t {
        self.0
    }
}

impl Drop for NativeAcl {
    fn drop(&mut self) {
        // Safety: the pointer came from `acl_init` or `acl_get_file` and is
        // freed exactly once here.
        unsafe {
            sys::acl_free(self.0);
        }
    }
}

/// Qualifier buffer returned by `acl_get_qualifier`, released on drop.
struct NativeQualifier(*mut libc::c_void);

impl Drop for NativeQualifier {
    fn drop(&mut self) {
        // Safety: `acl_get_qualifier` hands out a copy owned by the caller.
        unsafe {
            sys::acl_free(self.0);
        }
    }
}

const fn native_perm(perm: Perm) -> sys::acl_perm_t {
    match perm {
        Perm::Read => sys::ACL_READ_DATA,
        Perm::Write => sys::ACL_WRITE_DATA,
        Perm::Execute => sys::ACL_EXECUTE,
        Perm::Delete => sys::ACL_DELETE,
        Perm::Append => sys::ACL_APPEND_DATA,
        Perm::DeleteChild => sys::ACL_DELETE_CHILD,
        Perm::ReadAttributes => sys::ACL_READ_ATTRIBUTES,
        Perm::WriteAttributes => sys::ACL_WRITE_ATTRIBUTES,
        Perm::ReadExtAttributes => sys::ACL_READ_EXTATTRIBUTES,
        Perm::WriteExtAttributes => sys::ACL_WRITE_EXTATTRIBUTES,
        Perm::ReadSecurity => sys::ACL_READ_SECURITY,
        Perm::WriteSecurity => sys::ACL_WRITE_SECURITY,
        Perm::ChangeOwner => sys::ACL_CHANGE_OWNER,
        Perm::Synchronize => sys::ACL_SYNCHRONIZE,
    }
}

const ENTRY_FLAG_TABLE: [(EntryFlags, sys::acl_flag_t); 5] = [
    (EntryFlags::INHERITED, sys::ACL_ENTRY_INHERITED),
    (EntryFlags::FILE_INHERIT, sys::ACL_ENTRY_FILE_INHERIT),
    (EntryFlags::DIRECTORY_INHERIT, sys::ACL_ENTRY_DIRECTORY_INHERIT),
    (EntryFlags::LIMIT_INHERIT, sys::ACL_ENTRY_LIMIT_INHERIT),
    (EntryFlags::ONLY_INHERIT, sys::ACL_ENTRY_ONLY_INHERIT),
];

const ACL_FLAG_TABLE: [(AclFlags, sys::acl_flag_t); 2] = [
    (AclFlags::DEFER_INHERIT, sys::ACL_FLAG_DEFER_INHERIT),
    (AclFlags::NO_INHERIT, sys::ACL_FLAG_NO_INHERIT),
];

const fn native_tag(tag: Tag) -> sys::acl_tag_t {
    match tag {
        Tag::ExtendedAllow => sys::ACL_EXTENDED_ALLOW,
        Tag::ExtendedDeny => sys::ACL_EXTENDED_DENY,
        _ => sys::ACL_UNDEFINED_TAG,
    }
}

const fn tag_from_native(tag: sys::acl_tag_t) -> Tag {
    match tag {
        sys::ACL_EXTENDED_ALLOW => Tag::ExtendedAllow,
        sys::ACL_EXTENDED_DENY => Tag::ExtendedDeny,
        _ => Tag::Undefined,
    }
}

fn c_path(operation: &'static str, path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| AclError::invalid_argument(operation, "path contains an interior NUL byte"))
}

fn check(rc: libc::c_int, context: &'static str, path: &Path) -> Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(AclError::io(context, path, io::Error::last_os_error()))
    }
}

fn identity_error(operation: &'static str, id: u32, rc: libc::c_int) -> AclError {
    AclError::Identity {
        operation,
        id,
        message: io::Error::from_raw_os_error(rc).to_string(),
    }
}

fn uuid_for(qualifier: Qualifier) -> Result<[u8; sys::UUID_LEN]> {
    let mut uuid = [0u8; sys::UUID_LEN];
    // Safety: `uuid` is a writable 16-byte buffer as `uuid_t` requires.
    let (operation, id, rc) = match qualifier {
        Qualifier::User(uid) => ("mbr_uid_to_uuid", uid, unsafe {
            sys::mbr_uid_to_uuid(uid, uuid.as_mut_ptr())
        }),
        Qualifier::Group(gid) => ("mbr_gid_to_uuid", gid, unsafe {
            sys::mbr_gid_to_uuid(gid, uuid.as_mut_ptr())
        }),
        Qualifier::None => {
            return Err(AclError::invalid_argument(
                "set_file_extended",
                "entry has no qualifier",
            ));
        }
    };
    if rc != 0 {
        return Err(identity_error(operation, id, rc));
    }
    Ok(uuid)
}

fn qualifier_from_uuid(uuid: *const u8) -> Result<Qualifier> {
    let mut id: sys::id_t = 0;
    let mut id_type: libc::c_int = -1;
    // Safety: `uuid` points at the 16-byte buffer owned by a live
    // `NativeQualifier`.
    let rc = unsafe { sys::mbr_uuid_to_id(uuid, &mut id, &mut id_type) };
    if rc != 0 {
        return Err(identity_error("mbr_uuid_to_id", ACL_UNDEFINED_ID, rc));
    }
    match id_type {
        sys::ID_TYPE_UID => Ok(Qualifier::User(id)),
        sys::ID_TYPE_GID => Ok(Qualifier::Group(id)),
        other => Err(AclError::Identity {
            operation: "mbr_uuid_to_id",
            id,
            message: format!("unsupported identity type {other}"),
        }),
    }
}

/// Flag set of a native ACL or entry; it stays owned by `object`.
fn native_flagset(object: *mut libc::c_void, path: &Path) -> Result<sys::acl_flagset_t> {
    let mut flagset: sys::acl_flagset_t = ptr::null_mut();
    // Safety: `object` is a live ACL or entry handle kept alive by the caller.
    check(
        unsafe { sys::acl_get_flagset_np(object, &mut flagset) },
        "read ACL flags",
        path,
    )?;
    Ok(flagset)
}

/// Native flags of `table` that are set in `flagset`.
fn flags_from_native<T: Copy>(
    flagset: sys::acl_flagset_t,
    table: &[(T, sys::acl_flag_t)],
) -> impl Iterator<Item = T> + '_ {
    table
        .iter()
        // Safety: `flagset` borrows from a live object and is only read here.
        .filter(move |(_, native)| unsafe { sys::acl_get_flag_np(flagset, *native) } > 0)
        .map(|(flag, _)| *flag)
}

/// Replaces the flag set of a native ACL or entry with `natives`.
fn write_flags(
    object: *mut libc::c_void,
    natives: impl IntoIterator<Item = sys::acl_flag_t>,
    path: &Path,
) -> Result<()> {
    let flagset = native_flagset(object, path)?;
    // Safety: `flagset` belongs to `object`.
    check(
        unsafe { sys::acl_clear_flags_np(flagset) },
        "clear ACL flags",
        path,
    )?;
    for native in natives {
        // Safety: as above.
        check(
            unsafe { sys::acl_add_flag_np(flagset, native) },
            "add ACL flag",
            path,
        )?;
    }
    // Safety: as above.
    check(
        unsafe { sys::acl_set_flagset_np(object, flagset) },
        "set ACL flags",
        path,
    )
}

fn read_entry(entry: sys::acl_entry_t, path: &Path) -> Result<AclEntry> {
    let mut raw_tag: sys::acl_tag_t = sys::ACL_UNDEFINED_TAG;
    // Safety: `entry` belongs to a native ACL kept alive by the caller.
    check(
        unsafe { sys::acl_get_tag_type(entry, &mut raw_tag) },
        "read ACL entry tag",
        path,
    )?;
    let tag = tag_from_native(raw_tag);

    let qualifier = if tag.is_extended() {
        // Safety: as above; the returned buffer is owned by the guard.
        let raw = unsafe { sys::acl_get_qualifier(entry) };
        if raw.is_null() {
            return Err(AclError::io(
                "read ACL entry qualifier",
                path,
                io::Error::last_os_error(),
            ));
        }
        let guard = NativeQualifier(raw);
        qualifier_from_uuid(guard.0.cast::<u8>())?
    } else {
        Qualifier::None
    };

    let mut permset: sys::acl_permset_t = ptr::null_mut();
    // Safety: as above.
    check(
        unsafe { sys::acl_get_permset(entry, &mut permset) },
        "read ACL entry permissions",
        path,
    )?;
    let perms: Permset = Perm::ALL
        .into_iter()
        // Safety: `permset` borrows from `entry` and is only read here.
        .filter(|perm| unsafe { sys::acl_get_perm_np(permset, native_perm(*perm)) } > 0)
        .collect();

    let flags = flags_from_native(native_flagset(entry, path)?, &ENTRY_FLAG_TABLE)
        .fold(EntryFlags::new(), |acc, flag| acc | flag);

    Ok(AclEntry::from_parts(tag, qualifier, perms).with_native_flags(flags))
}

fn read_entries(acl: &NativeAcl, path: &Path) -> Result<Vec<AclEntry>> {
    let mut entries = Vec::new();
    let mut which = sys::ACL_FIRST_ENTRY;
    loop {
        let mut entry: sys::acl_entry_t = ptr::null_mut();
        // Safety: `acl` is a live handle for the duration of the walk.
        let rc = unsafe { sys::acl_get_entry(acl.as_ptr(), which, &mut entry) };
        if rc != 0 {
            let error = io::Error::last_os_error();
            if error.raw_os_error() == Some(libc::EINVAL) {
                break;
            }
            return Err(AclError::io("read ACL entry", path, error));
        }
        entries.push(read_entry(entry, path)?);
        which = sys::ACL_NEXT_ENTRY;
    }
    Ok(entries)
}

fn write_entry(native: &mut NativeAcl, record: &AclEntry, path: &Path) -> Result<()> {
    let mut entry: sys::acl_entry_t = ptr::null_mut();
    // Safety: `acl_create_entry` may reallocate the ACL and updates the
    // handle in place.
    check(
        unsafe { sys::acl_create_entry(&mut native.0, &mut entry) },
        "create ACL entry",
        path,
    )?;
    // Safety: `entry` was just created inside `native`.
    check(
        unsafe { sys::acl_set_tag_type(entry, native_tag(record.tag())) },
        "set ACL entry tag",
        path,
    )?;

    let uuid = uuid_for(record.bound_qualifier())?;
    // Safety: the qualifier is copied into the entry by libSystem.
    check(
        unsafe { sys::acl_set_qualifier(entry, uuid.as_ptr().cast()) },
        "set ACL entry qualifier",
        path,
    )?;

    let mut permset: sys::acl_permset_t = ptr::null_mut();
    // Safety: `entry` is live and `permset` is written by the call.
    check(
        unsafe { sys::acl_get_permset(entry, &mut permset) },
        "read ACL entry permissions",
        path,
    )?;
    // Safety: `permset` belongs to `entry`.
    check(
        unsafe { sys::acl_clear_perms(permset) },
        "clear ACL entry permissions",
        path,
    )?;
    for perm in record.permset().iter() {
        // Safety: as above.
        check(
            unsafe { sys::acl_add_perm(permset, native_perm(perm)) },
            "add ACL entry permission",
            path,
        )?;
    }
    // Safety: as above.
    check(
        unsafe { sys::acl_set_permset(entry, permset) },
        "set ACL entry permissions",
        path,
    )?;

    let flags = record.flags();
    write_flags(
        entry,
        ENTRY_FLAG_TABLE
            .into_iter()
            .filter(|(flag, _)| flags.contains(*flag))
            .map(|(_, native)| native),
        path,
    )
}

impl ExtendedAclSupport for Supported {
    fn get_file_extended(&self, path: &Path) -> Result<Acl> {
        let c_path = c_path("get_file_extended", path)?;
        // Safety: `c_path` is a valid NUL-terminated string.
        let raw = unsafe { sys::acl_get_file(c_path.as_ptr(), sys::ACL_TYPE_EXTENDED) };
        if raw.is_null() {
            return Err(AclError::from_os(
                "read ACL",
                AclType::Extended,
                path,
                io::Error::last_os_error(),
            ));
        }
        let native = NativeAcl(raw);
        let flags = flags_from_native(native_flagset(native.as_ptr(), path)?, &ACL_FLAG_TABLE)
            .fold(AclFlags::new(), |acc, flag| acc | flag);
        let mut acl = Acl::loaded(read_entries(&native, path)?);
        acl.set_flags(flags);
        debug!(
            target: "acl::io",
            path = %path.display(),
            category = %AclType::Extended,
            entries = acl.len(),
            ?flags,
            "loaded ACL"
        );
        Ok(acl)
    }

    fn set_file_extended(&self, path: &Path, acl: &Acl) -> Result<()> {
        acl.validate_extended()?;
        let c_path = c_path("set_file_extended", path)?;

        let mut native = NativeAcl::with_capacity(acl.len())
            .map_err(|error| AclError::io("allocate ACL", path, error))?;
        for record in &acl.entries {
            write_entry(&mut native, record, path)?;
        }
        let flags = acl.flags();
        write_flags(
            native.as_ptr(),
            ACL_FLAG_TABLE
                .into_iter()
                .filter(|(flag, _)| flags.contains(*flag))
                .map(|(_, native)| native),
            path,
        )?;

        // Safety: both pointers are valid for the duration of the call.
        let rc = unsafe {
            sys::acl_set_file(c_path.as_ptr(), sys::ACL_TYPE_EXTENDED, native.as_ptr())
        };
        check(rc, "apply ACL", path)?;
        debug!(
            target: "acl::io",
            path = %path.display(),
            category = %AclType::Extended,
            entries = acl.len(),
            "committed ACL"
        );
        Ok(())
    }

    fn add_base_entries(&self, acl: &mut Acl, path: &Path) -> Result<()> {
        let metadata = fs::metadata(path).map_err(|error| AclError::io("stat", path, error))?;
        acl.push_entry(owner_entry_from_mode(metadata.mode(), metadata.uid()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_of(path: &Path) -> u32 {
        fs::metadata(path).expect("metadata").uid()
    }

    #[test]
    fn perm_table_maps_to_distinct_native_bits() {
        let mut seen = 0;
        for perm in Perm::ALL {
            let bit = native_perm(perm);
            assert_eq!(seen & bit, 0, "{perm} reuses a bit");
            seen |= bit;
        }
    }

    #[test]
    fn fresh_file_has_no_extended_acl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("fresh");
        fs::write(&file, b"data").expect("write file");

        let error = Acl::get_file_extended(&file).unwrap_err();
        assert!(error.is_not_found(), "{error:?}");
    }

    #[test]
    fn not_found_then_create_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("patched");
        fs::write(&file, b"data").expect("write file");
        let uid = owner_of(&file);

        let mut acl = match Acl::get_file_extended(&file) {
            Err(error) if error.is_not_found() => Acl::new(),
            other => panic!("unexpected: {other:?}"),
        };
        let mut entry = acl.create_entry().expect("entry");
        entry.set_tag(Tag::ExtendedAllow).expect("tag");
        entry.set_qualifier_id(uid).expect("qualifier");
        entry
            .permset_mut()
            .add_perm(Perm::ReadExtAttributes)
            .expect("perm");
        entry
            .permset_mut()
            .add_perm(Perm::WriteExtAttributes)
            .expect("perm");
        match acl.set_file_extended(&file) {
            Ok(()) => {}
            Err(error) if error.is_unsupported() => {
                eprintln!("skipping: filesystem lacks extended ACL support: {error}");
                return;
            }
            Err(error) => panic!("apply extended ACL: {error}"),
        }

        let loaded = Acl::get_file_extended(&file).expect("reload");
        assert_eq!(loaded.len(), 1);
        let entry = loaded.get(0).expect("entry");
        assert_eq!(entry.tag(), Tag::ExtendedAllow);
        assert_eq!(entry.qualifier().expect("qualifier"), Qualifier::User(uid));
        assert_eq!(
            entry.permset().to_string(),
            "ReadExtAttributes, WriteExtAttributes"
        );
    }

    #[test]
    fn augmenting_existing_entry_keeps_one_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("augmented");
        fs::write(&file, b"data").expect("write file");
        let uid = owner_of(&file);

        let mut seed = Acl::new();
        seed.push_entry(
            AclEntry::with(
                Tag::ExtendedAllow,
                Qualifier::User(uid),
                [Perm::Read].into_iter().collect(),
            )
            .expect("entry"),
        );
        if let Err(error) = seed.set_file_extended(&file) {
            assert!(error.is_unsupported(), "{error:?}");
            return;
        }

        let mut acl = Acl::get_file_extended(&file).expect("load");
        acl.find_mut(Tag::ExtendedAllow, Qualifier::User(uid))
            .expect("existing entry")
            .permset_mut()
            .add_perm(Perm::Write)
            .expect("perm");
        acl.set_file_extended(&file).expect("commit");

        let loaded = Acl::get_file_extended(&file).expect("reload");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(0).expect("entry").permset().to_string(), "Read, Write");
    }

    #[test]
    fn flag_tables_map_to_distinct_native_bits() {
        let mut seen = 0;
        for native in ENTRY_FLAG_TABLE
            .iter()
            .map(|(_, native)| *native)
            .chain(ACL_FLAG_TABLE.iter().map(|(_, native)| *native))
        {
            assert_eq!(seen & native, 0, "{native:#x} reused");
            seen |= native;
        }
    }

    #[test]
    fn inheritance_flags_survive_edit_and_commit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = dir.path().join("shared");
        fs::create_dir(&shared).expect("mkdir");
        let uid = owner_of(&shared);
        let gid = fs::metadata(&shared).expect("metadata").gid();
        let inherit = EntryFlags::FILE_INHERIT | EntryFlags::DIRECTORY_INHERIT;

        let mut seed = Acl::new();
        seed.push_entry(
            AclEntry::with(
                Tag::ExtendedAllow,
                Qualifier::Group(gid),
                [Perm::Read].into_iter().collect(),
            )
            .expect("entry"),
        )
        .set_flags(inherit)
        .expect("flags");
        if let Err(error) = seed.set_file_extended(&shared) {
            assert!(error.is_unsupported(), "{error:?}");
            return;
        }

        let mut acl = Acl::get_file_extended(&shared).expect("load");
        assert_eq!(acl.get(0).expect("entry").flags(), inherit);
        acl.push_entry(
            AclEntry::with(
                Tag::ExtendedAllow,
                Qualifier::User(uid),
                [Perm::Write].into_iter().collect(),
            )
            .expect("entry"),
        );
        acl.set_file_extended(&shared).expect("commit");

        let loaded = Acl::get_file_extended(&shared).expect("reload");
        assert_eq!(loaded.len(), 2);
        let seeded = loaded
            .iter()
            .find(|entry| entry.qualifier().ok() == Some(Qualifier::Group(gid)))
            .expect("seeded entry");
        assert_eq!(seeded.flags(), inherit);
        let added = loaded
            .iter()
            .find(|entry| entry.qualifier().ok() == Some(Qualifier::User(uid)))
            .expect("added entry");
        assert!(added.flags().is_empty());
    }

    #[test]
    fn group_qualifier_never_yields_uid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("grouped");
        fs::write(&file, b"data").expect("write file");
        let gid = fs::metadata(&file).expect("metadata").gid();

        let mut acl = Acl::new();
        acl.push_entry(
            AclEntry::with(
                Tag::ExtendedDeny,
                Qualifier::Group(gid),
                [Perm::Delete].into_iter().collect(),
            )
            .expect("entry"),
        );
        if let Err(error) = acl.set_file_extended(&file) {
            assert!(error.is_unsupported(), "{error:?}");
            return;
        }

        let loaded = Acl::get_file_extended(&file).expect("reload");
        let qualifier = loaded.get(0).expect("entry").qualifier().expect("qualifier");
        assert_eq!(qualifier.gid(), Some(gid));
        assert_eq!(qualifier.uid(), None);
    }

    #[test]
    fn base_entries_reflect_owner_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("based");
        fs::write(&file, b"data").expect("write file");
        fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).expect("chmod");

        let acl = Acl::with_base_entries(&file).expect("base entries");
        assert_eq!(acl.len(), 1);
        let entry = acl.get(0).expect("entry");
        assert_eq!(entry.tag(), Tag::ExtendedAllow);
        assert_eq!(entry.qualifier().expect("qualifier"), Qualifier::User(owner_of(&file)));
        assert_eq!(entry.permset().to_string(), "Read, Write");
    }

    #[test]
    fn missing_qualifier_is_rejected_before_any_os_call() {
        let mut acl = Acl::new();
        acl.create_entry()
            .expect("entry")
            .set_tag(Tag::ExtendedAllow)
            .expect("tag");
        let error = acl.set_file_extended(Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(error, AclError::Invalid(_)), "{error:?}");
    }
}
