//! Textual ACL form.
//!
//! POSIX entries use the long text form of `acl_to_text(3)`
//! (`user::rw-`, `group:20:r-x`, `mask::rwx`, `other::---`). Darwin entries
//! use `allow:user:501:Read, Write` / `deny:group:20:Delete`, followed by
//! `:file_inherit,directory_inherit` when the entry carries inheritance flags.
//!
//! Rendering is best effort: entries that are not yet complete (an undefined
//! tag, or a named or extended entry without a qualifier) still print, as
//! `undefined::`, `user:?:---`, or `allow::`, but do not parse back.

use std::fmt;

use crate::entry::AclEntry;
use crate::error::{AclError, Result};
use crate::flags::EntryFlags;
use crate::perm::Perm;
use crate::permset::Permset;
use crate::qualifier::Qualifier;
use crate::tag::Tag;

pub(crate) fn write_entry(f: &mut fmt::Formatter<'_>, entry: &AclEntry) -> fmt::Result {
    let tag = entry.tag();
    let qualifier = entry.bound_qualifier();
    let permset = entry.permset();

    if tag.is_extended() {
        match qualifier {
            Qualifier::User(uid) => write!(f, "{}:user:{uid}:{permset}", tag.name())?,
            Qualifier::Group(gid) => write!(f, "{}:group:{gid}:{permset}", tag.name())?,
            Qualifier::None => write!(f, "{}::{permset}", tag.name())?,
        }
        let flags = entry.flags();
        if !flags.is_empty() {
            write!(f, ":{flags}")?;
        }
        return Ok(());
    }
    if tag == Tag::Undefined {
        return write!(f, "{}::{permset}", tag.name());
    }

    write!(f, "{}:", tag.name())?;
    if tag.takes_qualifier() {
        match qualifier.id() {
            Some(id) => write!(f, "{id}")?,
            None => f.write_str("?")?,
        }
    }
    write!(f, ":{}", permset.mode_string())
}

pub(crate) fn parse(input: &str) -> Result<Vec<AclEntry>> {
    let mut entries = Vec::new();
    for line in input.lines() {
        let line = line.split_once('#').map_or(line, |(body, _)| body).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("allow:") || line.starts_with("deny:") {
            entries.push(parse_extended(line)?);
            continue;
        }
        for field in line.split(',').map(str::trim).filter(|field| !field.is_empty()) {
            entries.push(parse_posix(field)?);
        }
    }
    Ok(entries)
}

fn parse_posix(text: &str) -> Result<AclEntry> {
    let mut fields = text.split(':');
    let (Some(kind), Some(id), Some(perms), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(AclError::parse(text, "expected tag:qualifier:perms"));
    };

    let id = id.trim();
    let named = !id.is_empty();
    let (tag, qualifier) = match (kind.trim(), named) {
        ("user" | "u", false) => (Tag::UserObj, Qualifier::None),
        ("user" | "u", true) => (Tag::User, Qualifier::User(parse_id(text, id)?)),
        ("group" | "g", false) => (Tag::GroupObj, Qualifier::None),
        ("group" | "g", true) => (Tag::Group, Qualifier::Group(parse_id(text, id)?)),
        ("mask" | "m", false) => (Tag::Mask, Qualifier::None),
        ("other" | "o", false) => (Tag::Other, Qualifier::None),
        ("mask" | "m" | "other" | "o", true) => {
            return Err(AclError::parse(text, "this tag does not take a qualifier"));
        }
        (other, _) => {
            return Err(AclError::parse(text, format!("unknown tag '{other}'")));
        }
    };

    let permset = parse_mode_perms(text, perms.trim())?;
    AclEntry::with(tag, qualifier, permset).map_err(|error| AclError::parse(text, error.to_string()))
}

fn parse_extended(text: &str) -> Result<AclEntry> {
    let mut fields = text.splitn(5, ':');
    let (Some(kind), Some(subject), Some(id), Some(perms)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(AclError::parse(text, "expected allow|deny:user|group:id:perms"));
    };
    let flags = fields
        .next()
        .map_or(Ok(EntryFlags::new()), |names| EntryFlags::parse(text, names))?;

    let tag = if kind == "allow" {
        Tag::ExtendedAllow
    } else {
        Tag::ExtendedDeny
    };
    let id = parse_id(text, id.trim())?;
    let qualifier = match subject.trim() {
        "user" => Qualifier::User(id),
        "group" => Qualifier::Group(id),
        other => {
            return Err(AclError::parse(text, format!("unknown subject '{other}'")));
        }
    };

    let mut permset = Permset::new();
    for name in perms.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let perm: Perm = name.parse()?;
        permset
            .add_perm(perm)
            .map_err(|error| AclError::parse(text, error.to_string()))?;
    }
    let mut entry = AclEntry::with(tag, qualifier, permset)
        .map_err(|error| AclError::parse(text, error.to_string()))?;
    entry
        .set_flags(flags)
        .map_err(|error| AclError::parse(text, error.to_string()))?;
    Ok(entry)
}

fn parse_id(text: &str, id: &str) -> Result<u32> {
    id.parse()
        .map_err(|_| AclError::parse(text, format!("'{id}' is not a numeric id")))
}

fn parse_mode_perms(text: &str, perms: &str) -> Result<Permset> {
    if perms.len() > 3 {
        return Err(AclError::parse(text, "expected at most three of r, w, x"));
    }
    let mut set = Permset::new();
    for ch in perms.chars() {
        let perm = match ch {
            'r' => Perm::Read,
            'w' => Perm::Write,
            'x' => Perm::Execute,
            '-' => continue,
            other => {
                return Err(AclError::parse(text, format!("unexpected permission '{other}'")));
            }
        };
        set.add_perm(perm)?;
    }
    Ok(set)
}
