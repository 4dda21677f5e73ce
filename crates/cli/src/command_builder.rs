use std::ffi::OsString;
use std::path::PathBuf;

use acl::Perm;
use clap::{Arg, ArgAction, Command, builder::OsStringValueParser, value_parser};

pub(crate) const PROGRAM_NAME: &str = "facl";

/// Uid granted access when `--uid` is not given.
pub(crate) const DEFAULT_UID: &str = "501";

/// Permissions granted when no `--perm` is given.
pub(crate) const DEFAULT_PERMS: [Perm; 2] = [Perm::ReadExtAttributes, Perm::WriteExtAttributes];

/// Options recognised on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedArgs {
    pub(crate) file: Option<PathBuf>,
    pub(crate) uid: u32,
    pub(crate) perms: Vec<Perm>,
    pub(crate) show: bool,
    pub(crate) verbose: u8,
}

fn parse_perm(value: &str) -> Result<Perm, String> {
    value.parse::<Perm>().map_err(|error| error.to_string())
}

pub(crate) fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Print or patch the ACL of a file")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("File whose ACL is read or patched.")
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("uid")
                .long("uid")
                .short('u')
                .value_name("UID")
                .help("User granted the permissions in patch mode.")
                .value_parser(value_parser!(u32))
                .default_value(DEFAULT_UID),
        )
        .arg(
            Arg::new("perm")
                .long("perm")
                .short('p')
                .value_name("NAME")
                .help("Permission to grant; repeat for several (default: ReadExtAttributes, WriteExtAttributes).")
                .value_parser(parse_perm)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .short('s')
                .help("Print the access and extended ACLs without changing anything.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase logging verbosity; repeat for more detail.")
                .action(ArgAction::Count),
        )
}

pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();

    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let matches = clap_command().try_get_matches_from(args)?;

    let file = matches.get_one::<OsString>("file").map(PathBuf::from);
    let uid = matches
        .get_one::<u32>("uid")
        .copied()
        .unwrap_or_default();
    let perms = matches
        .get_many::<Perm>("perm")
        .map_or_else(|| DEFAULT_PERMS.to_vec(), |values| values.copied().collect());

    Ok(ParsedArgs {
        file,
        uid,
        perms,
        show: matches.get_flag("show"),
        verbose: matches.get_count("verbose"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_patch_uid_501_with_extattr_perms() {
        let parsed = parse_args(["facl", "target.txt"]).expect("parse");
        assert_eq!(parsed.file, Some(PathBuf::from("target.txt")));
        assert_eq!(parsed.uid, 501);
        assert_eq!(parsed.perms, DEFAULT_PERMS.to_vec());
        assert!(!parsed.show);
        assert_eq!(parsed.verbose, 0);
    }

    #[test]
    fn file_is_optional_for_the_parser() {
        let parsed = parse_args(["facl"]).expect("parse");
        assert_eq!(parsed.file, None);

        let parsed = parse_args(Vec::<OsString>::new()).expect("parse");
        assert_eq!(parsed.file, None);
    }

    #[test]
    fn repeated_perms_replace_the_default() {
        let parsed = parse_args([
            "facl", "--perm", "read", "-p", "Write", "--uid", "1000", "-vv", "file",
        ])
        .expect("parse");
        assert_eq!(parsed.perms, vec![Perm::Read, Perm::Write]);
        assert_eq!(parsed.uid, 1000);
        assert_eq!(parsed.verbose, 2);
    }

    #[test]
    fn unknown_perm_is_rejected() {
        let error = parse_args(["facl", "--perm", "Fly", "file"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn negative_uid_is_rejected() {
        assert!(parse_args(["facl", "--uid", "-1", "file"]).is_err());
    }

    #[test]
    fn show_flag() {
        assert!(parse_args(["facl", "--show", "file"]).expect("parse").show);
    }
}
