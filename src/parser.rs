//! Base parser: a clap `Command` with the standard flags built in.
//!
//! Scripts build their own parser on top of [`base_command`], choosing which
//! standard flags they expose. `-h/--help` is always present.

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::{Deserialize, Serialize};

use crate::args::{catalog, FlagArity, FlagDecl, FlagSpec};

/// Standard flags a script parser may opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardFlag {
    Recursive,
    DryRun,
    Yes,
    Verbose,
}

impl StandardFlag {
    /// Every selectable standard flag (the default selection).
    pub const ALL: [StandardFlag; 4] = [
        StandardFlag::Recursive,
        StandardFlag::DryRun,
        StandardFlag::Yes,
        StandardFlag::Verbose,
    ];

    /// Canonical catalog name.
    pub fn name(self) -> &'static str {
        match self {
            StandardFlag::Recursive => "recursive",
            StandardFlag::DryRun => "dry-run",
            StandardFlag::Yes => "yes",
            StandardFlag::Verbose => "verbose",
        }
    }

    /// Catalog entry for this flag.
    pub fn spec(self) -> &'static FlagSpec {
        // Catalog order: help, recursive, dry-run, yes, verbose
        let index = match self {
            StandardFlag::Recursive => 1,
            StandardFlag::DryRun => 2,
            StandardFlag::Yes => 3,
            StandardFlag::Verbose => 4,
        };
        &catalog::all()[index]
    }
}

/// Build a parser exposing the selected standard flags.
///
/// Pass [`StandardFlag::ALL`] for the usual set or `&[]` to opt out.
pub fn base_command(
    name: impl Into<String>,
    about: Option<&str>,
    standard_flags: &[StandardFlag],
) -> Command {
    let mut command = Command::new(name.into());
    if let Some(about) = about {
        command = command.about(about.to_string());
    }
    for flag in standard_flags {
        command = command.arg(standard_arg(flag.spec()));
    }
    command
}

fn standard_arg(spec: &'static FlagSpec) -> Arg {
    let mut arg = Arg::new(spec.name)
        .action(ArgAction::SetTrue)
        .help(spec.help);
    if let Some(short) = spec.short() {
        arg = arg.short(short);
    }
    if let Some(long) = spec.long() {
        arg = arg.long(long);
    }
    arg
}

/// Clap argument for a script-private flag declaration.
pub fn private_arg(decl: &FlagDecl) -> Arg {
    let mut arg = Arg::new(decl.name.clone());
    if let Some(short) = decl.short() {
        arg = arg.short(short);
    }
    if let Some(long) = decl.long() {
        arg = arg.long(long.to_string());
    }
    match decl.arity {
        FlagArity::Boolean => arg.action(ArgAction::SetTrue),
        FlagArity::Value => {
            // The router hands over the next token whatever its shape.
            let arg = arg
                .action(ArgAction::Set)
                .num_args(1)
                .allow_hyphen_values(true);
            match &decl.value_name {
                Some(value_name) => arg.value_name(value_name.clone()),
                None => arg,
            }
        }
    }
}

/// Values of the standard flags after parsing.
///
/// Flags the parser did not expose read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardFlagValues {
    pub recursive: bool,
    pub dry_run: bool,
    pub yes: bool,
    pub verbose: bool,
}

impl StandardFlagValues {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let flag = |flag: StandardFlag| {
            matches
                .try_get_one::<bool>(flag.name())
                .ok()
                .flatten()
                .copied()
                .unwrap_or(false)
        };
        Self {
            recursive: flag(StandardFlag::Recursive),
            dry_run: flag(StandardFlag::DryRun),
            yes: flag(StandardFlag::Yes),
            verbose: flag(StandardFlag::Verbose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_standard_flags_by_default() {
        let matches = base_command("simple", Some("Process files"), &StandardFlag::ALL)
            .try_get_matches_from(["simple", "-R", "--dry-run", "-y", "--verbose"])
            .unwrap();
        let values = StandardFlagValues::from_matches(&matches);
        assert_eq!(
            values,
            StandardFlagValues {
                recursive: true,
                dry_run: true,
                yes: true,
                verbose: true
            }
        );
    }

    #[test]
    fn test_spec_matches_catalog_name() {
        for flag in StandardFlag::ALL {
            assert_eq!(flag.spec().name, flag.name());
        }
    }

    #[test]
    fn test_opt_out_rejects_standard_flags() {
        let result = base_command("bare", None, &[]).try_get_matches_from(["bare", "-R"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subset_reads_missing_flags_as_false() {
        let matches = base_command("partial", None, &[StandardFlag::Verbose])
            .try_get_matches_from(["partial", "-v"])
            .unwrap();
        let values = StandardFlagValues::from_matches(&matches);
        assert!(values.verbose);
        assert!(!values.recursive);
        assert!(!values.dry_run);
    }

    #[test]
    fn test_private_value_arg() {
        let decl = FlagDecl::parse("-f, --format <FORMAT>").unwrap();
        let matches = base_command("fmt", None, &[])
            .arg(private_arg(&decl))
            .try_get_matches_from(["fmt", "--format", "json"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("format").map(String::as_str),
            Some("json")
        );
    }

    #[test]
    fn test_standard_flag_names_deserialize_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            flags: Vec<StandardFlag>,
        }
        let parsed: Wrapper = toml::from_str(r#"flags = ["dry-run", "verbose"]"#).unwrap();
        assert_eq!(parsed.flags, vec![StandardFlag::DryRun, StandardFlag::Verbose]);
    }
}
