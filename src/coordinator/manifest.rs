//! Script manifests: TOML files describing external scripts.
//!
//! Loading a manifest registers an [`ExternalScript`]: its parser is built
//! from the declared flags, and running it spawns the configured command
//! with the parsed arguments.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::{Deserialize, Serialize};

use crate::args::{catalog, FlagArity, FlagDecl, TERMINATOR};
use crate::error::LoadError;
use crate::parser::{base_command, private_arg, StandardFlag};
use crate::registry::{Script, ScriptDescriptor};

/// On-disk description of one script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Executable to spawn. Relative paths with a separator resolve against
    /// the manifest's directory; bare names go through `PATH`.
    pub command: String,
    /// Fixed leading arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Supported flag declarations (e.g., "-R", "--format <FORMAT>").
    #[serde(default)]
    pub supports: Vec<String>,
    /// Standard flags the script's parser exposes.
    #[serde(default = "default_standard_flags")]
    pub standard_flags: Vec<StandardFlag>,
    #[serde(default)]
    pub positional: Option<PositionalConfig>,
}

/// The script's positional argument list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionalConfig {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

fn default_standard_flags() -> Vec<StandardFlag> {
    StandardFlag::ALL.to_vec()
}

impl Manifest {
    /// Read, parse and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|e| LoadError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let manifest: Manifest = toml::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<(), LoadError> {
        let invalid = |message: &str| LoadError::Invalid {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.command.trim().is_empty() {
            return Err(invalid("command must not be empty"));
        }
        if let Some(positional) = &self.positional {
            if positional.name.trim().is_empty() {
                return Err(invalid("positional name must not be empty"));
            }
            if positional.name == catalog::HELP
                || self.standard_flags.iter().any(|flag| flag.name() == positional.name)
            {
                return Err(invalid("positional name must not match a standard flag"));
            }
        }
        Ok(())
    }

    /// Every declared standard flag must be exposed by the script's parser.
    /// Help is always exposed.
    fn check_standard(&self, path: &Path, declared: &[FlagDecl]) -> Result<(), LoadError> {
        for decl in declared {
            let exposed = decl.name == catalog::HELP
                || self.standard_flags.iter().any(|flag| flag.name() == decl.name);
            if !exposed {
                return Err(LoadError::Invalid {
                    path: path.to_path_buf(),
                    message: format!(
                        "'{}' is in supports but not in standard_flags",
                        decl.name
                    ),
                });
            }
        }
        Ok(())
    }

    /// Private flags become parser arguments, so their ids and forms must
    /// not collide with each other or with the positional list.
    fn check_private(&self, path: &Path, declared: Vec<FlagDecl>) -> Result<Vec<FlagDecl>, LoadError> {
        let invalid = |message: String| LoadError::Invalid {
            path: path.to_path_buf(),
            message,
        };
        let mut names = HashSet::new();
        let mut forms = HashSet::new();

        for decl in &declared {
            if !names.insert(decl.name.as_str()) {
                return Err(invalid(format!("flag '{}' is declared more than once", decl.name)));
            }
            for form in &decl.forms {
                if !forms.insert(form.as_str()) {
                    return Err(invalid(format!("flag form '{}' is declared more than once", form)));
                }
            }
            if let Some(positional) = &self.positional {
                if positional.name == decl.name {
                    return Err(invalid(format!(
                        "flag '{}' has the same name as the positional list",
                        decl.name
                    )));
                }
            }
        }
        Ok(declared)
    }

    /// Turn the manifest into a registrable descriptor.
    pub fn into_descriptor(self, path: &Path) -> Result<ScriptDescriptor, LoadError> {
        let register_error = |source| LoadError::Register {
            path: path.to_path_buf(),
            source,
        };

        let (standard, private): (Vec<FlagDecl>, Vec<FlagDecl>) = self
            .supports
            .iter()
            .map(|d| FlagDecl::parse(d))
            .collect::<Result<Vec<_>, _>>()
            .map_err(register_error)?
            .into_iter()
            .partition(|decl| decl.standard);

        self.check_standard(path, &standard)?;
        let private = self.check_private(path, private)?;

        let program = resolve_program(&self.command, path);

        let script = ExternalScript {
            name: self.name.clone(),
            description: self.description.clone(),
            program,
            args: self.args,
            standard_flags: self.standard_flags,
            private,
            positional: self.positional,
        };

        let mut builder = ScriptDescriptor::builder(self.name)
            .supports(self.supports)
            .source(path);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        builder.build(script).map_err(register_error)
    }
}

fn resolve_program(command: &str, manifest_path: &Path) -> PathBuf {
    let program = PathBuf::from(command);
    if program.is_relative() && program.components().count() > 1 {
        if let Some(dir) = manifest_path.parent() {
            return dir.join(program);
        }
    }
    program
}

/// A script backed by an external executable.
#[derive(Debug, Clone)]
pub struct ExternalScript {
    name: String,
    description: Option<String>,
    program: PathBuf,
    args: Vec<String>,
    standard_flags: Vec<StandardFlag>,
    private: Vec<FlagDecl>,
    positional: Option<PositionalConfig>,
}

impl ExternalScript {
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Rebuild a normalized argv from parsed matches: standard flags, then
    /// private flags, then positionals (after `--` if any looks like a flag).
    pub fn argv(&self, matches: &ArgMatches) -> Vec<String> {
        let mut argv = Vec::new();
        let is_set = |id: &str| {
            matches
                .try_get_one::<bool>(id)
                .ok()
                .flatten()
                .copied()
                .unwrap_or(false)
        };

        for flag in &self.standard_flags {
            let spec = flag.spec();
            if is_set(spec.name) {
                if let Some(long) = spec.long() {
                    argv.push(format!("--{}", long));
                }
            }
        }

        for decl in &self.private {
            let form = decl.forms[0].clone();
            match decl.arity {
                FlagArity::Boolean if is_set(&decl.name) => argv.push(form),
                FlagArity::Boolean => {}
                FlagArity::Value => {
                    if let Ok(Some(value)) = matches.try_get_one::<String>(&decl.name) {
                        argv.push(form);
                        argv.push(value.clone());
                    }
                }
            }
        }

        if let Some(positional) = &self.positional {
            if let Ok(Some(values)) = matches.try_get_many::<String>(&positional.name) {
                let values: Vec<String> = values.cloned().collect();
                if values.iter().any(|v| v.starts_with('-')) {
                    argv.push(TERMINATOR.to_string());
                }
                argv.extend(values);
            }
        }

        argv
    }
}

impl Script for ExternalScript {
    fn parser(&self) -> Command {
        let mut command = base_command(
            self.name.clone(),
            self.description.as_deref(),
            &self.standard_flags,
        );
        for decl in &self.private {
            command = command.arg(private_arg(decl));
        }
        if let Some(positional) = &self.positional {
            command = command.arg(
                Arg::new(positional.name.clone())
                    .action(ArgAction::Append)
                    .num_args(if positional.required { 1usize.. } else { 0usize.. })
                    .required(positional.required),
            );
        }
        command
    }

    fn run(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        let argv = self.argv(matches);
        tracing::debug!(
            script = %self.name,
            program = %self.program.display(),
            args = ?argv,
            "Spawning script"
        );
        let status = Process::new(&self.program)
            .args(&self.args)
            .args(&argv)
            .status()
            .with_context(|| format!("failed to spawn '{}'", self.program.display()))?;
        if !status.success() {
            bail!("{}", status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
name = "process-fonts"
description = "Process font metadata"
command = "bin/process-fonts"
supports = ["-R", "-v", "--dry-run", "--format <FORMAT>"]

[positional]
name = "files"
required = true
"#;

    fn script() -> ExternalScript {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        ExternalScript {
            name: manifest.name,
            description: manifest.description,
            program: PathBuf::from("process-fonts"),
            args: manifest.args,
            standard_flags: manifest.standard_flags,
            private: vec![FlagDecl::parse("--format <FORMAT>").unwrap()],
            positional: manifest.positional,
        }
    }

    #[test]
    fn test_defaults_expose_all_standard_flags() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.standard_flags, StandardFlag::ALL.to_vec());
        assert!(manifest.args.is_empty());
    }

    #[test]
    fn test_relative_command_resolves_against_manifest_dir() {
        let resolved = resolve_program("bin/process-fonts", Path::new("/etc/scripts/a.toml"));
        assert_eq!(resolved, PathBuf::from("/etc/scripts/bin/process-fonts"));

        let bare = resolve_program("process-fonts", Path::new("/etc/scripts/a.toml"));
        assert_eq!(bare, PathBuf::from("process-fonts"));
    }

    #[test]
    fn test_argv_is_normalized() {
        let script = script();
        let matches = script
            .parser()
            .try_get_matches_from(["process-fonts", "-R", "--format", "otf", "a.ttf", "b.ttf"])
            .unwrap();
        assert_eq!(
            script.argv(&matches),
            vec!["--recursive", "--format", "otf", "a.ttf", "b.ttf"]
        );
    }

    #[test]
    fn test_argv_protects_dash_positionals() {
        let script = script();
        let matches = script
            .parser()
            .try_get_matches_from(["process-fonts", "--", "-odd.ttf"])
            .unwrap();
        assert_eq!(script.argv(&matches), vec!["--", "-odd.ttf"]);
    }

    #[test]
    fn test_required_positional_enforced() {
        let script = script();
        assert!(script.parser().try_get_matches_from(["process-fonts", "-R"]).is_err());
    }

    #[test]
    fn test_unknown_manifest_keys_rejected() {
        let result: Result<Manifest, _> = toml::from_str("name = \"a\"\ncommand = \"b\"\nbogus = 1\n");
        assert!(result.is_err());
    }

    fn load_error(content: &str) -> Option<String> {
        let manifest: Manifest = toml::from_str(content).unwrap();
        let path = Path::new("/etc/scripts/m.toml");
        match manifest.validate(path).and_then(|()| manifest.into_descriptor(path)) {
            Ok(_) => None,
            Err(LoadError::Invalid { message, .. }) => Some(message),
            Err(other) => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_private_flags_rejected() {
        let message = load_error(
            "name = \"m\"\ncommand = \"m\"\nsupports = [\"--format <F>\", \"--format <F>\"]\n",
        )
        .unwrap();
        assert!(message.contains("'format'"), "{message}");

        let message = load_error(
            "name = \"m\"\ncommand = \"m\"\nsupports = [\"-o, --output <P>\", \"-o, --out <P>\"]\n",
        )
        .unwrap();
        assert!(message.contains("'-o'"), "{message}");
    }

    #[test]
    fn test_private_flag_clashing_with_positional_rejected() {
        let message = load_error(
            "name = \"m\"\ncommand = \"m\"\nsupports = [\"--files\"]\n\n[positional]\nname = \"files\"\n",
        )
        .unwrap();
        assert!(message.contains("positional"), "{message}");
    }

    #[test]
    fn test_positional_clashing_with_standard_flag_rejected() {
        assert!(load_error("name = \"m\"\ncommand = \"m\"\n\n[positional]\nname = \"verbose\"\n").is_some());
        // Not exposed, so no clash.
        assert!(load_error(
            "name = \"m\"\ncommand = \"m\"\nstandard_flags = []\n\n[positional]\nname = \"verbose\"\n"
        )
        .is_none());
    }

    #[test]
    fn test_standard_flag_must_be_exposed() {
        let message = load_error(
            "name = \"m\"\ncommand = \"m\"\nsupports = [\"-R\"]\nstandard_flags = []\n",
        )
        .unwrap();
        assert!(message.contains("'recursive'"), "{message}");

        assert!(load_error(
            "name = \"m\"\ncommand = \"m\"\nsupports = [\"-h\", \"-v\"]\nstandard_flags = [\"verbose\"]\n"
        )
        .is_none());
    }

    #[test]
    fn test_hyphen_value_reaches_private_flag() {
        let script = script();
        let matches = script
            .parser()
            .try_get_matches_from(["process-fonts", "--format", "-x", "a.ttf"])
            .unwrap();
        assert_eq!(script.argv(&matches), vec!["--format", "-x", "a.ttf"]);
    }
}
