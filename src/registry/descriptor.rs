//! Script descriptors: what a registered script declares about itself.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgMatches, Command};

use crate::args::FlagDecl;
use crate::error::RegistryError;

/// A script the coordinator can run.
///
/// `parser` is the parser factory: it is called once per run to build a
/// fresh parser for the script's routed tokens.
pub trait Script: Send + Sync {
    fn parser(&self) -> Command;

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()>;
}

/// A [`Script`] made from two closures.
pub struct FnScript<P, R> {
    parser: P,
    run: R,
}

/// Build a script from a parser factory and an entry function.
pub fn script_fn<P, R>(parser: P, run: R) -> FnScript<P, R>
where
    P: Fn() -> Command + Send + Sync,
    R: Fn(&ArgMatches) -> anyhow::Result<()> + Send + Sync,
{
    FnScript { parser, run }
}

impl<P, R> Script for FnScript<P, R>
where
    P: Fn() -> Command + Send + Sync,
    R: Fn(&ArgMatches) -> anyhow::Result<()> + Send + Sync,
{
    fn parser(&self) -> Command {
        (self.parser)()
    }

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()> {
        (self.run)(args)
    }
}

/// Immutable record of one registered script.
#[derive(Clone)]
pub struct ScriptDescriptor {
    name: String,
    description: Option<String>,
    supports: Vec<FlagDecl>,
    script: Arc<dyn Script>,
    source: Option<PathBuf>,
}

impl ScriptDescriptor {
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            description: None,
            supports: Vec::new(),
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description given at registration, or the parser's `about`.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared flags (standard and private).
    pub fn supports(&self) -> &[FlagDecl] {
        &self.supports
    }

    /// Check if this script accepts a flag form.
    pub fn supports_flag(&self, form: &str) -> bool {
        self.supports.iter().any(|decl| decl.matches(form))
    }

    /// Every accepted flag form, sorted.
    pub fn supported_forms(&self) -> Vec<&str> {
        let mut forms: Vec<&str> = self
            .supports
            .iter()
            .flat_map(|decl| decl.forms.iter().map(String::as_str))
            .collect();
        forms.sort_unstable();
        forms.dedup();
        forms
    }

    pub fn script(&self) -> &Arc<dyn Script> {
        &self.script
    }

    /// Manifest the script was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl fmt::Debug for ScriptDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("supports", &self.supports)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ScriptDescriptor`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    description: Option<String>,
    supports: Vec<String>,
    source: Option<PathBuf>,
}

impl DescriptorBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare supported flags, e.g. `["-R", "--format <FORMAT>"]`.
    pub fn supports<I, S>(mut self, declarations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supports
            .extend(declarations.into_iter().map(Into::into));
        self
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn build<S: Script + 'static>(self, script: S) -> Result<ScriptDescriptor, RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let supports = self
            .supports
            .iter()
            .map(|d| FlagDecl::parse(d))
            .collect::<Result<Vec<_>, _>>()?;

        let description = self
            .description
            .or_else(|| script.parser().get_about().map(|about| about.to_string()));

        Ok(ScriptDescriptor {
            name: self.name,
            description,
            supports,
            script: Arc::new(script),
            source: self.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> impl Script {
        script_fn(|| Command::new("noop").about("Does nothing"), |_| Ok(()))
    }

    #[test]
    fn test_description_falls_back_to_parser_about() {
        let descriptor = ScriptDescriptor::builder("noop").build(noop()).unwrap();
        assert_eq!(descriptor.description(), Some("Does nothing"));

        let descriptor = ScriptDescriptor::builder("noop")
            .description("Explicit")
            .build(noop())
            .unwrap();
        assert_eq!(descriptor.description(), Some("Explicit"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ScriptDescriptor::builder("  ").build(noop()).unwrap_err();
        assert_eq!(err, RegistryError::EmptyName);
    }

    #[test]
    fn test_supported_forms_cover_standard_aliases() {
        let descriptor = ScriptDescriptor::builder("noop")
            .supports(["-v", "--format <FMT>"])
            .build(noop())
            .unwrap();
        assert_eq!(
            descriptor.supported_forms(),
            vec!["--format", "--verbose", "-v"]
        );
        assert!(descriptor.supports_flag("--verbose"));
        assert!(!descriptor.supports_flag("-R"));
    }

    #[test]
    fn test_empty_supports_is_allowed() {
        let descriptor = ScriptDescriptor::builder("noop").build(noop()).unwrap();
        assert!(descriptor.supports().is_empty());
    }
}
