//! Error types for registration, routing and manifest loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Exit codes following Unix conventions.
pub struct ExitCode;

impl ExitCode {
    pub const SUCCESS: i32 = 0;
    pub const ERROR: i32 = 1;
    /// Invalid arguments or usage.
    pub const USAGE_ERROR: i32 = 2;
}

/// Errors raised while registering or looking up scripts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Script name must not be empty")]
    EmptyName,

    #[error("Script '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("Malformed flag declaration '{declaration}': {reason}")]
    MalformedFlagDeclaration { declaration: String, reason: String },

    #[error("Script '{name}' not found")]
    NotFound { name: String },
}

/// Structural routing failures. Nothing is routed when one of these occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Script '{name}' not found")]
    NotFound { name: String },

    #[error("Flag '{flag}' requires a value")]
    MissingFlagValue { flag: String },

    #[error("Flag '{form}' is declared differently by '{first}' and '{second}'")]
    ConflictingFlag {
        form: String,
        first: String,
        second: String,
    },

    #[error("Unrecognized flags: {}", flags.join(", "))]
    UnrecognizedFlags { flags: Vec<String> },
}

/// A script manifest that could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid manifest '{path}': {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Failed to register manifest '{path}': {source}")]
    Register {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
}

impl LoadError {
    /// Path of the manifest that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Read { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Invalid { path, .. }
            | LoadError::Register { path, .. } => path,
        }
    }
}

/// Failures collected from one `load_scripts` call.
///
/// Scripts that did load stay registered; `loaded` lists them.
#[derive(Debug)]
pub struct LoadErrors {
    pub loaded: Vec<String>,
    pub failures: Vec<LoadError>,
}

impl fmt::Display for LoadErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} manifest(s) failed to load", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadErrors {}
