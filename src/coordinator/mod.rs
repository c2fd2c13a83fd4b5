//! Coordinator: loads scripts, routes one combined invocation, runs each
//! target with its own arguments.
//!
//! Targets run sequentially, in the order given. Routing is all-or-nothing:
//! if it fails, no script starts. Once routing succeeds, a failing script
//! never prevents the next one from running.

mod manifest;
mod results;

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::error::ErrorKind;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::args::{route, RoutingResult};
use crate::error::{ExitCode, LoadError, LoadErrors, RouteError};
use crate::registry::{self, Registry, ScriptDescriptor};

pub use manifest::{ExternalScript, Manifest, PositionalConfig};
pub use results::{BatchResults, ExecutionResult, Outcome};

/// Manifest file extension picked up by [`Coordinator::load_scripts_from_dir`].
pub const MANIFEST_EXTENSION: &str = "toml";

/// Runs registered scripts with per-script filtered arguments.
pub struct Coordinator<'r> {
    registry: &'r RwLock<Registry>,
    strict: bool,
}

impl Coordinator<'static> {
    /// Coordinator over the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(registry::global())
    }
}

impl Default for Coordinator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Coordinator<'r> {
    pub fn with_registry(registry: &'r RwLock<Registry>) -> Self {
        Self {
            registry,
            strict: false,
        }
    }

    /// In strict mode, unrecognized flags fail routing.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Load and register one manifest. Returns the registered name.
    pub fn load_manifest(&self, path: &Path) -> Result<String, LoadError> {
        let descriptor = Manifest::load(path)?.into_descriptor(path)?;
        let registered = self
            .registry
            .write()
            .register(descriptor)
            .map_err(|source| LoadError::Register {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(registered.name().to_string())
    }

    /// Load every manifest in `paths`.
    ///
    /// All paths are attempted. Scripts that load stay registered even when
    /// others fail; the error lists the failures.
    pub fn load_scripts<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<String>, LoadErrors> {
        let mut loaded = Vec::new();
        let mut failures = Vec::new();

        for path in paths {
            match self.load_manifest(path.as_ref()) {
                Ok(name) => loaded.push(name),
                Err(err) => {
                    warn!(path = %err.path().display(), error = %err, "Could not load script");
                    failures.push(err);
                }
            }
        }

        if failures.is_empty() {
            Ok(loaded)
        } else {
            Err(LoadErrors { loaded, failures })
        }
    }

    /// Load every `*.toml` manifest in a directory, skipping names that
    /// start with `_`. Files load in sorted order.
    pub fn load_scripts_from_dir(&self, dir: &Path) -> Result<Vec<String>, LoadErrors> {
        let entries = fs::read_dir(dir).map_err(|e| LoadErrors {
            loaded: Vec::new(),
            failures: vec![LoadError::Read {
                path: dir.to_path_buf(),
                source: e,
            }],
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION)
                    && !path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with('_'))
            })
            .collect();
        paths.sort();

        self.load_scripts(&paths)
    }

    /// Route `args` to `scripts`, applying strict mode.
    pub fn route<S: AsRef<str>>(
        &self,
        scripts: &[S],
        args: &[String],
    ) -> Result<RoutingResult, RouteError> {
        let routing = route(&self.registry.read(), args, scripts)?;
        if self.strict && !routing.unrecognized().is_empty() {
            return Err(RouteError::UnrecognizedFlags {
                flags: routing.unrecognized().to_vec(),
            });
        }
        Ok(routing)
    }

    /// Run `scripts` in order, each with its routed slice of `args`.
    pub fn run<S: AsRef<str>>(&self, scripts: &[S], args: &[String]) -> BatchResults {
        let routing = match self.route(scripts, args) {
            Ok(routing) => routing,
            Err(err) => {
                warn!(error = %err, "Routing failed, no script was run");
                return BatchResults::aborted(scripts, err);
            }
        };

        let mut results = BatchResults::default();
        for name in scripts {
            let name = name.as_ref();
            // The lock is released before the script runs.
            let descriptor = self.registry.read().get(name);
            let result = match descriptor {
                Ok(descriptor) => {
                    let argv = routing.parser_args(name).unwrap_or_default();
                    run_single_script(&descriptor, argv)
                }
                Err(err) => ExecutionResult::failed(name, ExitCode::ERROR, err.to_string()),
            };
            match &result.outcome {
                Outcome::Failed { reason } => info!(script = name, reason = %reason, "Script failed"),
                _ => info!(script = name, "Script passed"),
            }
            results.results.push(result);
        }
        results
    }

    /// Registered script names, sorted.
    pub fn list_scripts(&self) -> Vec<String> {
        self.registry.read().names()
    }

    pub fn script_info(&self, name: &str) -> Option<Arc<ScriptDescriptor>> {
        self.registry.read().get(name).ok()
    }
}

/// Parse one script's routed tokens with its own parser and run it.
///
/// Building the parser, parsing and running all happen under the unwind
/// guard; a panic in any of them fails only this script.
fn run_single_script(descriptor: &ScriptDescriptor, argv: Vec<String>) -> ExecutionResult {
    let name = descriptor.name();
    let script = Arc::clone(descriptor.script());
    let argv = std::iter::once(name.to_string()).chain(argv);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        match script.parser().try_get_matches_from(argv) {
            Ok(matches) => ScriptRun::Finished(script.run(&matches)),
            Err(err) => ScriptRun::Rejected(err),
        }
    }));

    match outcome {
        Ok(ScriptRun::Finished(Ok(()))) => ExecutionResult::passed(name),
        Ok(ScriptRun::Finished(Err(err))) => {
            ExecutionResult::failed(name, ExitCode::ERROR, format!("{:#}", err))
        }
        Ok(ScriptRun::Rejected(err))
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            if let Err(io_err) = err.print() {
                warn!(script = name, error = %io_err, "Could not print script help");
            }
            ExecutionResult::passed(name)
        }
        Ok(ScriptRun::Rejected(err)) => ExecutionResult::failed(
            name,
            ExitCode::USAGE_ERROR,
            format!("argument parsing failed: {}", parse_error_reason(&err)),
        ),
        Err(payload) => ExecutionResult::failed(
            name,
            ExitCode::ERROR,
            format!("panicked: {}", panic_message(payload.as_ref())),
        ),
    }
}

/// How far a script got before returning.
enum ScriptRun {
    /// Its parser rejected the routed tokens (or printed help/version).
    Rejected(clap::Error),
    /// It ran; the entry function's result.
    Finished(anyhow::Result<()>),
}

/// First line of a clap error, without the `error: ` prefix.
fn parse_error_reason(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
