//! Shared test utilities: token helpers and recording scripts.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use anyhow::bail;
use clap::{Arg, ArgAction};
use cliroute::args::FlagDecl;
use cliroute::parser::{base_command, private_arg, StandardFlag, StandardFlagValues};
use cliroute::registry::{script_fn, Registry, Script, ScriptDescriptor};
use parking_lot::{Mutex, RwLock};

pub fn raw_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// What a recording script saw when it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub script: String,
    pub files: Vec<String>,
    pub flags: StandardFlagValues,
    pub format: Option<String>,
}

pub type InvocationLog = Arc<Mutex<Vec<Invocation>>>;

/// How a recording script behaves when run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// A script that accepts the standard flags, the given private
/// declarations and any number of `files`, and records each run.
pub fn recording_script(
    name: &str,
    private: &[&str],
    behavior: Behavior,
    log: InvocationLog,
) -> impl Script {
    let name = name.to_string();
    let decls: Vec<FlagDecl> = private
        .iter()
        .map(|d| FlagDecl::parse(d).unwrap())
        .collect();
    let parser_name = name.clone();
    script_fn(
        move || {
            let mut command = base_command(parser_name.clone(), Some("Recording script"), &StandardFlag::ALL);
            for decl in &decls {
                command = command.arg(private_arg(decl));
            }
            command.arg(Arg::new("files").action(ArgAction::Append).num_args(0usize..))
        },
        move |matches| {
            log.lock().push(Invocation {
                script: name.clone(),
                files: matches
                    .get_many::<String>("files")
                    .map(|v| v.cloned().collect())
                    .unwrap_or_default(),
                flags: StandardFlagValues::from_matches(matches),
                format: matches
                    .try_get_one::<String>("format")
                    .ok()
                    .flatten()
                    .cloned(),
            });
            match behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Fail => bail!("{} failed on purpose", name),
                Behavior::Panic => panic!("{} panicked on purpose", name),
            }
        },
    )
}

/// A script whose parser accepts nothing beyond the standard flags.
pub fn noop_script(name: &str) -> impl Script {
    let name = name.to_string();
    script_fn(
        move || base_command(name.clone(), None, &StandardFlag::ALL),
        |_| Ok(()),
    )
}

/// Register a descriptor built from `supports` and `script`.
pub fn register(registry: &mut Registry, name: &str, supports: &[&str], script: impl Script + 'static) {
    let descriptor = ScriptDescriptor::builder(name)
        .supports(supports.iter().copied())
        .build(script)
        .unwrap();
    registry.register(descriptor).unwrap();
}

/// Registry with the two font scripts used across the tests:
///
/// - `process-fonts`: `-R -v --dry-run --format <FORMAT>`
/// - `validate-fonts`: `-R -v --strict`
pub fn font_registry(log: InvocationLog) -> RwLock<Registry> {
    let mut registry = Registry::new();
    register(
        &mut registry,
        "process-fonts",
        &["-R", "--recursive", "-v", "--verbose", "--dry-run", "--format <FORMAT>"],
        recording_script("process-fonts", &["--format <FORMAT>"], Behavior::Succeed, log.clone()),
    );
    register(
        &mut registry,
        "validate-fonts",
        &["-R", "--recursive", "-v", "--verbose", "--strict"],
        recording_script("validate-fonts", &["--strict"], Behavior::Succeed, log),
    );
    RwLock::new(registry)
}
