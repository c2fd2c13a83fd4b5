//! Shared command-line vocabulary for multi-script projects, and a
//! coordinator that runs several scripts from one combined invocation,
//! giving each script only the flags it declared.
//!
//! ```
//! use cliroute::args::route;
//! use cliroute::parser::{base_command, StandardFlag};
//! use cliroute::registry::{script_fn, Registry, ScriptDescriptor};
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(
//!         ScriptDescriptor::builder("validate")
//!             .supports(["-R", "-v"])
//!             .build(script_fn(
//!                 || base_command("validate", None, &StandardFlag::ALL),
//!                 |_| Ok(()),
//!             ))
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let tokens: Vec<String> = ["a.txt", "-R", "--format", "json"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let routing = route(&registry, &tokens, &["validate"]).unwrap();
//! assert_eq!(routing.tokens("validate").unwrap(), ["a.txt", "-R"]);
//! assert_eq!(routing.unrecognized(), ["--format"]);
//! ```

pub mod args;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;
pub mod registry;

pub use coordinator::{BatchResults, Coordinator, ExecutionResult, Outcome};
pub use error::{ExitCode, LoadError, LoadErrors, RegistryError, RouteError};
pub use registry::{register_script, Registry, Script, ScriptDescriptor};
