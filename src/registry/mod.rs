//! Script registry: name → descriptor.
//!
//! A process-wide registry is available through [`global`]. It is meant to be
//! filled once at startup (by [`register_script`] calls or manifest loading)
//! and only read afterwards. Tests and embedders can use their own
//! [`Registry`] instead.

mod descriptor;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{const_rwlock, RwLock};
use tracing::debug;

use crate::error::RegistryError;

pub use descriptor::{script_fn, DescriptorBuilder, FnScript, Script, ScriptDescriptor};

/// Registered scripts, keyed by unique name.
#[derive(Debug, Default)]
pub struct Registry {
    scripts: BTreeMap<String, Arc<ScriptDescriptor>>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            scripts: BTreeMap::new(),
        }
    }

    /// Store a descriptor. Names are unique for the lifetime of the registry.
    pub fn register(
        &mut self,
        descriptor: ScriptDescriptor,
    ) -> Result<Arc<ScriptDescriptor>, RegistryError> {
        if self.scripts.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateRegistration {
                name: descriptor.name().to_string(),
            });
        }
        debug!(
            script = descriptor.name(),
            supports = ?descriptor.supported_forms(),
            "Registered script"
        );
        let descriptor = Arc::new(descriptor);
        self.scripts
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn get(&self, name: &str) -> Result<Arc<ScriptDescriptor>, RegistryError> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.scripts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ScriptDescriptor>> {
        self.scripts.values()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

static GLOBAL: RwLock<Registry> = const_rwlock(Registry::new());

/// The process-wide registry.
pub fn global() -> &'static RwLock<Registry> {
    &GLOBAL
}

/// Register a script in the process-wide registry.
///
/// # Example
///
/// ```
/// use cliroute::parser::{base_command, StandardFlag};
/// use cliroute::registry::{register_script, script_fn};
///
/// register_script(
///     "process-fonts",
///     Some("Process font metadata"),
///     &["-R", "-v", "--dry-run", "--format <FORMAT>"],
///     script_fn(
///         || base_command("process-fonts", None, &StandardFlag::ALL),
///         |_args| Ok(()),
///     ),
/// )
/// .unwrap();
/// ```
pub fn register_script<S: Script + 'static>(
    name: &str,
    description: Option<&str>,
    supports: &[&str],
    script: S,
) -> Result<Arc<ScriptDescriptor>, RegistryError> {
    let mut builder = ScriptDescriptor::builder(name).supports(supports.iter().copied());
    if let Some(description) = description {
        builder = builder.description(description);
    }
    let descriptor = builder.build(script)?;
    global().write().register(descriptor)
}
