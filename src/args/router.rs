//! Router: ties classification and assembly together for a set of targets.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::args::assembler::{ArgAssembler, RoutedArgs};
use crate::args::classifier::{classify, FlagTable};
use crate::error::RouteError;
use crate::registry::{Registry, ScriptDescriptor};

/// Per-script token lists produced by one `route` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingResult {
    routes: Vec<(String, RoutedArgs)>,
    unrecognized: Vec<String>,
}

impl RoutingResult {
    /// Routed tokens for a target.
    pub fn tokens(&self, name: &str) -> Option<&[String]> {
        self.routed(name).map(RoutedArgs::tokens)
    }

    /// Parser-ready tokens for a target (see [`RoutedArgs::parser_args`]).
    pub fn parser_args(&self, name: &str) -> Option<Vec<String>> {
        self.routed(name).map(RoutedArgs::parser_args)
    }

    /// Routed arguments for a target, with the terminator position.
    pub fn routed(&self, name: &str) -> Option<&RoutedArgs> {
        self.routes
            .iter()
            .find(|(target, _)| target == name)
            .map(|(_, routed)| routed)
    }

    /// Targets in the order they were requested.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(name, _)| name.as_str())
    }

    /// Flag-shaped tokens no target (and no standard flag) recognized.
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }
}

/// Route a combined token stream to each target.
///
/// All targets are resolved before any token is looked at. Structural
/// failures return an error and no partial result.
pub fn route<S: AsRef<str>>(
    registry: &Registry,
    tokens: &[String],
    targets: &[S],
) -> Result<RoutingResult, RouteError> {
    // Stage 1: Resolve targets
    let descriptors = targets
        .iter()
        .map(|name| {
            registry
                .get(name.as_ref())
                .map_err(|_| RouteError::NotFound {
                    name: name.as_ref().to_string(),
                })
        })
        .collect::<Result<Vec<Arc<ScriptDescriptor>>, _>>()?;

    // Stage 2: Merge flag declarations
    let mut table = FlagTable::standard();
    for descriptor in &descriptors {
        for decl in descriptor.supports() {
            table.declare(descriptor.name(), decl)?;
        }
    }

    // Stage 3: Classify once for every target
    let classified = classify(tokens, &table)?;
    if !classified.unrecognized.is_empty() {
        warn!(
            flags = ?classified.unrecognized,
            "Unrecognized flags are not forwarded to any script"
        );
    }

    // Stage 4: Assemble per target
    let routes = descriptors
        .iter()
        .map(|descriptor| {
            let routed = ArgAssembler::new(descriptor.supports()).build(&classified.args);
            debug!(script = descriptor.name(), tokens = ?routed.tokens(), "Routed arguments");
            (descriptor.name().to_string(), routed)
        })
        .collect();

    Ok(RoutingResult {
        routes,
        unrecognized: classified.unrecognized,
    })
}
