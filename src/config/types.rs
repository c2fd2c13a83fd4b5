use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

/// Routing behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Treat unrecognized flags as a routing failure (default: false).
    #[serde(default)]
    pub strict: bool,
}

/// Where scripts come from and which ones run by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// Manifest files to load.
    #[serde(default)]
    pub manifests: Vec<PathBuf>,
    /// Directories scanned for `*.toml` manifests.
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    /// Scripts run when none are selected on the command line.
    /// Empty means all registered scripts.
    #[serde(default)]
    pub default: Vec<String>,
}
