use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;

use cliroute::config::Config;
use cliroute::logging::{init_tracing, Verbosity};
use cliroute::{output, Coordinator, ExitCode, LoadErrors};

/// Run several scripts from one invocation, each with only the flags it supports.
#[derive(Parser, Debug)]
#[command(
    name = "cliroute",
    version,
    after_help = "Example: cliroute --manifest-dir scripts --scripts all fonts/*.ttf -R -v"
)]
struct Cli {
    /// Comma-separated script names, or "all"
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    scripts: Vec<String>,

    /// Script manifest to load (repeatable)
    #[arg(long = "manifest", value_name = "PATH")]
    manifests: Vec<PathBuf>,

    /// Directory of script manifests to load (repeatable)
    #[arg(long = "manifest-dir", value_name = "DIR")]
    manifest_dirs: Vec<PathBuf>,

    /// List available scripts and exit
    #[arg(long)]
    list: bool,

    /// Print the script list as JSON
    #[arg(long, requires = "list")]
    json: bool,

    /// Fail when a flag is not recognized by any selected script
    #[arg(long)]
    strict_routing: bool,

    /// Config file (default: ~/.config/cliroute/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value_t = Verbosity::Brief)]
    log_level: Verbosity,

    /// Arguments routed to the scripts
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) if !path.exists() => bail!("Config file '{}' not found", path.display()),
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let coordinator = Coordinator::new().strict(cli.strict_routing || config.routing.strict);

    for dir in config.scripts.dirs.iter().chain(&cli.manifest_dirs) {
        if let Err(errors) = coordinator.load_scripts_from_dir(dir) {
            report_load_errors(&errors);
        }
    }
    let manifests: Vec<&PathBuf> = config.scripts.manifests.iter().chain(&cli.manifests).collect();
    if let Err(errors) = coordinator.load_scripts(&manifests) {
        report_load_errors(&errors);
    }

    if cli.list {
        print_listing(&coordinator, cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let selected = select_scripts(&cli.scripts, &config.scripts.default, coordinator.list_scripts());
    if selected.is_empty() {
        eprintln!("{}", output::error("No scripts registered"));
        return Ok(ExitCode::USAGE_ERROR);
    }

    info!(scripts = ?selected, args = ?cli.args, "Running scripts");
    let results = coordinator.run(&selected, &cli.args);
    println!();
    output::emit(&results.summary());
    Ok(results.exit_code())
}

/// Command-line selection wins over the config default; "all" (or nothing
/// selected anywhere) means every registered script.
fn select_scripts(cli: &[String], config_default: &[String], registered: Vec<String>) -> Vec<String> {
    let requested: Vec<String> = cli
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let requested = if requested.is_empty() {
        config_default.to_vec()
    } else {
        requested
    };
    if requested.is_empty() || requested.iter().any(|s| s == "all") {
        registered
    } else {
        requested
    }
}

fn report_load_errors(errors: &LoadErrors) {
    for failure in &errors.failures {
        eprintln!("{}", output::warning(&failure.to_string()));
    }
}

fn print_listing(coordinator: &Coordinator<'_>, as_json: bool) -> Result<()> {
    let scripts: Vec<_> = coordinator
        .list_scripts()
        .iter()
        .filter_map(|name| coordinator.script_info(name))
        .collect();

    if as_json {
        let listing: Vec<_> = scripts
            .iter()
            .map(|s| {
                json!({
                    "name": s.name(),
                    "description": s.description(),
                    "supports": s.supported_forms(),
                    "source": s.source().map(|p| p.display().to_string()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Available scripts:");
    for script in &scripts {
        println!("  {}: {}", script.name(), script.description().unwrap_or(script.name()));
        println!("    Supports: {}", script.supported_forms().join(", "));
    }
    Ok(())
}
