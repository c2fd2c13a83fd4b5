use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a log file. When unset, logs go to stderr.
pub const LOG_FILE_ENV: &str = "CLIROUTE_LOG";

/// Verbosity levels following common CLI conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Normal user-facing messages.
    #[default]
    Brief,
    /// Descriptive output.
    Verbose,
    /// Internal execution steps.
    Debug,
}

impl Verbosity {
    pub fn level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Brief => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Initialize tracing.
///
/// `RUST_LOG` overrides the verbosity level. Set `CLIROUTE_LOG` to a file
/// path to write logs there instead of stderr; the file is named
/// `{path}.{timestamp}.{pid}` so concurrent runs don't collide.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.level().to_string()));

    if let Ok(log_path) = std::env::var(LOG_FILE_ENV) {
        let pid = std::process::id();
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let unique_path = format!("{}.{}.{}", log_path, timestamp, pid);

        match std::fs::File::create(&unique_path) {
            Ok(file) => {
                let file_layer = fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true);
                let _ = tracing_subscriber::registry()
                    .with(filter)
                    .with(file_layer)
                    .try_init();
                return;
            }
            Err(_) => eprintln!("Warning: Failed to create log file: {}", unique_path),
        }
    }

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
