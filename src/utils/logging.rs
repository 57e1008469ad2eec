// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Sets up the logging framework using tracing_subscriber.
/// Reads log level filters from the `RUST_LOG` environment variable.
/// Defaults to "info" if `RUST_LOG` is not set.
///
/// Safe to call more than once: a second call leaves the installed subscriber in place.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")); // Default to INFO level

    // Logs go to stderr so the TSV row on stdout stays clean for piping
    let installed = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match installed {
        Ok(()) => tracing::debug!("Logging setup complete."),
        Err(_) => tracing::debug!("Logging already initialized, keeping existing subscriber."),
    }
}
