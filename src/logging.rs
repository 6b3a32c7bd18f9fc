use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "askasha=info";
const ENV_LOG_FILE: &str = "ASKASHA_LOG_FILE";

/// Installs the global subscriber: stderr always, plus an append-only file
/// when `ASKASHA_LOG_FILE` is set. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let mut file_error = None;
    let file_layer = std::env::var_os(ENV_LOG_FILE).and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            ),
            Err(err) => {
                file_error = Some(format!("{}: {err}", path.to_string_lossy()));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(err) = file_error {
        tracing::warn!(error = %err, "could not open log file, logging to stderr only");
    }
    tracing::debug!("tracing initialized");
}
