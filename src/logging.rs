//! Tracing setup for binaries embedding the engine.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{QcError, Result};

/// Default filter directive for a verbosity level (`-v` count).
#[must_use]
pub const fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,xodr_qc=info",
        1 => "info,xodr_qc=debug",
        2 => "debug,xodr_qc=trace",
        _ => "trace",
    }
}

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity`. With `json` set every event is
/// written as one JSON object per line.
pub fn init_tracing(verbosity: u8, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|err| QcError::Logging(err.to_string()))
}
