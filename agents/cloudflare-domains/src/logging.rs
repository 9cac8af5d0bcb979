//! Tracing subscriber setup shared by the binaries

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Diagnostics go to stderr so stdout stays
/// reserved for the status report. `RUST_LOG` overrides the level.
pub fn init(verbose: bool, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}
