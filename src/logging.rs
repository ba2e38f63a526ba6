//! Logging setup.
//!
//! Events go to stderr through a `tracing-subscriber` fmt layer so stdout
//! stays reserved for reports. The filter comes from `--log-level` when
//! given, else `RUST_LOG` (a `.env` file is honored), else `info`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_FILTER: &str = "info";

/// Resolve the filter without installing anything.
pub fn build_filter(explicit: Option<&str>) -> EnvFilter {
    match explicit {
        Some(custom) => EnvFilter::try_new(custom).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(explicit: Option<&str>) {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(explicit))
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr));

    // Ignore error if subscriber was already set
    let _ = tracing::subscriber::set_global_default(subscriber);
}
