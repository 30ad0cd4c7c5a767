//! Logging setup.
//!
//! Logs go to stderr through `tracing-subscriber` so stdout stays reserved for
//! reports (fetch summary, ASCII grid). `RUST_LOG` overrides the default level.

use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
