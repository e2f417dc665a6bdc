//! Diagnostic logging.
//!
//! Events go to stderr through `tracing-subscriber`, so stdout stays
//! parseable for scripts. `RUST_LOG` overrides the per-command default.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Later calls are ignored.
pub fn init(default_level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
