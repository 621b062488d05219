//! Log output for the command-line tools

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Plain text log lines on stdout; `RUST_LOG` still refines the filter
pub fn init_tracing(quiet: bool) {
    let level = if quiet { Level::WARN } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();
}
