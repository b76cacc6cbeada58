// src/logging.rs
//
// Tracing setup for the binaries.
// - GROUP_DRAW_LOG selects the filter (e.g. `debug` to see every recorded trial)
// - defaults to `info`; output goes to stderr so stdout stays the report

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GROUP_DRAW_LOG";

/// Initialize the global subscriber; a second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    init_with(filter);
}

/// Initialize with an explicit filter string (for demos or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    init_with(EnvFilter::new(filter));
}

fn init_with(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
