//! Logger set-up for the demo driver and tests.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Environment variable overriding the default filter.
pub const LOG_FILTER_ENV: &str = "RAIL_FRP_LOG";

/// Initializes the global logger.
///
/// When `verbose` is `true`, per-tick trace output from the classifier is
/// shown. Otherwise only info level and above are printed. `RAIL_FRP_LOG`
/// (or `RUST_LOG`) takes precedence over both.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };

    let env = Env::default()
        .filter_or(LOG_FILTER_ENV, std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    // Fails only when a logger is already installed; tests call this freely.
    let _ = builder.try_init();
}
