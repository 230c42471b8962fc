//! Console logging setup.
//!
//! `RUST_LOG` directives win; otherwise `info`, or `debug` when verbose.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    // try_init: tests and embedders may already have a subscriber
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
