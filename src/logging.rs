//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging; `RUST_LOG` still wins over the verbosity flag.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = Env::default().default_filter_or(default_filter);
    env_logger::Builder::from_env(env).format_timestamp(None).init();
}
