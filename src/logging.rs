// src/logging.rs
//! Diagnostic logging. Output goes to stderr so JSON on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter, e.g. `UX_ENHANCER_LOG=debug`.
pub const LOG_ENV: &str = "UX_ENHANCER_LOG";

/// Installs the global subscriber. Repeated calls are no-ops.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
