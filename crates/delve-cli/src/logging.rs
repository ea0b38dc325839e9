//! Log output setup.
//!
//! Library crates log through the `log` facade; the subscriber installed
//! here also receives those records.

use tracing_subscriber::EnvFilter;

/// Picks the filter directive: `-v` flags win over the configured level.
pub fn filter_directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence when set and no `-v` flag was given.
/// Calling this twice is harmless.
pub fn init(verbose: u8, configured: &str) {
    let directive = filter_directive(verbose, configured);
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
    } else {
        EnvFilter::new(&directive)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
