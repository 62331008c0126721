//! Diagnostic tracing for the CLI.
//!
//! Output goes to stderr so stdout stays reserved for file content and
//! `--json` responses.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` when set. Otherwise defaults to `warn`, or to
/// `devalchemy=info` when `verbose` is requested.
///
/// # Example
/// ```bash
/// RUST_LOG=devalchemy=debug devalchemy edit "add a footer"
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,devalchemy=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
