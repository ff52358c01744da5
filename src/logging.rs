//! Logging configuration using tracing
//!
//! Structured logs go to stderr. `RUST_LOG` wins over the configured filter;
//! production output drops ANSI colors so log collectors get plain text.

use crate::config::LogSettings;
use crate::{RefollowError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor the config file sets one
pub const DEFAULT_FILTER: &str = "refollow=info,tower_http=info,warn";

/// `RUST_LOG` if set and non-blank, else the configured directive
fn select_directive<'a>(rust_log: Option<&'a str>, configured: &'a str) -> &'a str {
    rust_log
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(configured)
}

fn build_filter(rust_log: Option<&str>, configured: &str) -> Result<EnvFilter> {
    let directive = select_directive(rust_log, configured);
    EnvFilter::try_new(directive)
        .map_err(|e| RefollowError::Config(format!("Invalid log filter {:?}: {}", directive, e)))
}

/// Initialize the tracing subscriber
///
/// # Example RUST_LOG values
/// - `RUST_LOG=debug` - Show debug and above
/// - `RUST_LOG=refollow::upstream=trace` - Every upstream call
/// - `RUST_LOG=refollow::cache=debug,refollow::gate=debug` - Cache and gate decisions
///
/// # Errors
/// Returns an error if the filter does not parse or the subscriber has
/// already been initialized
pub fn init(settings: &LogSettings, production: bool) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let env_filter = build_filter(rust_log.as_deref(), &settings.filter)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!production)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| RefollowError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init(&LogSettings::default(), false);
}
