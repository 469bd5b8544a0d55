#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! application's job. With the `tracing-json` feature this module offers a
//! one-call JSON subscriber filtered by the `VEIL_LOG` environment variable.

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_ENV: &str = "VEIL_LOG";

/// Directive used when `VEIL_LOG` is unset or empty.
pub const DEFAULT_DIRECTIVE: &str = "info";

// Re-export tracing macros for ergonomic use by downstream crates.
#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Resolve the filter directive from a raw environment value.
#[must_use]
pub fn filter_directive(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_DIRECTIVE,
    }
}

/// Install a global JSON subscriber filtered by `VEIL_LOG`.
///
/// Fails if a global subscriber is already installed or the directive does
/// not parse.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::EnvFilter;

    let raw = std::env::var(LOG_ENV).ok();
    let filter = EnvFilter::try_new(filter_directive(raw.as_deref()))?;
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directive_falls_back_to_default() {
        assert_eq!(filter_directive(None), "info");
        assert_eq!(filter_directive(Some("  ")), "info");
    }

    #[test]
    fn explicit_directive_is_kept() {
        assert_eq!(filter_directive(Some("veil_modal=debug")), "veil_modal=debug");
    }
}
