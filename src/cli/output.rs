//! Output formatting
//!
//! Helpers for the thin presentation layer: status prefixes, error display,
//! and the verbosity-to-filter mapping for tracing.

use tracing_subscriber::EnvFilter;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}

/// Map the global verbosity flags onto a tracing filter.
///
/// Default is `info` so subprocess output stays visible; `-v` raises to
/// debug, `-vv` to trace, and `-q` silences everything below errors.
pub fn env_filter(verbose: u8, quiet: bool) -> EnvFilter {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Print a top-level error to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", status::ERROR);
}
