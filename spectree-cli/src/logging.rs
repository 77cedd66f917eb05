//! Logging setup and helpers
//!
//! Logs always go to stderr; stdout carries completion output that shells parse.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper that formats values as YAML inside log lines.
///
/// ```ignore
/// tracing::debug!("Effective configuration: {}", Pretty(&config));
/// ```
///
/// Debug formatting is used as a fallback if YAML serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Pick the log level from the global flags. Quiet wins over the others.
pub fn log_level(verbose: bool, debug: bool, quiet: bool) -> tracing::Level {
    use tracing::Level;

    if quiet {
        Level::ERROR
    } else if debug {
        Level::DEBUG
    } else if verbose {
        Level::TRACE
    } else {
        Level::WARN
    }
}

/// Install the global subscriber writing to stderr.
pub fn configure_logging(verbose: bool, debug: bool, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let level = log_level(verbose, debug, quiet);
    let filter = EnvFilter::new(format!("figment=warn,{level}"));

    // A subscriber may already be installed when embedded in tests
    let _ = registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[derive(Serialize, Debug)]
    struct Sample {
        conflicts: &'static str,
        help_projection: bool,
    }

    #[test]
    fn test_pretty_renders_yaml() {
        let sample = Sample {
            conflicts: "first-wins",
            help_projection: true,
        };
        let text = format!("{}", Pretty(&sample));
        assert!(text.starts_with('\n'));
        assert!(text.contains("conflicts: first-wins"));
        assert!(text.contains("help_projection: true"));
    }

    #[test]
    fn test_log_level_precedence() {
        assert_eq!(log_level(false, false, false), Level::WARN);
        assert_eq!(log_level(true, false, false), Level::TRACE);
        assert_eq!(log_level(false, true, false), Level::DEBUG);
        assert_eq!(log_level(true, true, true), Level::ERROR);
    }
}
