//! Tracing setup for the server, the CLI and the test suites.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates that log every request at info level; kept at warn unless asked.
const NOISY_TARGETS: &[&str] = &["hyper", "axum"];

/// How much the binary logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Startup, sign-ins and served predictions.
    #[default]
    Normal,
    /// Adds credential checks and per-prediction model output.
    Verbose,
    /// Everything, including dependency internals.
    Trace,
}

impl Verbosity {
    /// Map `-q` and the `-v` count onto a verbosity. `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Level applied to the `flightdelay` target.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directives used when `RUST_LOG` is not set.
    #[must_use]
    pub fn directives(self) -> String {
        let mut directives = vec![format!("flightdelay={}", self.level())];
        if self != Self::Trace {
            directives.extend(NOISY_TARGETS.iter().map(|target| format!("{target}=warn")));
        }
        directives.join(",")
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity` when set.
///
/// # Examples
///
/// ```no_run
/// use flightdelay::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Route `flightdelay` debug output through the test harness's captured writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(Verbosity::Verbose.directives())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(4, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(2, true), Verbosity::Quiet);
    }

    #[test]
    fn test_levels() {
        assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.level(), Level::INFO);
        assert_eq!(Verbosity::Verbose.level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.level(), Level::TRACE);
    }

    #[test]
    fn test_directives_quiet_dependencies() {
        assert_eq!(
            Verbosity::Normal.directives(),
            "flightdelay=INFO,hyper=warn,axum=warn"
        );
        assert_eq!(Verbosity::Trace.directives(), "flightdelay=TRACE");
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in [Verbosity::Quiet, Verbosity::Normal, Verbosity::Trace] {
            assert!(EnvFilter::try_new(verbosity.directives()).is_ok());
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_logging(Verbosity::Quiet);
        init_test_logging();
    }
}
