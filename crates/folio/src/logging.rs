//! Logging setup for the server and the CLI.
//!
//! Everything goes through `tracing`. The request middleware and the
//! handlers emit structured events; this module decides which of them are
//! printed.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the process is, chosen with `-q` / `-v` / `-vv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Startup, one line per request, accepted submissions.
    #[default]
    Normal,
    /// Adds store reads and writes.
    Verbose,
    /// Everything, including axum's extractor rejections.
    Trace,
}

impl Verbosity {
    /// Level applied to this crate's own events.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter used when `RUST_LOG` is not set.
    ///
    /// Dependencies stay at `warn` unless tracing everything; at `Trace`
    /// the reasons axum rejected a request body or query are shown too.
    #[must_use]
    pub fn default_directive(self) -> String {
        let own = format!("folio={}", self.level());
        match self {
            Self::Trace => format!("{own},tower_http=debug,axum::rejection=trace"),
            _ => format!("{own},tower_http=warn"),
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `verbosity` when it is set. Targets are only
/// printed from `Verbose` up. Calling this more than once is harmless.
///
/// # Examples
///
/// ```no_run
/// use folio::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(verbosity >= Verbosity::Verbose)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // A subscriber may already be installed
    let _ = subscriber.try_init();
}

/// Route warnings from the code under test through the test writer.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("folio=warn")
        .with_test_writer()
        .try_init();
}
