//! Structured logging for the lineage CLI.
//!
//! Installs a global `tracing` subscriber writing to stderr, in either a
//! human-readable or a JSON layout, and forwards `log` records into it.

use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Environment variable selecting the log layout.
pub const LOG_FORMAT_ENV: &str = "LINEAGE_LOG_FORMAT";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Layout of emitted log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field text lines for terminals.
    #[default]
    Human,
    /// One JSON object per line, including the span stack.
    Json,
}

impl LogFormat {
    /// Parses a `LINEAGE_LOG_FORMAT` value, ignoring case and surrounding
    /// whitespace.
    ///
    /// # Errors
    /// Returns [`LoggingError::UnsupportedFormat`] for anything other than
    /// `human` or `json`.
    ///
    /// # Examples
    /// ```
    /// use lineage_cli::logging::LogFormat;
    ///
    /// assert_eq!(LogFormat::parse(" JSON ")?, LogFormat::Json);
    /// assert!(LogFormat::parse("xml").is_err());
    /// # Ok::<(), lineage_cli::logging::LoggingError>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self, LoggingError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }

    fn from_env() -> Result<Self, LoggingError> {
        match env::var(LOG_FORMAT_ENV) {
            Ok(raw) => Self::parse(&raw),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(source @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                source,
            }),
        }
    }
}

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: env::VarError,
    },
    /// Unsupported log format requested via `LINEAGE_LOG_FORMAT`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Installs global structured logging unless it is already configured.
///
/// `RUST_LOG` controls the level (default `info`) and `LINEAGE_LOG_FORMAT`
/// the layout. Output goes to stderr so command summaries on stdout stay
/// machine-readable.
///
/// # Errors
/// Returns [`LoggingError`] when `LINEAGE_LOG_FORMAT` is not valid Unicode
/// or names an unsupported layout.
pub fn init_logging() -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }

    match install_subscriber(LogFormat::from_env()?) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => {
            tracing::debug!(%source, "structured logging already configured elsewhere");
        }
        Err(err) => return Err(err),
    }
    let _ = INITIALISED.set(());
    Ok(())
}

fn install_subscriber(format: LogFormat) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::FULL)
        .with_writer(std::io::stderr);
    let fmt_layer = match format {
        LogFormat::Human => fmt_layer.boxed(),
        LogFormat::Json => fmt_layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    // Another logger may already own the `log` slot.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}
