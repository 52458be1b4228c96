//! Tracing setup for parcel
//!
//! The parcel crates only emit `tracing` events; applications embedding them
//! decide where the events go. This module offers a ready-made subscriber
//! for binaries and tests that do not bring their own.
//!
//! ```ignore
//! use parcel_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::verbose()).expect("failed to initialize tracing");
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Human-readable pretty format (default)
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for log collectors
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to the `parcel` crates when RUST_LOG is not set
    pub default_level: Level,
    /// Output format for log messages
    pub output_format: TracingOutputFormat,
    /// Whether to include file/line information in logs
    pub include_location: bool,
    /// Whether to include target (module path) in logs
    pub include_target: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Whether to include span events (enter/exit)
    pub include_span_events: bool,
    /// Custom env filter directive (overrides default_level if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Pretty,
            include_location: false,
            include_target: true,
            include_timestamp: true,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Debug-level compact output with source locations, for local work
    /// on codec issues.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            default_level: Level::DEBUG,
            output_format: TracingOutputFormat::Compact,
            include_location: true,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// JSON output with span events, for services shipping logs elsewhere.
    #[must_use]
    pub fn structured() -> Self {
        Self {
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_span_events: true,
            ..Self::default()
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref filter) = self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("parcel={}", self.default_level))))
    }

    fn build_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(self.include_target)
            .with_span_events(span_events);

        match (self.output_format, self.include_timestamp) {
            (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
            (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
            (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
            (TracingOutputFormat::Json, _) => layer.json().boxed(),
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// Call once at program start. `RUST_LOG` overrides the default level.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the env filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.build_filter()?;
    let subscriber = tracing_subscriber::registry()
        .with(config.build_layer())
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Route events to the test harness output.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parcel=debug")),
        )
        .with_test_writer()
        .try_init();
}
