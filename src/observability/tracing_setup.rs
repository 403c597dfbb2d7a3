// observability/tracing_setup.rs - Tracing Configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer, Registry,
};

/// Tracing output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable multi-line format (default)
    #[default]
    Pretty,
    /// Single-line format
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(TracingFormat::Pretty),
            "compact" => Ok(TracingFormat::Compact),
            "json" => Ok(TracingFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Configuration for tracing
///
/// Events are written to stderr so that command output on stdout stays
/// machine-readable.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,

    /// Output format
    pub format: TracingFormat,

    /// Add source locations, thread ids and span open/close events
    pub verbose: bool,

    /// ANSI colors (ignored for JSON)
    pub with_ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info,wot_engine=debug".into(),
            format: TracingFormat::Pretty,
            verbose: false,
            with_ansi: true,
        }
    }
}

impl TracingConfig {
    /// One level for this crate and its dependencies
    ///
    /// `debug` and `trace` turn on verbose output.
    pub fn for_level(level: &str, format: TracingFormat) -> Self {
        Self {
            filter: format!("{},wot_engine={}", level, level),
            format,
            verbose: matches!(level, "debug" | "trace"),
            with_ansi: format != TracingFormat::Json,
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.verbose {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(self.verbose)
            .with_line_number(self.verbose)
            .with_thread_ids(self.verbose)
            .with_target(true);

        match self.format {
            TracingFormat::Pretty => layer.with_ansi(self.with_ansi).boxed(),
            TracingFormat::Compact => layer.compact().with_ansi(self.with_ansi).boxed(),
            TracingFormat::Json => layer.json().with_ansi(false).boxed(),
        }
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.filter`. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(env_filter)
        .try_init()?;

    tracing::debug!(
        filter = %config.filter,
        format = ?config.format,
        "Tracing initialized"
    );
    Ok(())
}
