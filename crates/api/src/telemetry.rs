//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence; otherwise `LOG_LEVEL` sets the filter.
//! `LOG_FORMAT` selects `json` (default) or `text`, and `LOG_OUTPUT`
//! selects `stdout` (default) or `stderr`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            output: LogOutput::Stdout,
        }
    }
}

impl LogConfig {
    /// Read `LOG_LEVEL`, `LOG_FORMAT` and `LOG_OUTPUT`. Unknown values fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("LOG_LEVEL").ok().as_deref(),
            std::env::var("LOG_FORMAT").ok().as_deref(),
            std::env::var("LOG_OUTPUT").ok().as_deref(),
        )
    }

    fn from_values(level: Option<&str>, format: Option<&str>, output: Option<&str>) -> Self {
        let defaults = Self::default();
        let level = level
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or(defaults.level);
        let format = match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("text") | Some("pretty") => LogFormat::Text,
            _ => LogFormat::Json,
        };
        let output = match output.map(|o| o.trim().to_ascii_lowercase()).as_deref() {
            Some("stderr") => LogOutput::Stderr,
            _ => LogOutput::Stdout,
        };
        Self {
            level,
            format,
            output,
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, config.output) {
        (LogFormat::Json, LogOutput::Stdout) => registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .init(),
        (LogFormat::Json, LogOutput::Stderr) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (LogFormat::Text, LogOutput::Stdout) => registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .init(),
        (LogFormat::Text, LogOutput::Stderr) => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
