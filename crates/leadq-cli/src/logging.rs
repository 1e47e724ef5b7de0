//! Tracing subscriber setup.
//!
//! The minimum level comes from `LEADQ_LOG_LEVEL` and each `-v` raises it
//! one step. Output goes to stderr so subcommand JSON on stdout stays
//! machine-readable.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the minimum log level.
pub const ENV_LOG_LEVEL: &str = "LEADQ_LOG_LEVEL";
/// Environment variable selecting `human` or `json` output.
pub const ENV_LOG_FORMAT: &str = "LEADQ_LOG_FORMAT";

/// Minimum level accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Case-insensitive parse. Anything unrecognised is `Info`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Self::Debug,
            "WARN" | "WARNING" => Self::Warn,
            "ERROR" => Self::Error,
            _ => Self::Info,
        }
    }

    fn as_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

/// Line format of emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Human
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: lookup(ENV_LOG_LEVEL)
                .map(|raw| LogLevel::parse_lenient(&raw))
                .unwrap_or_default(),
            format: lookup(ENV_LOG_FORMAT)
                .map(|raw| LogFormat::parse_lenient(&raw))
                .unwrap_or_default(),
        }
    }

    /// Configured level raised by `verbose` steps, saturating at TRACE.
    pub fn effective_filter(&self, verbose: u8) -> LevelFilter {
        const LADDER: [LevelFilter; 5] = [
            LevelFilter::ERROR,
            LevelFilter::WARN,
            LevelFilter::INFO,
            LevelFilter::DEBUG,
            LevelFilter::TRACE,
        ];
        let base = self.level.as_filter();
        let start = LADDER.iter().position(|l| *l == base).unwrap_or(2);
        let idx = (start + usize::from(verbose)).min(LADDER.len() - 1);
        LADDER[idx]
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig, verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::new(config.effective_filter(verbose).to_string());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Human => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
