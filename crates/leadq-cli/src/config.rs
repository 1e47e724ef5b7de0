//! Application configuration: environment first, then an optional YAML
//! file whose fields override it.
//!
//! ```yaml
//! webhook:
//!   qualification_url: https://n8n.example/webhook/qualification
//!   max_attempts: 5
//! log:
//!   level: debug
//!   format: json
//! variants:
//!   - variants/coach.yaml
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

use leadq_webhook::WebhookConfig;

use crate::logging::{LogConfig, LogFormat, LogLevel};

/// Everything the binary needs before dispatching a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub webhook: WebhookConfig,
    pub log: LogConfig,
    /// Variant files registered on top of the built-ins.
    pub extra_variants: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    webhook: WebhookOverrides,
    log: LogOverrides,
    variants: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WebhookOverrides {
    qualification_url: Option<Url>,
    scheduling_url: Option<Url>,
    timeout_ms: Option<u64>,
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LogOverrides {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    /// Load from the process environment and, if given, a YAML file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_lookup(|var| std::env::var(var).ok())?;
        if let Some(path) = path {
            config.overlay_file(path)?;
        }
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            webhook: WebhookConfig::from_lookup(&lookup).context("invalid webhook environment")?,
            log: LogConfig::from_lookup(&lookup),
            extra_variants: Vec::new(),
        })
    }

    /// Apply a YAML file on top of the current values.
    ///
    /// Relative variant paths resolve against the file's directory.
    pub fn overlay_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let file: FileConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        self.apply(file, base)
    }

    fn apply(&mut self, file: FileConfig, base: &Path) -> Result<()> {
        let hook = file.webhook;
        if let Some(url) = hook.qualification_url {
            self.webhook.qualification_url = url;
        }
        if let Some(url) = hook.scheduling_url {
            self.webhook.scheduling_url = url;
        }
        if let Some(ms) = hook.timeout_ms {
            self.webhook.timeout_ms = ms;
        }
        if let Some(n) = hook.max_attempts {
            if n == 0 {
                bail!("webhook.max_attempts must be at least 1");
            }
            self.webhook.max_attempts = n;
        }
        if let Some(ms) = hook.base_delay_ms {
            self.webhook.base_delay_ms = ms;
        }

        if let Some(level) = file.log.level {
            self.log.level = LogLevel::parse_lenient(&level);
        }
        if let Some(format) = file.log.format {
            self.log.format = format;
        }

        self.extra_variants.extend(file.variants.into_iter().map(|p| {
            if p.is_absolute() {
                p
            } else {
                base.join(p)
            }
        }));
        Ok(())
    }
}
