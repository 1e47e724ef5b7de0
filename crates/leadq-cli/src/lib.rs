//! # leadq-cli — Command-Line Driver
//!
//! Provides the `leadq` binary.
//!
//! ## Subcommands
//!
//! - `leadq variants list|show` — inspect registered questionnaire variants.
//! - `leadq score` — score an answer set against a variant.
//! - `leadq send` — deliver a JSON payload through the retrying webhook client.
//! - `leadq run` — play a scripted qualification session end to end.
//!
//! ```bash
//! leadq score --variant athlete --answer 1=24 --answer 2=18 --answer 3=10
//! leadq send --stage qualification --payload snapshot.json
//! leadq -v run --session session.yaml --dry-run
//! ```

pub mod config;
pub mod logging;
pub mod run;
pub mod score;
pub mod send;
pub mod variants;

use anyhow::{Context, Result};

use leadq_scoring::{QuestionnaireVariant, VariantRegistry};

use crate::config::AppConfig;

/// Built-in variants plus every file listed in the configuration.
pub fn load_registry(config: &AppConfig) -> Result<VariantRegistry> {
    let mut registry = VariantRegistry::builtin().context("built-in variants are invalid")?;
    for path in &config.extra_variants {
        registry
            .load_file(path)
            .with_context(|| format!("failed to load variant: {}", path.display()))?;
    }
    Ok(registry)
}

/// Look up a variant, listing the known ids on failure.
pub fn require_variant<'a>(registry: &'a VariantRegistry, id: &str) -> Result<&'a QuestionnaireVariant> {
    registry.get(id).with_context(|| {
        let known: Vec<&str> = registry.list().map(|v| v.id.as_str()).collect();
        format!("unknown variant {id:?} (known: {})", known.join(", "))
    })
}
