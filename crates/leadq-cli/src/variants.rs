//! `leadq variants` — inspect registered questionnaire variants.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use leadq_scoring::{QuestionnaireVariant, VariantRegistry};

#[derive(Args, Debug)]
pub struct VariantsArgs {
    #[command(subcommand)]
    pub command: VariantsCommand,
}

#[derive(Subcommand, Debug)]
pub enum VariantsCommand {
    /// One line per registered variant.
    List,

    /// Print a variant's full descriptor.
    Show {
        /// Variant id (e.g. `athlete`).
        id: String,

        /// Output format.
        #[arg(long, value_enum, default_value_t = ShowFormat::Yaml)]
        format: ShowFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowFormat {
    Yaml,
    Json,
}

/// Execute the variants subcommand.
pub fn run_variants(args: &VariantsArgs, registry: &VariantRegistry) -> Result<u8> {
    match &args.command {
        VariantsCommand::List => {
            for line in list_lines(registry) {
                println!("{line}");
            }
            Ok(0)
        }
        VariantsCommand::Show { id, format } => {
            let variant = crate::require_variant(registry, id)?;
            println!("{}", render(variant, *format)?);
            Ok(0)
        }
    }
}

fn list_lines(registry: &VariantRegistry) -> Vec<String> {
    registry
        .list()
        .map(|v| {
            format!(
                "{:<12} {:>2} questions  max {:>3}  {}",
                v.id,
                v.questions.len(),
                v.max_possible_score(),
                v.title
            )
        })
        .collect()
}

fn render(variant: &QuestionnaireVariant, format: ShowFormat) -> Result<String> {
    match format {
        ShowFormat::Yaml => serde_yaml::to_string(variant).context("failed to render variant as YAML"),
        ShowFormat::Json => {
            serde_json::to_string_pretty(variant).context("failed to render variant as JSON")
        }
    }
}
