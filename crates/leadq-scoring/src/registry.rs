//! Variant registry: built-in descriptors plus any loaded at runtime.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::VariantError;
use crate::questionnaire::QuestionnaireVariant;

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("athlete.yaml", include_str!("../variants/athlete.yaml")),
    ("lead.yaml", include_str!("../variants/lead.yaml")),
];

/// Questionnaire variants indexed by id.
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    variants: BTreeMap<String, QuestionnaireVariant>,
}

impl VariantRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the variants shipped in the binary.
    pub fn builtin() -> Result<Self, VariantError> {
        let mut registry = Self::new();
        for (name, yaml) in BUILTIN_SOURCES {
            let variant = QuestionnaireVariant::from_yaml_str(yaml)?;
            tracing::debug!(file = name, variant = %variant.id, "loaded built-in variant");
            registry.register(variant);
        }
        Ok(registry)
    }

    /// Add a variant, replacing any existing one with the same id.
    /// Returns the replaced variant.
    pub fn register(&mut self, variant: QuestionnaireVariant) -> Option<QuestionnaireVariant> {
        let replaced = self.variants.insert(variant.id.clone(), variant);
        if let Some(old) = &replaced {
            tracing::info!(variant = %old.id, "replaced registered variant");
        }
        replaced
    }

    /// Load, validate and register a variant from a YAML file.
    /// Returns the id it was registered under.
    pub fn load_file(&mut self, path: &Path) -> Result<String, VariantError> {
        let variant = QuestionnaireVariant::from_yaml_file(path)?;
        let id = variant.id.clone();
        tracing::info!(path = %path.display(), variant = %id, "loaded variant file");
        self.register(variant);
        Ok(id)
    }

    /// Look up a variant by id.
    pub fn get(&self, id: &str) -> Option<&QuestionnaireVariant> {
        self.variants.get(id)
    }

    /// All variants, ordered by id.
    pub fn list(&self) -> impl Iterator<Item = &QuestionnaireVariant> {
        self.variants.values()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// No variants registered.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
