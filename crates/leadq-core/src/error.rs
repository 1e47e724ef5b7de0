//! # Error Hierarchy
//!
//! Validation errors for lead identity fields, built with `thiserror`.
//! Each variant carries the field name and the rejected input so the
//! caller can point the user at the exact field to fix.

use thiserror::Error;

/// A single identity field that failed its format rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field left empty.
    #[error("{field} is required")]
    Missing {
        /// Name of the empty field.
        field: &'static str,
    },

    /// Person name is too short, too long, or contains non-letter characters.
    #[error("invalid {field}: \"{value}\" (expected 2-100 letters and spaces)")]
    InvalidName {
        /// Which name field failed (`fullName` or `parentName`).
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Birth date is unparseable or outside the accepted age window.
    #[error("invalid birthDate: \"{value}\" ({reason})")]
    InvalidBirthDate {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// City/state is not in `City/UF` form.
    #[error("invalid cityState: \"{0}\" (expected City/UF with a 2-letter state)")]
    InvalidCityState(String),

    /// Phone number does not match `(DD) DDDDD-DDDD`.
    #[error("invalid parentPhone: \"{0}\" (expected (11) 99999-9999)")]
    InvalidPhone(String),
}

impl ValidationError {
    /// Wire name of the field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::InvalidName { field, .. } => *field,
            Self::InvalidBirthDate { .. } => "birthDate",
            Self::InvalidCityState(_) => "cityState",
            Self::InvalidPhone(_) => "parentPhone",
        }
    }
}
