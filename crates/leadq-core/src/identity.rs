//! # Lead Identity
//!
//! The identifying information collected before the questionnaire:
//! athlete name and birth date (first step), then city/state and the
//! responsible adult's name and phone (second step).
//!
//! ## Validation
//!
//! Fields are held as plain strings while the lead is typing. Format rules
//! are checked on demand by [`LeadInfo::validate`], which reports every
//! violated rule at once rather than stopping at the first.
//!
//! - Names: 2-100 characters, ASCII letters, Latin-1 letters (`À`-`ÿ`) and
//!   whitespace.
//! - Birth date: `YYYY-MM-DD`, age between 8 and 50 years inclusive.
//! - City/state: `City/UF`, at least 5 characters, 2-character state.
//! - Phone: `(DD) DDDDD-DDDD`.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const MIN_AGE_YEARS: u32 = 8;
const MAX_AGE_YEARS: u32 = 50;
const CITY_STATE_MIN_CHARS: usize = 5;

/// Identifying information for a single lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInfo {
    /// Athlete's full name.
    #[serde(default)]
    pub full_name: String,
    /// Birth date as `YYYY-MM-DD`.
    #[serde(default)]
    pub birth_date: String,
    /// City and state as `City/UF`.
    #[serde(default)]
    pub city_state: String,
    /// Responsible adult's name.
    #[serde(default)]
    pub parent_name: String,
    /// Responsible adult's phone as `(DD) DDDDD-DDDD`.
    #[serde(default)]
    pub parent_phone: String,
}

/// Addressable identity field, used when updating a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadField {
    /// [`LeadInfo::full_name`]
    FullName,
    /// [`LeadInfo::birth_date`]
    BirthDate,
    /// [`LeadInfo::city_state`]
    CityState,
    /// [`LeadInfo::parent_name`]
    ParentName,
    /// [`LeadInfo::parent_phone`]
    ParentPhone,
}

impl LeadField {
    /// Wire name of the field (camelCase, as serialized).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::BirthDate => "birthDate",
            Self::CityState => "cityState",
            Self::ParentName => "parentName",
            Self::ParentPhone => "parentPhone",
        }
    }
}

impl std::fmt::Display for LeadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LeadInfo {
    /// Replace a single field.
    pub fn set(&mut self, field: LeadField, value: impl Into<String>) {
        let value = value.into();
        match field {
            LeadField::FullName => self.full_name = value,
            LeadField::BirthDate => self.birth_date = value,
            LeadField::CityState => self.city_state = value,
            LeadField::ParentName => self.parent_name = value,
            LeadField::ParentPhone => self.parent_phone = value,
        }
    }

    /// Read a single field.
    pub fn get(&self, field: LeadField) -> &str {
        match field {
            LeadField::FullName => &self.full_name,
            LeadField::BirthDate => &self.birth_date,
            LeadField::CityState => &self.city_state,
            LeadField::ParentName => &self.parent_name,
            LeadField::ParentPhone => &self.parent_phone,
        }
    }

    /// First identity step is filled in (name and birth date present).
    pub fn identity_step_one_complete(&self) -> bool {
        !self.full_name.trim().is_empty() && !self.birth_date.trim().is_empty()
    }

    /// Second identity step is filled in (city/state, parent name, phone present).
    pub fn identity_step_two_complete(&self) -> bool {
        !self.city_state.trim().is_empty()
            && !self.parent_name.trim().is_empty()
            && !self.parent_phone.trim().is_empty()
    }

    /// Check every field against its format rule.
    ///
    /// `today` anchors the age window so results are reproducible.
    /// Returns all violations; an empty vector means the record is valid.
    pub fn validate(&self, today: NaiveDate) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let checks = [
            validate_person_name("fullName", &self.full_name),
            validate_birth_date(&self.birth_date, today),
            validate_city_state(&self.city_state),
            validate_person_name("parentName", &self.parent_name),
            validate_phone(&self.parent_phone),
        ];
        for check in checks {
            if let Err(e) = check {
                errors.push(e);
            }
        }
        errors
    }
}

/// Validate a person name (athlete or responsible adult).
pub fn validate_person_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    let len = value.chars().count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || ('À'..='ÿ').contains(&c) || c.is_whitespace());
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) || !allowed {
        return Err(ValidationError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validate a `YYYY-MM-DD` birth date against the 8-50 year age window.
pub fn validate_birth_date(value: &str, today: NaiveDate) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing { field: "birthDate" });
    }
    let invalid = |reason: &str| ValidationError::InvalidBirthDate {
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let parsed =
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid("expected YYYY-MM-DD"))?;

    let oldest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .ok_or_else(|| invalid("date arithmetic overflow"))?;
    let youngest = today
        .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
        .ok_or_else(|| invalid("date arithmetic overflow"))?;

    if parsed < oldest || parsed > youngest {
        return Err(invalid("age must be between 8 and 50 years"));
    }
    Ok(())
}

/// Validate a `City/UF` value.
pub fn validate_city_state(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing { field: "cityState" });
    }
    let parts: Vec<&str> = value.split('/').collect();
    let well_formed = value.chars().count() >= CITY_STATE_MIN_CHARS
        && parts.len() == 2
        && !parts[0].is_empty()
        && parts[1].chars().count() == 2;
    if !well_formed {
        return Err(ValidationError::InvalidCityState(value.to_string()));
    }
    Ok(())
}

/// Validate a `(DD) DDDDD-DDDD` phone number.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing { field: "parentPhone" });
    }
    const PATTERN: &[u8] = b"(##) #####-####";
    let bytes = value.as_bytes();
    let matches = bytes.len() == PATTERN.len()
        && bytes.iter().zip(PATTERN).all(|(b, p)| match p {
            b'#' => b.is_ascii_digit(),
            lit => b == lit,
        });
    if !matches {
        return Err(ValidationError::InvalidPhone(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn valid_lead() -> LeadInfo {
        LeadInfo {
            full_name: "João da Silva".to_string(),
            birth_date: "2010-05-20".to_string(),
            city_state: "Campinas/SP".to_string(),
            parent_name: "Maria da Silva".to_string(),
            parent_phone: "(19) 98765-4321".to_string(),
        }
    }

    #[test]
    fn valid_lead_has_no_errors() {
        assert!(valid_lead().validate(today()).is_empty());
    }

    #[test]
    fn empty_lead_reports_every_field() {
        let errors = LeadInfo::default().validate(today());
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(
            fields,
            vec!["fullName", "birthDate", "cityState", "parentName", "parentPhone"]
        );
    }

    #[test]
    fn name_rejects_digits_and_single_char() {
        assert!(validate_person_name("fullName", "R2D2").is_err());
        assert!(validate_person_name("fullName", "A").is_err());
        assert!(validate_person_name("fullName", "Zé").is_ok());
    }

    #[test]
    fn name_rejects_over_100_chars() {
        let long = "a".repeat(101);
        assert!(validate_person_name("parentName", &long).is_err());
        assert!(validate_person_name("parentName", &"a".repeat(100)).is_ok());
    }

    #[test]
    fn birth_date_age_window_is_inclusive() {
        assert!(validate_birth_date("2018-10-19", today()).is_ok());
        assert!(validate_birth_date("2018-10-20", today()).is_err());
        assert!(validate_birth_date("1976-10-19", today()).is_ok());
        assert!(validate_birth_date("1976-10-18", today()).is_err());
    }

    #[test]
    fn birth_date_rejects_other_formats() {
        let err = validate_birth_date("20/05/2010", today()).unwrap_err();
        assert!(format!("{err}").contains("YYYY-MM-DD"));
    }

    #[test]
    fn city_state_requires_two_letter_state() {
        assert!(validate_city_state("Campinas/SP").is_ok());
        assert!(validate_city_state("Campinas/SPX").is_err());
        assert!(validate_city_state("Campinas").is_err());
        assert!(validate_city_state("/SPSP").is_err());
        assert!(validate_city_state("A/B/SP").is_err());
        assert!(validate_city_state("Rio/RJ").is_ok());
    }

    #[test]
    fn phone_must_match_mask() {
        assert!(validate_phone("(11) 99999-9999").is_ok());
        assert!(validate_phone("11 99999-9999").is_err());
        assert!(validate_phone("(11) 9999-9999").is_err());
        assert!(validate_phone("(1a) 99999-9999").is_err());
    }

    #[test]
    fn step_completion_checks_presence_only() {
        let mut lead = LeadInfo::default();
        assert!(!lead.identity_step_one_complete());
        lead.set(LeadField::FullName, "x");
        lead.set(LeadField::BirthDate, "not a date");
        assert!(lead.identity_step_one_complete());
        assert!(!lead.identity_step_two_complete());
        lead.set(LeadField::CityState, "a");
        lead.set(LeadField::ParentName, "b");
        lead.set(LeadField::ParentPhone, "c");
        assert!(lead.identity_step_two_complete());
        assert_eq!(lead.get(LeadField::ParentPhone), "c");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(valid_lead()).unwrap();
        assert_eq!(json["fullName"], "João da Silva");
        assert_eq!(json["parentPhone"], "(19) 98765-4321");
        assert!(json.get("full_name").is_none());
    }
}
