//! Fixed feature layout derived from a user profile.

use rust_decimal::prelude::ToPrimitive;

use crate::error::RecommendError;
use crate::models::profile::UserProfile;

/// Feature names in the order every model is trained and queried with.
pub const FEATURE_SCHEMA: [&str; 7] = [
    "income_level",
    "filing_status",
    "home_owner",
    "self_employed",
    "has_medical_expenses",
    "has_education_expenses",
    "has_charitable_contributions",
];

/// Feature schema as owned strings, the form persisted with a model.
pub fn schema_names() -> Vec<String> {
    FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect()
}

/// Numeric encoding of a profile.
///
/// `filing_status` is 1 only for `married`; every other status, including
/// an absent one, encodes as 0. Booleans encode as 0/1.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; 7],
}

impl FeatureVector {
    /// Encode a profile.
    pub fn from_profile(profile: &UserProfile) -> Result<Self, RecommendError> {
        let issues = profile.validate();
        if !issues.is_empty() {
            return Err(RecommendError::InvalidProfile(issues.join("; ")));
        }

        let income = profile.income_level.to_f64().ok_or_else(|| {
            RecommendError::InvalidProfile(format!(
                "income_level {} is not representable",
                profile.income_level
            ))
        })?;

        Ok(Self {
            values: [
                income,
                flag(profile.is_married()),
                flag(profile.home_owner),
                flag(profile.self_employed),
                flag(profile.has_medical_expenses),
                flag(profile.has_education_expenses),
                flag(profile.has_charitable_contributions),
            ],
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn names() -> &'static [&'static str] {
        &FEATURE_SCHEMA
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
