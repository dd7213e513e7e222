//! User profile consumed by the deduction recommender.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// IRS filing status.
///
/// Only the exact `"married"` label counts as married; any other label
/// deserializes as [`FilingStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    Married,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
    #[serde(other)]
    Other,
}

/// Taxpayer profile.
///
/// Every field is optional on input; missing flags read as `false` and a
/// missing income as zero. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Annual income.
    pub income_level: Decimal,

    /// Filing status, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_status: Option<FilingStatus>,

    pub home_owner: bool,
    pub self_employed: bool,
    pub has_medical_expenses: bool,
    pub has_education_expenses: bool,
    pub has_charitable_contributions: bool,
}

impl UserProfile {
    pub fn new(income_level: Decimal) -> Self {
        Self {
            income_level,
            ..Self::default()
        }
    }

    pub fn with_filing_status(mut self, status: FilingStatus) -> Self {
        self.filing_status = Some(status);
        self
    }

    pub fn with_home_owner(mut self, value: bool) -> Self {
        self.home_owner = value;
        self
    }

    pub fn with_self_employed(mut self, value: bool) -> Self {
        self.self_employed = value;
        self
    }

    pub fn with_medical_expenses(mut self, value: bool) -> Self {
        self.has_medical_expenses = value;
        self
    }

    pub fn with_education_expenses(mut self, value: bool) -> Self {
        self.has_education_expenses = value;
        self
    }

    pub fn with_charitable_contributions(mut self, value: bool) -> Self {
        self.has_charitable_contributions = value;
        self
    }

    pub fn is_married(&self) -> bool {
        self.filing_status == Some(FilingStatus::Married)
    }

    /// Check the profile is structurally usable.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.income_level.is_sign_negative() && !self.income_level.is_zero() {
            issues.push(format!("income_level must be non-negative, got {}", self.income_level));
        }
        issues
    }
}
