//! Deduction and expense categories, candidates and reports.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Deduction categories in their fixed canonical order.
///
/// The declaration order is used for iteration, tie-breaking, output
/// ordering, and as the class order of trained models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    CharitableContributions,
    MedicalExpenses,
    HomeOffice,
    EducationExpenses,
    RetirementContributions,
    StateTaxes,
}

impl DeductionCategory {
    /// All categories in canonical order.
    pub const ALL: [DeductionCategory; 6] = [
        DeductionCategory::CharitableContributions,
        DeductionCategory::MedicalExpenses,
        DeductionCategory::HomeOffice,
        DeductionCategory::EducationExpenses,
        DeductionCategory::RetirementContributions,
        DeductionCategory::StateTaxes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeductionCategory::CharitableContributions => "charitable_contributions",
            DeductionCategory::MedicalExpenses => "medical_expenses",
            DeductionCategory::HomeOffice => "home_office",
            DeductionCategory::EducationExpenses => "education_expenses",
            DeductionCategory::RetirementContributions => "retirement_contributions",
            DeductionCategory::StateTaxes => "state_taxes",
        }
    }

    /// Position in the canonical order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Category names in canonical order.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl FromStr for DeductionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown deduction category: {}", s))
    }
}

impl fmt::Display for DeductionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense categories assigned to receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    OfficeSupplies,
    Meals,
    Travel,
    Equipment,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::OfficeSupplies => "office_supplies",
            ExpenseCategory::Meals => "meals",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::Equipment => "equipment",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recommended deduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionCandidate {
    /// Deduction category.
    pub category: DeductionCategory,

    /// Scorer confidence (0.0 - 1.0).
    pub confidence: f64,

    /// Estimated deductible amount.
    pub estimated_amount: Decimal,
}

impl DeductionCandidate {
    pub fn new(category: DeductionCategory, confidence: f64, estimated_amount: Decimal) -> Self {
        Self {
            category,
            confidence,
            estimated_amount,
        }
    }
}

/// Which scorer variant produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Trained,
    Default,
}

/// Recommendation output with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// Candidates in canonical category order.
    pub recommendations: Vec<DeductionCandidate>,

    /// Sum of all estimated amounts.
    pub total_estimated_savings: Decimal,

    /// Scorer variant used.
    pub scorer: ScorerKind,

    /// Tax year the report was produced for.
    pub tax_year: i32,
}

impl RecommendationReport {
    pub fn new(recommendations: Vec<DeductionCandidate>, scorer: ScorerKind, tax_year: i32) -> Self {
        let total_estimated_savings = recommendations.iter().map(|r| r.estimated_amount).sum();
        Self {
            recommendations,
            total_estimated_savings,
            scorer,
            tax_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let names = DeductionCategory::names();
        assert_eq!(
            names,
            vec![
                "charitable_contributions",
                "medical_expenses",
                "home_office",
                "education_expenses",
                "retirement_contributions",
                "state_taxes",
            ]
        );
        for (i, c) in DeductionCategory::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "home_office".parse::<DeductionCategory>(),
            Ok(DeductionCategory::HomeOffice)
        );
        assert!("yacht".parse::<DeductionCategory>().is_err());
    }

    #[test]
    fn test_report_total() {
        let report = RecommendationReport::new(
            vec![
                DeductionCandidate::new(DeductionCategory::HomeOffice, 0.7, Decimal::from(1500)),
                DeductionCandidate::new(DeductionCategory::EducationExpenses, 0.6, Decimal::from(4000)),
            ],
            ScorerKind::Trained,
            2024,
        );
        assert_eq!(report.total_estimated_savings, Decimal::from(5500));
    }
}
