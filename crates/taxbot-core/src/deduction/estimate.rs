//! Deduction amount estimates.

use rust_decimal::Decimal;

use crate::models::deduction::DeductionCategory;

/// Estimated deductible amount for a category at a given income.
pub fn estimate_amount(category: DeductionCategory, income: Decimal) -> Decimal {
    match category {
        DeductionCategory::CharitableContributions => {
            capped(income * Decimal::new(3, 2), Decimal::from(10_000))
        }
        DeductionCategory::MedicalExpenses => {
            capped(income * Decimal::new(75, 3), Decimal::from(5_000))
        }
        DeductionCategory::HomeOffice => Decimal::from(1_500),
        DeductionCategory::EducationExpenses => Decimal::from(4_000),
        DeductionCategory::RetirementContributions => {
            capped(income * Decimal::new(10, 2), Decimal::from(6_000))
        }
        DeductionCategory::StateTaxes => capped(income * Decimal::new(5, 2), Decimal::from(10_000)),
    }
}

/// Estimate by category label; unrecognized labels estimate to zero.
pub fn estimate_for_label(label: &str, income: Decimal) -> Decimal {
    label
        .parse::<DeductionCategory>()
        .map(|c| estimate_amount(c, income))
        .unwrap_or(Decimal::ZERO)
}

fn capped(amount: Decimal, cap: Decimal) -> Decimal {
    amount.min(cap).max(Decimal::ZERO)
}
