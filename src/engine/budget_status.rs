use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Budget;

/// Usage at or above this percentage is `Warning`.
pub const WARNING_THRESHOLD: Decimal = Decimal::from_parts(70, 0, 0, false, 0);
/// Usage at or above this percentage is `Critical`.
pub const CRITICAL_THRESHOLD: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetTier {
    Inactive,
    OverBudget,
    Critical,
    Warning,
    Healthy,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::OverBudget => "OVER_BUDGET",
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Healthy => "HEALTHY",
        }
    }

    /// Tiers that should be surfaced to the user as an alert.
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::OverBudget | Self::Critical)
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetStatus {
    pub tier: BudgetTier,
    /// Exact `spent / limit * 100`; zero when the limit is zero.
    pub usage_percentage: Decimal,
    /// `limit - spent`, negative once the budget is overspent.
    pub remaining: Decimal,
}

impl BudgetStatus {
    /// Usage rounded to one decimal place for display.
    pub fn display_percentage(&self) -> Decimal {
        self.usage_percentage
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Usage as a 0.0..=1.0 fill ratio for progress bars.
    pub fn bar_fraction(&self) -> Decimal {
        (self.usage_percentage / Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE)
    }
}

/// Classify a budget from its current field values. Pure: reads only.
///
/// Precedence is inactive, over budget, critical (>= 90%), warning
/// (>= 70%), healthy. Overspending is decided on the amounts themselves so
/// a zero limit with any spend is still over budget.
pub fn classify(budget: &Budget) -> BudgetStatus {
    let usage_percentage = budget.spent_amount.percent_of(budget.limit_amount);
    let remaining = budget.limit_amount.difference(budget.spent_amount);

    let tier = if !budget.is_active {
        BudgetTier::Inactive
    } else if budget.spent_amount > budget.limit_amount {
        BudgetTier::OverBudget
    } else if usage_percentage >= CRITICAL_THRESHOLD {
        BudgetTier::Critical
    } else if usage_percentage >= WARNING_THRESHOLD {
        BudgetTier::Warning
    } else {
        BudgetTier::Healthy
    };

    BudgetStatus {
        tier,
        usage_percentage,
        remaining,
    }
}
