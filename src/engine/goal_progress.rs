use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::SavingGoal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressStatus {
    Completed,
    Overdue,
    InProgress,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Overdue => "OVERDUE",
            Self::InProgress => "IN_PROGRESS",
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub status: ProgressStatus,
    /// Exact `current / target * 100`. Not clamped: over-saving goes past 100.
    pub progress_percentage: Decimal,
    /// `target - current`, negative when over-saved.
    pub remaining_amount: Decimal,
    pub is_completed: bool,
    pub is_overdue: bool,
    /// Days from `today` until the target date; negative once it has passed.
    pub days_remaining: i64,
}

impl GoalProgress {
    pub fn display_percentage(&self) -> Decimal {
        self.progress_percentage
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Progress capped to 0.0..=1.0 for progress bars.
    pub fn bar_fraction(&self) -> Decimal {
        (self.progress_percentage / Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE)
    }
}

/// Compute a goal's read-time progress relative to `today`.
///
/// Completion wins over overdue: a goal that reached its target after the
/// target date is still `Completed`. The persisted `status` field is not
/// consulted or changed here.
pub fn classify(goal: &SavingGoal, today: NaiveDate) -> GoalProgress {
    let progress_percentage = goal.current_amount.percent_of(goal.target_amount);
    let remaining_amount = goal.target_amount.difference(goal.current_amount);
    let is_completed = goal.current_amount >= goal.target_amount;
    let is_overdue = today > goal.target_date && !is_completed;

    let status = if is_completed {
        ProgressStatus::Completed
    } else if is_overdue {
        ProgressStatus::Overdue
    } else {
        ProgressStatus::InProgress
    };

    GoalProgress {
        status,
        progress_percentage,
        remaining_amount,
        is_completed,
        is_overdue,
        days_remaining: (goal.target_date - today).num_days(),
    }
}
