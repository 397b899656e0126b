use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Money;

/// Persisted lifecycle state of a goal. Coarser than the read-time
/// progress state computed by the goal classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Paused => "PAUSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            "PAUSED" => Some(Self::Paused),
            _ => None,
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavingGoal {
    pub id: Option<i64>,
    pub user_id: i64,
    pub goal_name: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub target_date: NaiveDate,
    pub created_date: NaiveDate,
    pub status: GoalStatus,
}

impl SavingGoal {
    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub goal_name: String,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
}

impl NewGoal {
    pub fn new(goal_name: impl Into<String>, target_amount: Decimal, target_date: NaiveDate) -> Self {
        Self {
            goal_name: goal_name.into(),
            target_amount,
            target_date: Some(target_date),
        }
    }
}
