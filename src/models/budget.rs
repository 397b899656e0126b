use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::Money;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn all() -> &'static [Period] {
        &[Self::Weekly, Self::Monthly, Self::Yearly]
    }

    /// Last day of a period starting on `start`, i.e. start + period - 1 day.
    /// Month arithmetic clamps to the end of shorter months.
    pub fn default_end(&self, start: NaiveDate) -> Option<NaiveDate> {
        let next = match self {
            Self::Weekly => start.checked_add_days(Days::new(7)),
            Self::Monthly => start.checked_add_months(Months::new(1)),
            Self::Yearly => start.checked_add_months(Months::new(12)),
        }?;
        next.pred_opt()
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(ValidationError::UnknownPeriod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub limit_amount: Money,
    pub spent_amount: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: Period,
    pub is_active: bool,
}

impl Budget {
    /// Whether the closed range `[start, end]` intersects this budget's window.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn is_category(&self, category: &str) -> bool {
        self.category.trim().to_lowercase() == category.trim().to_lowercase()
    }
}

/// Unvalidated budget input as it arrives from a form or the command line.
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category: String,
    pub limit_amount: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub period: String,
}

impl NewBudget {
    pub fn new(category: impl Into<String>, limit_amount: Decimal, start_date: NaiveDate) -> Self {
        Self {
            category: category.into(),
            limit_amount,
            start_date: Some(start_date),
            end_date: None,
            period: Period::Monthly.as_str().to_string(),
        }
    }

    pub fn with_end(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period.as_str().to_string();
        self
    }
}

impl From<&Budget> for NewBudget {
    fn from(budget: &Budget) -> Self {
        Self {
            category: budget.category.clone(),
            limit_amount: budget.limit_amount.amount(),
            start_date: Some(budget.start_date),
            end_date: Some(budget.end_date),
            period: budget.period.as_str().to_string(),
        }
    }
}
