//! Dashboard refresh: reconcile, sync goal statuses, then classify.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::engine::budget_status::{self, BudgetStatus, BudgetTier};
use crate::engine::goal_progress::{self, GoalProgress, ProgressStatus};
use crate::engine::reconcile::{reconcile_all, sync_all_goals, BatchReconciliation};
use crate::error::{EngineError, Result, ValidationError};
use crate::models::{format_amount, Budget, Money, Month, SavingGoal};
use crate::session::Session;
use crate::store::FinanceStore;

/// Something the user should look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Budget {
        budget_id: i64,
        category: String,
        tier: BudgetTier,
        usage_percentage: Decimal,
    },
    GoalOverdue {
        goal_id: i64,
        goal_name: String,
        target_date: NaiveDate,
        remaining: Decimal,
    },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budget {
                category,
                tier,
                usage_percentage,
                ..
            } => write!(f, "{tier}: {category} budget at {usage_percentage:.1}%"),
            Self::GoalOverdue {
                goal_name,
                target_date,
                remaining,
                ..
            } => write!(
                f,
                "OVERDUE: {goal_name} was due {target_date}, {} to go",
                format_amount(*remaining)
            ),
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    pub budgets: Vec<(Budget, BudgetStatus)>,
    pub goals: Vec<(SavingGoal, GoalProgress)>,
    pub alerts: Vec<Alert>,
    pub reconciliation: BatchReconciliation,
    /// Goals whose status could not be synced this refresh.
    pub goal_sync_failures: usize,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
}

impl Dashboard {
    pub fn monthly_net(&self) -> Decimal {
        self.monthly_income.difference(self.monthly_expenses)
    }
}

fn budget_alert(budget: &Budget, status: &BudgetStatus) -> Option<Alert> {
    if !status.tier.is_alert() {
        return None;
    }
    Some(Alert::Budget {
        budget_id: budget.id?,
        category: budget.category.clone(),
        tier: status.tier,
        usage_percentage: status.display_percentage(),
    })
}

fn goal_alert(goal: &SavingGoal, progress: &GoalProgress) -> Option<Alert> {
    if progress.status != ProgressStatus::Overdue {
        return None;
    }
    Some(Alert::GoalOverdue {
        goal_id: goal.id?,
        goal_name: goal.goal_name.clone(),
        target_date: goal.target_date,
        remaining: progress.remaining_amount,
    })
}

/// Bring stored aggregates up to date, then classify every budget and goal
/// of the session user as of `today`.
///
/// Per-entity reconciliation or sync failures are reported in the result and
/// the affected records are shown with their stored values.
pub fn refresh_dashboard(
    store: &impl FinanceStore,
    session: &Session,
    today: NaiveDate,
) -> Result<Dashboard> {
    let user_id = session.user_id()?;
    let reconciliation = reconcile_all(store, session)?;
    let goal_sync_failures = sync_all_goals(store, session)?
        .iter()
        .filter(|(_, r)| r.is_err())
        .count();

    let budgets: Vec<_> = store
        .get_budgets_by_user(user_id)?
        .into_iter()
        .map(|b| {
            let status = budget_status::classify(&b);
            (b, status)
        })
        .collect();
    let goals: Vec<_> = store
        .get_goals_by_user(user_id)?
        .into_iter()
        .map(|g| {
            let progress = goal_progress::classify(&g, today);
            (g, progress)
        })
        .collect();

    let alerts: Vec<Alert> = budgets
        .iter()
        .filter_map(|(b, s)| budget_alert(b, s))
        .chain(goals.iter().filter_map(|(g, p)| goal_alert(g, p)))
        .collect();

    let (monthly_income, monthly_expenses) = store
        .get_transactions(user_id, Some(Month::containing(today)))?
        .iter()
        .try_fold((Money::ZERO, Money::ZERO), |(income, expenses), t| {
            let overflow = || ValidationError::AmountOverflow(t.amount.amount());
            if t.is_income() {
                Ok::<_, ValidationError>((income.checked_add(t.amount).ok_or_else(overflow)?, expenses))
            } else {
                Ok::<_, ValidationError>((income, expenses.checked_add(t.amount).ok_or_else(overflow)?))
            }
        })
        .map_err(EngineError::Validation)?;

    tracing::debug!(
        user_id,
        budgets = budgets.len(),
        goals = goals.len(),
        alerts = alerts.len(),
        "dashboard refreshed"
    );
    Ok(Dashboard {
        budgets,
        goals,
        alerts,
        reconciliation,
        goal_sync_failures,
        monthly_income,
        monthly_expenses,
    })
}
