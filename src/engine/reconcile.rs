//! Re-deriving stored aggregates from their source records.
//!
//! A budget's `spent_amount` is rebuilt from the OUTCOME transactions in its
//! category and window. Nothing triggers this automatically; callers run it
//! on demand (dashboard refresh), so a budget may lag behind transaction
//! edits until the next run.

use crate::error::{EngineError, Result, ValidationError};
use crate::models::{Budget, GoalStatus, Money, SavingGoal, TransactionKind};
use crate::session::Session;
use crate::store::FinanceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub budget_id: i64,
    pub previous: Money,
    pub actual: Money,
    /// Whether a new value was persisted.
    pub written: bool,
}

#[derive(Debug, Default)]
pub struct BatchReconciliation {
    pub outcomes: Vec<(i64, Result<Reconciliation>)>,
}

impl BatchReconciliation {
    pub fn written_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, r)| matches!(r, Ok(rec) if rec.written))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (i64, &EngineError)> {
        self.outcomes
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (*id, e)))
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Sum of OUTCOME transactions in the budget's category within
/// `[start_date, end_date]`.
pub fn actual_spent(store: &impl FinanceStore, user_id: i64, budget: &Budget) -> Result<Money> {
    let txns = store.get_transactions_in_range(
        user_id,
        &budget.category,
        budget.start_date,
        budget.end_date,
    )?;
    txns.iter()
        .filter(|t| t.kind == TransactionKind::Outcome)
        .try_fold(Money::ZERO, |acc, t| {
            acc.checked_add(t.amount)
                .ok_or(ValidationError::AmountOverflow(t.amount.amount()))
        })
        .map_err(EngineError::from)
}

/// Recompute one budget's spent amount and persist it if it changed.
///
/// Equality is exact decimal equality, so running this twice with no
/// transaction changes performs at most one write.
pub fn reconcile(
    store: &impl FinanceStore,
    session: &Session,
    budget: &Budget,
) -> Result<Reconciliation> {
    let user_id = session.user_id()?;
    let budget_id = budget.id.ok_or(EngineError::not_found("budget", 0))?;
    let actual = actual_spent(store, user_id, budget)?;

    let written = if actual != budget.spent_amount {
        if !store.set_budget_spent(budget_id, user_id, actual)? {
            return Err(EngineError::not_found("budget", budget_id));
        }
        tracing::info!(
            budget_id,
            category = %budget.category,
            previous = %budget.spent_amount.amount(),
            actual = %actual.amount(),
            "budget spent amount reconciled"
        );
        true
    } else {
        tracing::debug!(budget_id, "budget already in sync");
        false
    };

    Ok(Reconciliation {
        budget_id,
        previous: budget.spent_amount,
        actual,
        written,
    })
}

/// Reconcile every active budget of the session user.
///
/// Each budget is independent: a failure is recorded for that budget and the
/// rest still run. Only failing to list the budgets aborts the batch.
pub fn reconcile_all(store: &impl FinanceStore, session: &Session) -> Result<BatchReconciliation> {
    let user_id = session.user_id()?;
    let budgets = store.get_budgets_by_user(user_id)?;

    let mut batch = BatchReconciliation::default();
    for budget in budgets.iter().filter(|b| b.is_active) {
        let Some(id) = budget.id else { continue };
        let outcome = reconcile(store, session, budget);
        if let Err(e) = &outcome {
            tracing::warn!(budget_id = id, error = %e, "budget reconciliation failed");
        }
        batch.outcomes.push((id, outcome));
    }
    tracing::debug!(
        user_id,
        reconciled = batch.outcomes.len(),
        written = batch.written_count(),
        "batch reconciliation finished"
    );
    Ok(batch)
}

/// Persist `COMPLETED` for a goal that has reached its target.
///
/// Returns the newly written status, or `None` when nothing changed. The
/// status is never moved away from `COMPLETED` here.
pub fn sync_goal_status(
    store: &impl FinanceStore,
    session: &Session,
    goal: &SavingGoal,
) -> Result<Option<GoalStatus>> {
    let user_id = session.user_id()?;
    let goal_id = goal.id.ok_or(EngineError::not_found("saving goal", 0))?;

    if !goal.is_completed() || goal.status == GoalStatus::Completed {
        return Ok(None);
    }
    if !store.update_goal_status(goal_id, user_id, GoalStatus::Completed)? {
        return Err(EngineError::not_found("saving goal", goal_id));
    }
    tracing::info!(goal_id, goal = %goal.goal_name, "saving goal completed");
    Ok(Some(GoalStatus::Completed))
}

/// [`sync_goal_status`] for every goal of the session user, isolated per goal.
pub fn sync_all_goals(
    store: &impl FinanceStore,
    session: &Session,
) -> Result<Vec<(i64, Result<Option<GoalStatus>>)>> {
    let user_id = session.user_id()?;
    let goals = store.get_goals_by_user(user_id)?;
    Ok(goals
        .iter()
        .filter_map(|goal| {
            let id = goal.id?;
            let outcome = sync_goal_status(store, session, goal);
            if let Err(e) = &outcome {
                tracing::warn!(goal_id = id, error = %e, "goal status sync failed");
            }
            Some((id, outcome))
        })
        .collect())
}
