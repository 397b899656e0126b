//! Budget creation and maintenance, including the overlap guard.
//!
//! Two active budgets for the same category may not cover a common day.
//! The check is a closed-interval intersection over the candidate's whole
//! window, not just the current date.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, Result, ValidationError};
use crate::models::{Budget, Money, NewBudget, Period};
use crate::session::Session;
use crate::store::FinanceStore;

struct ValidBudget {
    category: String,
    limit_amount: Money,
    start_date: NaiveDate,
    end_date: NaiveDate,
    period: Period,
}

fn validate(candidate: &NewBudget) -> std::result::Result<ValidBudget, ValidationError> {
    let category = candidate.category.trim();
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    let limit_amount = Money::positive(candidate.limit_amount)?;
    let period: Period = candidate.period.parse()?;
    let start_date = candidate
        .start_date
        .ok_or(ValidationError::MissingDate("start date"))?;
    let end_date = match candidate.end_date {
        Some(end) => end,
        None => period
            .default_end(start_date)
            .ok_or(ValidationError::MissingDate("end date"))?,
    };
    if end_date < start_date {
        return Err(ValidationError::InvertedRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok(ValidBudget {
        category: category.to_string(),
        limit_amount,
        start_date,
        end_date,
        period,
    })
}

/// First active budget of the user in `category` whose window intersects
/// `[start, end]`, ignoring `exclude`.
fn find_overlap(
    store: &impl FinanceStore,
    user_id: i64,
    category: &str,
    start: NaiveDate,
    end: NaiveDate,
    exclude: Option<i64>,
) -> Result<Option<Budget>> {
    Ok(store
        .get_budgets_by_user(user_id)?
        .into_iter()
        .filter(|b| b.is_active && b.id != exclude)
        .find(|b| b.is_category(category) && b.overlaps(start, end)))
}

fn conflict(existing: Budget) -> EngineError {
    EngineError::Conflict {
        category: existing.category,
        existing_id: existing.id.unwrap_or_default(),
        existing_start: existing.start_date,
        existing_end: existing.end_date,
    }
}

/// Validate and persist a new active budget with nothing spent yet.
///
/// A missing end date defaults to the last day of one period from the start.
pub fn create_budget(
    store: &impl FinanceStore,
    session: &Session,
    candidate: &NewBudget,
) -> Result<Budget> {
    let user_id = session.user_id()?;
    let valid = validate(candidate)?;

    if let Some(existing) = find_overlap(
        store,
        user_id,
        &valid.category,
        valid.start_date,
        valid.end_date,
        None,
    )? {
        tracing::debug!(
            category = %valid.category,
            existing_id = ?existing.id,
            "budget rejected by overlap guard"
        );
        return Err(conflict(existing));
    }

    let mut budget = Budget {
        id: None,
        user_id,
        category: valid.category,
        limit_amount: valid.limit_amount,
        spent_amount: Money::ZERO,
        start_date: valid.start_date,
        end_date: valid.end_date,
        period: valid.period,
        is_active: true,
    };
    let id = store.save_budget(&budget)?;
    budget.id = Some(id);

    tracing::info!(
        budget_id = id,
        category = %budget.category,
        limit = %budget.limit_amount.amount(),
        start = %budget.start_date,
        end = %budget.end_date,
        "budget created"
    );
    Ok(budget)
}

/// Overwrite a budget's category, limit, window and period.
///
/// The spent amount and active flag are kept. An active budget is checked
/// against the user's other active budgets the same way as on creation.
pub fn update_budget(
    store: &impl FinanceStore,
    session: &Session,
    budget_id: i64,
    candidate: &NewBudget,
) -> Result<Budget> {
    let user_id = session.user_id()?;
    let current = store
        .get_budget(budget_id, user_id)?
        .ok_or(EngineError::not_found("budget", budget_id))?;
    let valid = validate(candidate)?;

    if current.is_active {
        if let Some(existing) = find_overlap(
            store,
            user_id,
            &valid.category,
            valid.start_date,
            valid.end_date,
            Some(budget_id),
        )? {
            return Err(conflict(existing));
        }
    }

    let budget = Budget {
        category: valid.category,
        limit_amount: valid.limit_amount,
        start_date: valid.start_date,
        end_date: valid.end_date,
        period: valid.period,
        ..current
    };
    if !store.update_budget(&budget)? {
        return Err(EngineError::not_found("budget", budget_id));
    }
    tracing::info!(budget_id, category = %budget.category, "budget updated");
    Ok(budget)
}

/// Change only the limit of an existing budget.
pub fn update_budget_limit(
    store: &impl FinanceStore,
    session: &Session,
    budget_id: i64,
    limit_amount: Decimal,
) -> Result<Budget> {
    let user_id = session.user_id()?;
    let current = store
        .get_budget(budget_id, user_id)?
        .ok_or(EngineError::not_found("budget", budget_id))?;
    let candidate = NewBudget {
        limit_amount,
        ..NewBudget::from(&current)
    };
    update_budget(store, session, budget_id, &candidate)
}

/// Soft delete: the budget stays on record but is no longer classified,
/// reconciled or charged.
pub fn deactivate_budget(store: &impl FinanceStore, session: &Session, budget_id: i64) -> Result<()> {
    let user_id = session.user_id()?;
    if !store.set_budget_active(budget_id, user_id, false)? {
        return Err(EngineError::not_found("budget", budget_id));
    }
    tracing::info!(budget_id, "budget deactivated");
    Ok(())
}

pub fn delete_budget(store: &impl FinanceStore, session: &Session, budget_id: i64) -> Result<()> {
    let user_id = session.user_id()?;
    if !store.delete_budget(budget_id, user_id)? {
        return Err(EngineError::not_found("budget", budget_id));
    }
    tracing::info!(budget_id, "budget deleted");
    Ok(())
}
