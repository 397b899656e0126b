//! Saving goal lifecycle: creation, deposits, edits and pausing.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::engine::reconcile::sync_goal_status;
use crate::error::{EngineError, Result, ValidationError};
use crate::models::{GoalStatus, Money, NewGoal, SavingGoal};
use crate::session::Session;
use crate::store::FinanceStore;

fn validate_name(name: &str) -> std::result::Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyGoalName);
    }
    Ok(name.to_string())
}

fn target_date(candidate: &NewGoal) -> std::result::Result<NaiveDate, ValidationError> {
    candidate
        .target_date
        .ok_or(ValidationError::MissingDate("target date"))
}

fn load(store: &impl FinanceStore, user_id: i64, goal_id: i64) -> Result<SavingGoal> {
    store
        .get_goal(goal_id, user_id)?
        .ok_or(EngineError::not_found("saving goal", goal_id))
}

/// Create an `ACTIVE` goal with nothing saved. The target date may be
/// `today` but not earlier.
pub fn create_goal(
    store: &impl FinanceStore,
    session: &Session,
    candidate: &NewGoal,
    today: NaiveDate,
) -> Result<SavingGoal> {
    let user_id = session.user_id()?;
    let goal_name = validate_name(&candidate.goal_name)?;
    let target_amount = Money::positive(candidate.target_amount)?;
    let target = target_date(candidate)?;
    if target < today {
        return Err(ValidationError::TargetDateInPast { target, today }.into());
    }

    let mut goal = SavingGoal {
        id: None,
        user_id,
        goal_name,
        target_amount,
        current_amount: Money::ZERO,
        target_date: target,
        created_date: today,
        status: GoalStatus::Active,
    };
    let id = store.save_goal(&goal)?;
    goal.id = Some(id);
    tracing::info!(
        goal_id = id,
        goal = %goal.goal_name,
        target = %goal.target_amount.amount(),
        target_date = %goal.target_date,
        "saving goal created"
    );
    Ok(goal)
}

/// Add `delta` to the goal's saved amount as a single atomic increment,
/// then mark it `COMPLETED` if that reached the target.
///
/// A deposit whose sum would not be storable is rejected and nothing is
/// written.
pub fn add_saving(
    store: &impl FinanceStore,
    session: &Session,
    goal_id: i64,
    delta: Decimal,
) -> Result<SavingGoal> {
    let user_id = session.user_id()?;
    let delta = Money::positive(delta)?;
    if !store.add_saving_to_goal(goal_id, user_id, delta)? {
        // The row is still there, so the store refused the sum
        load(store, user_id, goal_id)?;
        return Err(ValidationError::AmountOverflow(delta.amount()).into());
    }
    tracing::info!(goal_id, amount = %delta.amount(), "saving added");

    let mut goal = load(store, user_id, goal_id)?;
    if let Some(status) = sync_goal_status(store, session, &goal)? {
        goal.status = status;
    }
    Ok(goal)
}

/// Overwrite the goal's name, target amount and target date.
///
/// The target date is not held to today-or-later here: an existing goal may
/// already be past due. Saved amount, creation date and status are kept.
pub fn update_goal(
    store: &impl FinanceStore,
    session: &Session,
    goal_id: i64,
    candidate: &NewGoal,
) -> Result<SavingGoal> {
    let user_id = session.user_id()?;
    let current = load(store, user_id, goal_id)?;
    let goal = SavingGoal {
        goal_name: validate_name(&candidate.goal_name)?,
        target_amount: Money::positive(candidate.target_amount)?,
        target_date: target_date(candidate)?,
        ..current
    };
    if !store.update_goal(&goal)? {
        return Err(EngineError::not_found("saving goal", goal_id));
    }
    tracing::info!(goal_id, goal = %goal.goal_name, "saving goal updated");
    Ok(goal)
}

/// Pause or resume a goal. Completed goals stay completed.
pub fn set_goal_paused(
    store: &impl FinanceStore,
    session: &Session,
    goal_id: i64,
    paused: bool,
) -> Result<GoalStatus> {
    let user_id = session.user_id()?;
    let goal = load(store, user_id, goal_id)?;
    if goal.status == GoalStatus::Completed {
        return Ok(GoalStatus::Completed);
    }

    let status = if paused {
        GoalStatus::Paused
    } else {
        GoalStatus::Active
    };
    if status != goal.status {
        if !store.update_goal_status(goal_id, user_id, status)? {
            return Err(EngineError::not_found("saving goal", goal_id));
        }
        tracing::info!(goal_id, %status, "saving goal status changed");
    }
    Ok(status)
}

pub fn delete_goal(store: &impl FinanceStore, session: &Session, goal_id: i64) -> Result<()> {
    let user_id = session.user_id()?;
    if !store.delete_goal(goal_id, user_id)? {
        return Err(EngineError::not_found("saving goal", goal_id));
    }
    tracing::info!(goal_id, "saving goal deleted");
    Ok(())
}
