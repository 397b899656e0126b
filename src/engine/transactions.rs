use chrono::Utc;

use crate::error::{EngineError, Result, ValidationError};
use crate::models::{Money, Month, NewTransaction, Transaction, TransactionKind};
use crate::session::Session;
use crate::store::FinanceStore;

/// Result of recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub transaction: Transaction,
    /// Budget whose spent amount was increased, if any.
    pub charged_budget: Option<i64>,
}

/// Persist a transaction. An expense is also added to the active budget that
/// covers its date in the same category, using the store's atomic increment.
///
/// An expense that would push that budget's spent amount past what can be
/// stored is rejected before anything is written. Once the transaction is
/// saved the call succeeds. A charge that fails after that is logged and
/// `charged_budget` stays `None`; reconciliation repairs the spent amount.
/// Later edits and deletes do not flow into budgets either.
pub fn record_transaction(
    store: &impl FinanceStore,
    session: &Session,
    candidate: &NewTransaction,
) -> Result<Recorded> {
    let user_id = session.user_id()?;
    let amount = Money::positive(candidate.amount)?;
    let name = candidate.category.trim();
    let category = store
        .get_category_by_name(name)?
        .ok_or_else(|| ValidationError::UnknownCategory(name.to_string()))?;
    let category_id = category
        .id
        .ok_or_else(|| ValidationError::UnknownCategory(name.to_string()))?;

    let budget = match candidate.kind {
        TransactionKind::Outcome => {
            store.get_budget_by_category(user_id, &category.name, candidate.transaction_date)?
        }
        TransactionKind::Income => None,
    };
    if let Some(budget) = &budget {
        if budget.spent_amount.checked_add(amount).is_none() {
            return Err(ValidationError::AmountOverflow(amount.amount()).into());
        }
    }

    let mut transaction = Transaction {
        id: None,
        user_id,
        amount,
        kind: candidate.kind,
        category_id,
        note: candidate.note.trim().to_string(),
        transaction_date: candidate.transaction_date,
        created_at: Utc::now(),
    };
    let id = store.insert_transaction(&transaction)?;
    transaction.id = Some(id);
    tracing::info!(
        transaction_id = id,
        kind = transaction.kind.as_str(),
        category = %category.name,
        amount = %amount.amount(),
        "transaction recorded"
    );

    let charged_budget = budget
        .and_then(|b| b.id)
        .filter(|&budget_id| charge(store, user_id, budget_id, amount));

    Ok(Recorded {
        transaction,
        charged_budget,
    })
}

fn charge(store: &impl FinanceStore, user_id: i64, budget_id: i64, amount: Money) -> bool {
    match store.add_to_budget_spent(budget_id, user_id, amount) {
        Ok(true) => {
            tracing::debug!(budget_id, amount = %amount.amount(), "budget charged");
            true
        }
        Ok(false) => {
            tracing::warn!(budget_id, amount = %amount.amount(), "budget not charged, left for reconciliation");
            false
        }
        Err(e) => {
            tracing::warn!(budget_id, error = %e, "budget charge failed, left for reconciliation");
            false
        }
    }
}

pub fn delete_transaction(
    store: &impl FinanceStore,
    session: &Session,
    transaction_id: i64,
) -> Result<()> {
    let user_id = session.user_id()?;
    if !store.delete_transaction(transaction_id, user_id)? {
        return Err(EngineError::not_found("transaction", transaction_id));
    }
    tracing::info!(transaction_id, "transaction deleted");
    Ok(())
}

/// The user's transactions, newest first, optionally limited to a `YYYY-MM`
/// month.
pub fn list_transactions(
    store: &impl FinanceStore,
    session: &Session,
    month: Option<&str>,
) -> Result<Vec<Transaction>> {
    let user_id = session.user_id()?;
    let month = month.map(Month::parse).transpose()?;
    Ok(store.get_transactions(user_id, month)?)
}
