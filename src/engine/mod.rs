//! Business rules over the stored records.
//!
//! The classifiers are pure and never write. Everything else goes through a
//! [`FinanceStore`](crate::store::FinanceStore) on behalf of a
//! [`Session`](crate::session::Session).

pub mod budget_status;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod goal_progress;
pub mod goals;
pub mod reconcile;
pub mod transactions;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use budget_status::{BudgetStatus, BudgetTier};
pub use budgets::{create_budget, deactivate_budget, delete_budget, update_budget, update_budget_limit};
pub use categories::{add_category, list_categories};
pub use dashboard::{refresh_dashboard, Alert, Dashboard};
pub use goal_progress::{GoalProgress, ProgressStatus};
pub use goals::{add_saving, create_goal, delete_goal, set_goal_paused, update_goal};
pub use reconcile::{
    reconcile, reconcile_all, sync_all_goals, sync_goal_status, BatchReconciliation, Reconciliation,
};
pub use transactions::{delete_transaction, list_transactions, record_transaction, Recorded};
pub use users::{register_user, sign_in, sign_in_or_register};
