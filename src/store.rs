//! Storage contract used by the engine.
//!
//! Every query is scoped to a user. Mutations that address a row by id
//! return `false` (or `None`) when no row for that user matched, so callers
//! can tell "missing" apart from a storage failure.

use chrono::NaiveDate;

use crate::error::StorageError;
use crate::models::{Budget, Category, GoalStatus, Money, Month, SavingGoal, Transaction, User};

pub type StoreResult<T> = std::result::Result<T, StorageError>;

pub trait FinanceStore {
    // ── Users ────────────────────────────────────────────────

    fn insert_user(&self, user: &User) -> StoreResult<i64>;
    fn get_user_by_name(&self, username: &str) -> StoreResult<Option<User>>;

    // ── Categories ───────────────────────────────────────────

    fn get_categories(&self) -> StoreResult<Vec<Category>>;
    fn get_category(&self, id: i64) -> StoreResult<Option<Category>>;
    fn get_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;
    fn insert_category(&self, category: &Category) -> StoreResult<i64>;

    // ── Budgets ──────────────────────────────────────────────

    fn get_budgets_by_user(&self, user_id: i64) -> StoreResult<Vec<Budget>>;
    fn get_budget(&self, id: i64, user_id: i64) -> StoreResult<Option<Budget>>;
    /// The active budget for `category` whose window contains `date`.
    fn get_budget_by_category(
        &self,
        user_id: i64,
        category: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<Budget>>;
    fn save_budget(&self, budget: &Budget) -> StoreResult<i64>;
    /// Full-record overwrite. Only safe when the caller holds the
    /// authoritative copy.
    fn update_budget(&self, budget: &Budget) -> StoreResult<bool>;
    fn delete_budget(&self, id: i64, user_id: i64) -> StoreResult<bool>;
    fn set_budget_active(&self, id: i64, user_id: i64, active: bool) -> StoreResult<bool>;
    fn set_budget_spent(&self, id: i64, user_id: i64, spent: Money) -> StoreResult<bool>;
    /// Atomic `spent = spent + delta`. Returns false, leaving the row
    /// untouched, when no budget matches or the sum would not be storable.
    fn add_to_budget_spent(&self, id: i64, user_id: i64, delta: Money) -> StoreResult<bool>;

    // ── Saving goals ─────────────────────────────────────────

    fn get_goals_by_user(&self, user_id: i64) -> StoreResult<Vec<SavingGoal>>;
    fn get_goal(&self, id: i64, user_id: i64) -> StoreResult<Option<SavingGoal>>;
    fn save_goal(&self, goal: &SavingGoal) -> StoreResult<i64>;
    fn update_goal(&self, goal: &SavingGoal) -> StoreResult<bool>;
    fn delete_goal(&self, id: i64, user_id: i64) -> StoreResult<bool>;
    /// Atomic `current = current + delta`. Returns false, leaving the row
    /// untouched, when no goal matches or the sum would not be storable.
    fn add_saving_to_goal(&self, id: i64, user_id: i64, delta: Money) -> StoreResult<bool>;
    fn update_goal_status(&self, id: i64, user_id: i64, status: GoalStatus) -> StoreResult<bool>;

    // ── Transactions ─────────────────────────────────────────

    fn insert_transaction(&self, txn: &Transaction) -> StoreResult<i64>;
    fn get_transaction(&self, id: i64, user_id: i64) -> StoreResult<Option<Transaction>>;
    /// Transactions for a user, newest first, optionally limited to one
    /// calendar month.
    fn get_transactions(&self, user_id: i64, month: Option<Month>) -> StoreResult<Vec<Transaction>>;
    /// Transactions of every kind whose category name matches `category`
    /// and whose date falls in `[start, end]`.
    fn get_transactions_in_range(
        &self,
        user_id: i64,
        category: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Transaction>>;
    fn delete_transaction(&self, id: i64, user_id: i64) -> StoreResult<bool>;
}
