//! Shared fixtures for engine tests.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::db::Database;
use crate::error::StorageError;
use crate::models::*;
use crate::session::Session;
use crate::store::{FinanceStore, StoreResult};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn money(v: Decimal) -> Money {
    Money::new(v).unwrap()
}

/// In-memory database with one signed-in user.
pub(crate) fn setup() -> (Database, Session) {
    let db = Database::open_in_memory().unwrap();
    let session = sign_in(&db, "alice");
    (db, session)
}

pub(crate) fn sign_in(db: &Database, username: &str) -> Session {
    let mut user = User::new(username, AuthKind::Password);
    user.id = Some(db.insert_user(&user).unwrap());
    Session::create(user).unwrap()
}

pub(crate) fn insert_budget(
    db: &Database,
    session: &Session,
    category: &str,
    limit: Decimal,
    start: NaiveDate,
    end: NaiveDate,
) -> Budget {
    let mut budget = Budget {
        id: None,
        user_id: session.user_id().unwrap(),
        category: category.into(),
        limit_amount: money(limit),
        spent_amount: Money::ZERO,
        start_date: start,
        end_date: end,
        period: Period::Monthly,
        is_active: true,
    };
    budget.id = Some(db.save_budget(&budget).unwrap());
    budget
}

/// Insert a transaction directly, bypassing the add-to-spent path.
pub(crate) fn insert_txn(
    db: &Database,
    session: &Session,
    kind: TransactionKind,
    category: &str,
    amount: Decimal,
    on: NaiveDate,
) -> i64 {
    let category_id = db.get_category_by_name(category).unwrap().unwrap().id.unwrap();
    db.insert_transaction(&Transaction {
        id: None,
        user_id: session.user_id().unwrap(),
        amount: money(amount),
        kind,
        category_id,
        note: String::new(),
        transaction_date: on,
        created_at: chrono::Utc::now(),
    })
    .unwrap()
}

/// Store wrapper that counts writes and can be told to fail specific calls.
pub(crate) struct FlakyStore<'a> {
    pub inner: &'a Database,
    pub failing_categories: RefCell<HashSet<String>>,
    pub failing_goal_ids: RefCell<HashSet<i64>>,
    pub vanishing_goal_ids: RefCell<HashSet<i64>>,
    pub failing_charges: Cell<bool>,
    pub spent_writes: Cell<usize>,
    pub status_writes: Cell<usize>,
}

impl<'a> FlakyStore<'a> {
    pub(crate) fn new(inner: &'a Database) -> Self {
        Self {
            inner,
            failing_categories: RefCell::new(HashSet::new()),
            failing_goal_ids: RefCell::new(HashSet::new()),
            vanishing_goal_ids: RefCell::new(HashSet::new()),
            failing_charges: Cell::new(false),
            spent_writes: Cell::new(0),
            status_writes: Cell::new(0),
        }
    }

    pub(crate) fn fail_category(&self, category: &str) {
        self.failing_categories
            .borrow_mut()
            .insert(category.to_lowercase());
    }

    pub(crate) fn fail_goal(&self, goal_id: i64) {
        self.failing_goal_ids.borrow_mut().insert(goal_id);
    }

    /// Delete the goal just before its next status write lands.
    pub(crate) fn vanish_goal(&self, goal_id: i64) {
        self.vanishing_goal_ids.borrow_mut().insert(goal_id);
    }

    pub(crate) fn fail_budget_charges(&self) {
        self.failing_charges.set(true);
    }

    fn unavailable(what: &str) -> StorageError {
        StorageError::Unavailable(format!("{what}: connection reset"))
    }
}

impl FinanceStore for FlakyStore<'_> {
    fn insert_user(&self, user: &User) -> StoreResult<i64> {
        self.inner.insert_user(user)
    }

    fn get_user_by_name(&self, username: &str) -> StoreResult<Option<User>> {
        self.inner.get_user_by_name(username)
    }

    fn get_categories(&self) -> StoreResult<Vec<Category>> {
        self.inner.get_categories()
    }

    fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        self.inner.get_category(id)
    }

    fn get_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        self.inner.get_category_by_name(name)
    }

    fn insert_category(&self, category: &Category) -> StoreResult<i64> {
        self.inner.insert_category(category)
    }

    fn get_budgets_by_user(&self, user_id: i64) -> StoreResult<Vec<Budget>> {
        self.inner.get_budgets_by_user(user_id)
    }

    fn get_budget(&self, id: i64, user_id: i64) -> StoreResult<Option<Budget>> {
        self.inner.get_budget(id, user_id)
    }

    fn get_budget_by_category(
        &self,
        user_id: i64,
        category: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<Budget>> {
        self.inner.get_budget_by_category(user_id, category, date)
    }

    fn save_budget(&self, budget: &Budget) -> StoreResult<i64> {
        self.inner.save_budget(budget)
    }

    fn update_budget(&self, budget: &Budget) -> StoreResult<bool> {
        self.inner.update_budget(budget)
    }

    fn delete_budget(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        self.inner.delete_budget(id, user_id)
    }

    fn set_budget_active(&self, id: i64, user_id: i64, active: bool) -> StoreResult<bool> {
        self.inner.set_budget_active(id, user_id, active)
    }

    fn set_budget_spent(&self, id: i64, user_id: i64, spent: Money) -> StoreResult<bool> {
        self.spent_writes.set(self.spent_writes.get() + 1);
        self.inner.set_budget_spent(id, user_id, spent)
    }

    fn add_to_budget_spent(&self, id: i64, user_id: i64, delta: Money) -> StoreResult<bool> {
        if self.failing_charges.get() {
            return Err(Self::unavailable("add_to_budget_spent"));
        }
        self.inner.add_to_budget_spent(id, user_id, delta)
    }

    fn get_goals_by_user(&self, user_id: i64) -> StoreResult<Vec<SavingGoal>> {
        self.inner.get_goals_by_user(user_id)
    }

    fn get_goal(&self, id: i64, user_id: i64) -> StoreResult<Option<SavingGoal>> {
        self.inner.get_goal(id, user_id)
    }

    fn save_goal(&self, goal: &SavingGoal) -> StoreResult<i64> {
        self.inner.save_goal(goal)
    }

    fn update_goal(&self, goal: &SavingGoal) -> StoreResult<bool> {
        self.inner.update_goal(goal)
    }

    fn delete_goal(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        self.inner.delete_goal(id, user_id)
    }

    fn add_saving_to_goal(&self, id: i64, user_id: i64, delta: Money) -> StoreResult<bool> {
        self.inner.add_saving_to_goal(id, user_id, delta)
    }

    fn update_goal_status(&self, id: i64, user_id: i64, status: GoalStatus) -> StoreResult<bool> {
        if self.failing_goal_ids.borrow().contains(&id) {
            return Err(Self::unavailable("update_goal_status"));
        }
        if self.vanishing_goal_ids.borrow().contains(&id) {
            self.inner.delete_goal(id, user_id)?;
        }
        self.status_writes.set(self.status_writes.get() + 1);
        self.inner.update_goal_status(id, user_id, status)
    }

    fn insert_transaction(&self, txn: &Transaction) -> StoreResult<i64> {
        self.inner.insert_transaction(txn)
    }

    fn get_transaction(&self, id: i64, user_id: i64) -> StoreResult<Option<Transaction>> {
        self.inner.get_transaction(id, user_id)
    }

    fn get_transactions(&self, user_id: i64, month: Option<Month>) -> StoreResult<Vec<Transaction>> {
        self.inner.get_transactions(user_id, month)
    }

    fn get_transactions_in_range(
        &self,
        user_id: i64,
        category: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Transaction>> {
        if self
            .failing_categories
            .borrow()
            .contains(&category.to_lowercase())
        {
            return Err(Self::unavailable("get_transactions_in_range"));
        }
        self.inner
            .get_transactions_in_range(user_id, category, start, end)
    }

    fn delete_transaction(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        self.inner.delete_transaction(id, user_id)
    }
}
