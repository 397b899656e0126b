mod schema;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::StorageError;
use crate::models::*;
use crate::store::{FinanceStore, StoreResult};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

const BUDGET_COLUMNS: &str = "id, user_id, category, limit_amount, spent_amount, start_date, end_date, period, is_active";
const GOAL_COLUMNS: &str = "id, user_id, goal_name, target_amount, current_amount, target_date, created_date, status";
const TXN_COLUMNS: &str =
    "t.id, t.user_id, t.amount, t.kind, t.category_id, t.note, t.transaction_date, t.created_at";

/// SQLite-backed store.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> StoreResult<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tx.execute_batch(sql)?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(from = current, to = schema::CURRENT_VERSION, "database migrated");
        }
        tx.commit()?;

        Ok(())
    }

    fn seed_default_categories(&mut self) -> StoreResult<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            "Bills & Subscriptions",
            "Education",
            "Entertainment",
            "Food",
            "Gifts & Donations",
            "Groceries",
            "Health",
            "Housing",
            "Insurance",
            "Salary",
            "Savings",
            "Shopping",
            "Transportation",
            "Travel",
            "Uncategorized",
            "Utilities",
        ];

        let tx = self.conn.transaction()?;
        for name in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
                params![name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

// ── Column conversions ────────────────────────────────────────

fn money_to_units(column: &'static str, money: Money) -> StoreResult<i64> {
    money.to_minor_units().ok_or_else(|| StorageError::Corrupt {
        column,
        value: money.amount().to_string(),
    })
}

fn money_from_units(column: &'static str, units: i64) -> StoreResult<Money> {
    Money::from_minor_units(units).map_err(|_| StorageError::Corrupt {
        column,
        value: units.to_string(),
    })
}

fn date_to_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_from_text(column: &'static str, text: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| StorageError::Corrupt {
        column,
        value: text.to_string(),
    })
}

fn timestamp_from_text(column: &'static str, text: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::Corrupt {
            column,
            value: text.to_string(),
        })
}

// Raw rows are read inside rusqlite closures and converted afterwards so
// bad stored values become `StorageError::Corrupt` instead of defaults.

struct BudgetRow {
    id: i64,
    user_id: i64,
    category: String,
    limit_amount: i64,
    spent_amount: i64,
    start_date: String,
    end_date: String,
    period: String,
    is_active: bool,
}

impl BudgetRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category: row.get(2)?,
            limit_amount: row.get(3)?,
            spent_amount: row.get(4)?,
            start_date: row.get(5)?,
            end_date: row.get(6)?,
            period: row.get(7)?,
            is_active: row.get(8)?,
        })
    }

    fn into_budget(self) -> StoreResult<Budget> {
        let period = self
            .period
            .parse::<Period>()
            .map_err(|_| StorageError::Corrupt {
                column: "budgets.period",
                value: self.period.clone(),
            })?;
        Ok(Budget {
            id: Some(self.id),
            user_id: self.user_id,
            category: self.category,
            limit_amount: money_from_units("budgets.limit_amount", self.limit_amount)?,
            spent_amount: money_from_units("budgets.spent_amount", self.spent_amount)?,
            start_date: date_from_text("budgets.start_date", &self.start_date)?,
            end_date: date_from_text("budgets.end_date", &self.end_date)?,
            period,
            is_active: self.is_active,
        })
    }
}

struct GoalRow {
    id: i64,
    user_id: i64,
    goal_name: String,
    target_amount: i64,
    current_amount: i64,
    target_date: String,
    created_date: String,
    status: String,
}

impl GoalRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            goal_name: row.get(2)?,
            target_amount: row.get(3)?,
            current_amount: row.get(4)?,
            target_date: row.get(5)?,
            created_date: row.get(6)?,
            status: row.get(7)?,
        })
    }

    fn into_goal(self) -> StoreResult<SavingGoal> {
        let status = GoalStatus::parse(&self.status).ok_or_else(|| StorageError::Corrupt {
            column: "saving_goals.status",
            value: self.status.clone(),
        })?;
        Ok(SavingGoal {
            id: Some(self.id),
            user_id: self.user_id,
            goal_name: self.goal_name,
            target_amount: money_from_units("saving_goals.target_amount", self.target_amount)?,
            current_amount: money_from_units("saving_goals.current_amount", self.current_amount)?,
            target_date: date_from_text("saving_goals.target_date", &self.target_date)?,
            created_date: date_from_text("saving_goals.created_date", &self.created_date)?,
            status,
        })
    }
}

struct TransactionRow {
    id: i64,
    user_id: i64,
    amount: i64,
    kind: String,
    category_id: i64,
    note: String,
    transaction_date: String,
    created_at: String,
}

impl TransactionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            kind: row.get(3)?,
            category_id: row.get(4)?,
            note: row.get(5)?,
            transaction_date: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_transaction(self) -> StoreResult<Transaction> {
        let kind = TransactionKind::parse(&self.kind).ok_or_else(|| StorageError::Corrupt {
            column: "transactions.kind",
            value: self.kind.clone(),
        })?;
        Ok(Transaction {
            id: Some(self.id),
            user_id: self.user_id,
            amount: money_from_units("transactions.amount", self.amount)?,
            kind,
            category_id: self.category_id,
            note: self.note,
            transaction_date: date_from_text("transactions.transaction_date", &self.transaction_date)?,
            created_at: timestamp_from_text("transactions.created_at", &self.created_at)?,
        })
    }
}

fn read_user(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, Option<String>, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

impl FinanceStore for Database {
    // ── Users ─────────────────────────────────────────────────

    fn insert_user(&self, user: &User) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO users (username, auth_kind, oauth_provider, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.username,
                user.auth.tag(),
                user.auth.provider(),
                user.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_user_by_name(&self, username: &str) -> StoreResult<Option<User>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, username, auth_kind, oauth_provider, created_at FROM users WHERE username = ?1",
                params![username.trim()],
                read_user,
            )
            .optional()?;
        raw.map(|(id, username, tag, provider, created_at)| -> StoreResult<User> {
            let auth = AuthKind::from_parts(&tag, provider).ok_or_else(|| StorageError::Corrupt {
                column: "users.auth_kind",
                value: tag.clone(),
            })?;
            Ok(User {
                id: Some(id),
                username,
                auth,
                created_at,
            })
        })
        .transpose()
    }

    // ── Categories ────────────────────────────────────────────

    fn get_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    fn get_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE name = ?1",
                params![name.trim()],
                |row| {
                    Ok(Category {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    fn insert_category(&self, cat: &Category) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO categories (name) VALUES (?1)",
            params![cat.name.trim()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Budgets ───────────────────────────────────────────────

    fn get_budgets_by_user(&self, user_id: i64) -> StoreResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ?1 ORDER BY start_date DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map(params![user_id], BudgetRow::read)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(BudgetRow::into_budget).collect()
    }

    fn get_budget(&self, id: i64, user_id: i64) -> StoreResult<Option<Budget>> {
        self.conn
            .query_row(
                &format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                BudgetRow::read,
            )
            .optional()?
            .map(BudgetRow::into_budget)
            .transpose()
    }

    fn get_budget_by_category(
        &self,
        user_id: i64,
        category: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<Budget>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {BUDGET_COLUMNS} FROM budgets
                     WHERE user_id = ?1 AND category = ?2 COLLATE NOCASE AND is_active = 1
                       AND start_date <= ?3 AND end_date >= ?3
                     ORDER BY start_date DESC, id DESC
                     LIMIT 1"
                ),
                params![user_id, category.trim(), date_to_text(date)],
                BudgetRow::read,
            )
            .optional()?
            .map(BudgetRow::into_budget)
            .transpose()
    }

    fn save_budget(&self, budget: &Budget) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO budgets (user_id, category, limit_amount, spent_amount, start_date, end_date, period, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                budget.user_id,
                budget.category,
                money_to_units("budgets.limit_amount", budget.limit_amount)?,
                money_to_units("budgets.spent_amount", budget.spent_amount)?,
                date_to_text(budget.start_date),
                date_to_text(budget.end_date),
                budget.period.as_str(),
                budget.is_active,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_budget(&self, budget: &Budget) -> StoreResult<bool> {
        let Some(id) = budget.id else {
            return Ok(false);
        };
        let changed = self.conn.execute(
            "UPDATE budgets SET category = ?1, limit_amount = ?2, spent_amount = ?3, start_date = ?4,
                    end_date = ?5, period = ?6, is_active = ?7
             WHERE id = ?8 AND user_id = ?9",
            params![
                budget.category,
                money_to_units("budgets.limit_amount", budget.limit_amount)?,
                money_to_units("budgets.spent_amount", budget.spent_amount)?,
                date_to_text(budget.start_date),
                date_to_text(budget.end_date),
                budget.period.as_str(),
                budget.is_active,
                id,
                budget.user_id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_budget(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn set_budget_active(&self, id: i64, user_id: i64, active: bool) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE budgets SET is_active = ?1 WHERE id = ?2 AND user_id = ?3",
            params![active, id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn set_budget_spent(&self, id: i64, user_id: i64, spent: Money) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE budgets SET spent_amount = ?1 WHERE id = ?2 AND user_id = ?3",
            params![money_to_units("budgets.spent_amount", spent)?, id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn add_to_budget_spent(&self, id: i64, user_id: i64, delta: Money) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE budgets SET spent_amount = spent_amount + ?1
             WHERE id = ?2 AND user_id = ?3 AND spent_amount <= ?4 - ?1",
            params![money_to_units("budgets.spent_amount", delta)?, id, user_id, i64::MAX],
        )?;
        Ok(changed > 0)
    }

    // ── Saving goals ──────────────────────────────────────────

    fn get_goals_by_user(&self, user_id: i64) -> StoreResult<Vec<SavingGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM saving_goals WHERE user_id = ?1 ORDER BY target_date, id"
        ))?;
        let rows = stmt
            .query_map(params![user_id], GoalRow::read)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(GoalRow::into_goal).collect()
    }

    fn get_goal(&self, id: i64, user_id: i64) -> StoreResult<Option<SavingGoal>> {
        self.conn
            .query_row(
                &format!("SELECT {GOAL_COLUMNS} FROM saving_goals WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                GoalRow::read,
            )
            .optional()?
            .map(GoalRow::into_goal)
            .transpose()
    }

    fn save_goal(&self, goal: &SavingGoal) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO saving_goals (user_id, goal_name, target_amount, current_amount, target_date, created_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                goal.user_id,
                goal.goal_name,
                money_to_units("saving_goals.target_amount", goal.target_amount)?,
                money_to_units("saving_goals.current_amount", goal.current_amount)?,
                date_to_text(goal.target_date),
                date_to_text(goal.created_date),
                goal.status.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_goal(&self, goal: &SavingGoal) -> StoreResult<bool> {
        let Some(id) = goal.id else {
            return Ok(false);
        };
        let changed = self.conn.execute(
            "UPDATE saving_goals SET goal_name = ?1, target_amount = ?2, current_amount = ?3,
                    target_date = ?4, status = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                goal.goal_name,
                money_to_units("saving_goals.target_amount", goal.target_amount)?,
                money_to_units("saving_goals.current_amount", goal.current_amount)?,
                date_to_text(goal.target_date),
                goal.status.as_str(),
                id,
                goal.user_id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_goal(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM saving_goals WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn add_saving_to_goal(&self, id: i64, user_id: i64, delta: Money) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE saving_goals SET current_amount = current_amount + ?1
             WHERE id = ?2 AND user_id = ?3 AND current_amount <= ?4 - ?1",
            params![
                money_to_units("saving_goals.current_amount", delta)?,
                id,
                user_id,
                i64::MAX
            ],
        )?;
        Ok(changed > 0)
    }

    fn update_goal_status(&self, id: i64, user_id: i64, status: GoalStatus) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE saving_goals SET status = ?1 WHERE id = ?2 AND user_id = ?3",
            params![status.as_str(), id, user_id],
        )?;
        Ok(changed > 0)
    }

    // ── Transactions ──────────────────────────────────────────

    fn insert_transaction(&self, txn: &Transaction) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO transactions (user_id, amount, kind, category_id, note, transaction_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                txn.user_id,
                money_to_units("transactions.amount", txn.amount)?,
                txn.kind.as_str(),
                txn.category_id,
                txn.note,
                date_to_text(txn.transaction_date),
                txn.created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_transaction(&self, id: i64, user_id: i64) -> StoreResult<Option<Transaction>> {
        self.conn
            .query_row(
                &format!("SELECT {TXN_COLUMNS} FROM transactions t WHERE t.id = ?1 AND t.user_id = ?2"),
                params![id, user_id],
                TransactionRow::read,
            )
            .optional()?
            .map(TransactionRow::into_transaction)
            .transpose()
    }

    fn get_transactions(&self, user_id: i64, month: Option<Month>) -> StoreResult<Vec<Transaction>> {
        let mut sql = format!("SELECT {TXN_COLUMNS} FROM transactions t WHERE t.user_id = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id)];

        if let Some(m) = month {
            sql.push_str(&format!(
                " AND t.transaction_date BETWEEN ?{} AND ?{}",
                param_values.len() + 1,
                param_values.len() + 2
            ));
            param_values.push(Box::new(date_to_text(m.first_day())));
            param_values.push(Box::new(date_to_text(m.last_day())));
        }
        sql.push_str(" ORDER BY t.transaction_date DESC, t.id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_ref.as_slice(), TransactionRow::read)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(TransactionRow::into_transaction)
            .collect()
    }

    fn get_transactions_in_range(
        &self,
        user_id: i64,
        category: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TXN_COLUMNS}
             FROM transactions t
             JOIN categories c ON t.category_id = c.id
             WHERE t.user_id = ?1 AND c.name = ?2
               AND t.transaction_date BETWEEN ?3 AND ?4
             ORDER BY t.transaction_date, t.id"
        ))?;
        let rows = stmt
            .query_map(
                params![user_id, category.trim(), date_to_text(start), date_to_text(end)],
                TransactionRow::read,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(TransactionRow::into_transaction)
            .collect()
    }

    fn delete_transaction(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests;
