// Money columns hold integer minor units at scale 4 (1.25 is stored as 12500)
// so increments can be done in a single exact UPDATE.
pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    auth_kind      TEXT NOT NULL DEFAULT 'password',
    oauth_provider TEXT,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS transactions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL REFERENCES users(id),
    amount           INTEGER NOT NULL CHECK (amount >= 0),
    kind             TEXT NOT NULL CHECK (kind IN ('INCOME', 'OUTCOME')),
    category_id      INTEGER NOT NULL REFERENCES categories(id),
    note             TEXT NOT NULL DEFAULT '',
    transaction_date TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, transaction_date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

CREATE TABLE IF NOT EXISTS budgets (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(id),
    category      TEXT NOT NULL,
    limit_amount  INTEGER NOT NULL,
    spent_amount  INTEGER NOT NULL DEFAULT 0,
    start_date    TEXT NOT NULL,
    end_date      TEXT NOT NULL,
    period        TEXT NOT NULL,
    is_active     BOOLEAN NOT NULL DEFAULT 1,
    CHECK (end_date >= start_date)
);

CREATE INDEX IF NOT EXISTS idx_budgets_user_category ON budgets(user_id, category COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS saving_goals (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL REFERENCES users(id),
    goal_name      TEXT NOT NULL,
    target_amount  INTEGER NOT NULL,
    current_amount INTEGER NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
    target_date    TEXT NOT NULL,
    created_date   TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE INDEX IF NOT EXISTS idx_saving_goals_user ON saving_goals(user_id);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE saving_goals ADD COLUMN note TEXT NOT NULL DEFAULT '';"),
];
