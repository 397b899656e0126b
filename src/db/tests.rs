#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn money(v: rust_decimal::Decimal) -> Money {
    Money::new(v).unwrap()
}

fn add_user(db: &Database, name: &str) -> i64 {
    db.insert_user(&User::new(name, AuthKind::Password)).unwrap()
}

fn food_budget(user_id: i64, start: NaiveDate, end: NaiveDate) -> Budget {
    Budget {
        id: None,
        user_id,
        category: "Food".into(),
        limit_amount: money(dec!(500)),
        spent_amount: Money::ZERO,
        start_date: start,
        end_date: end,
        period: Period::Monthly,
        is_active: true,
    }
}

fn expense(user_id: i64, category_id: i64, amount: rust_decimal::Decimal, on: NaiveDate) -> Transaction {
    Transaction {
        id: None,
        user_id,
        amount: money(amount),
        kind: TransactionKind::Outcome,
        category_id,
        note: String::new(),
        transaction_date: on,
        created_at: Utc::now(),
    }
}

fn category_id(db: &Database, name: &str) -> i64 {
    db.get_category_by_name(name).unwrap().unwrap().id.unwrap()
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.get_categories().unwrap();
    assert!(!cats.is_empty());
    assert!(cats.iter().any(|c| c.name == "Food"));
    assert!(cats.iter().any(|c| c.name == "Uncategorized"));
}

#[test]
fn test_reopen_file_database_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendwise.db");
    {
        let db = Database::open(&path).unwrap();
        add_user(&db, "alice");
    }
    let db = Database::open(&path).unwrap();
    assert!(db.get_user_by_name("alice").unwrap().is_some());
    // Categories are not seeded twice
    let names: Vec<String> = db.get_categories().unwrap().into_iter().map(|c| c.name).collect();
    let mut deduped = names.clone();
    deduped.dedup();
    assert_eq!(names, deduped);
}

// ── Users ─────────────────────────────────────────────────────

#[test]
fn test_user_roundtrip_with_oauth() {
    let db = Database::open_in_memory().unwrap();
    let user = User::new(
        "carol",
        AuthKind::OAuth {
            provider: "google".into(),
        },
    );
    let id = db.insert_user(&user).unwrap();
    let fetched = db.get_user_by_name("CAROL").unwrap().unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.username, "carol");
    assert_eq!(fetched.auth, user.auth);
}

#[test]
fn test_duplicate_username_rejected() {
    let db = Database::open_in_memory().unwrap();
    add_user(&db, "alice");
    assert!(db
        .insert_user(&User::new("Alice", AuthKind::Password))
        .is_err());
}

#[test]
fn test_unknown_user() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_user_by_name("nobody").unwrap().is_none());
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_category_lookup_is_case_insensitive() {
    let db = Database::open_in_memory().unwrap();
    let id = db.insert_category(&Category::new("Pets")).unwrap();
    assert_eq!(db.get_category_by_name("pets").unwrap().unwrap().id, Some(id));
    assert_eq!(db.get_category(id).unwrap().unwrap().name, "Pets");
    assert!(db.get_category(99_999).unwrap().is_none());
    assert!(db.insert_category(&Category::new("PETS")).is_err());
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let mut budget = food_budget(user, date(2024, 1, 1), date(2024, 1, 31));
    budget.limit_amount = money(dec!(1234.5678));
    let id = db.save_budget(&budget).unwrap();

    let fetched = db.get_budget(id, user).unwrap().unwrap();
    budget.id = Some(id);
    assert_eq!(fetched, budget);
}

#[test]
fn test_get_budget_by_category_respects_window_and_activity() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let jan = db
        .save_budget(&food_budget(user, date(2024, 1, 1), date(2024, 1, 31)))
        .unwrap();

    let found = db
        .get_budget_by_category(user, "food", date(2024, 1, 31))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, Some(jan));
    assert!(db
        .get_budget_by_category(user, "Food", date(2024, 2, 1))
        .unwrap()
        .is_none());

    db.set_budget_active(jan, user, false).unwrap();
    assert!(db
        .get_budget_by_category(user, "Food", date(2024, 1, 15))
        .unwrap()
        .is_none());
}

#[test]
fn test_add_to_budget_spent_is_exact() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let id = db
        .save_budget(&food_budget(user, date(2024, 1, 1), date(2024, 1, 31)))
        .unwrap();

    for _ in 0..10 {
        assert!(db.add_to_budget_spent(id, user, money(dec!(0.1))).unwrap());
    }
    let b = db.get_budget(id, user).unwrap().unwrap();
    assert_eq!(b.spent_amount.amount(), dec!(1));
}

#[test]
fn test_add_to_budget_spent_refuses_unstorable_sum() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let id = db
        .save_budget(&food_budget(user, date(2024, 1, 1), date(2024, 1, 31)))
        .unwrap();
    let large = money(dec!(900000000000000));

    assert!(db.add_to_budget_spent(id, user, large).unwrap());
    assert!(!db.add_to_budget_spent(id, user, large).unwrap());

    // Row untouched and still readable
    let budgets = db.get_budgets_by_user(user).unwrap();
    assert_eq!(budgets[0].spent_amount, large);

    // Filling up to the exact limit is fine
    let ceiling = Money::from_minor_units(i64::MAX).unwrap();
    db.set_budget_spent(id, user, Money::ZERO).unwrap();
    assert!(db.add_to_budget_spent(id, user, ceiling).unwrap());
    assert!(!db
        .add_to_budget_spent(id, user, Money::from_minor_units(1).unwrap())
        .unwrap());
    assert_eq!(db.get_budget(id, user).unwrap().unwrap().spent_amount, ceiling);
}

#[test]
fn test_budget_mutations_are_user_scoped() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice");
    let bob = add_user(&db, "bob");
    let id = db
        .save_budget(&food_budget(alice, date(2024, 1, 1), date(2024, 1, 31)))
        .unwrap();

    assert!(db.get_budget(id, bob).unwrap().is_none());
    assert!(db.get_budgets_by_user(bob).unwrap().is_empty());
    assert!(!db.add_to_budget_spent(id, bob, money(dec!(5))).unwrap());
    assert!(!db.set_budget_spent(id, bob, money(dec!(5))).unwrap());
    assert!(!db.delete_budget(id, bob).unwrap());
    assert_eq!(
        db.get_budget(id, alice).unwrap().unwrap().spent_amount,
        Money::ZERO
    );
}

#[test]
fn test_update_and_delete_budget() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let id = db
        .save_budget(&food_budget(user, date(2024, 1, 1), date(2024, 1, 31)))
        .unwrap();
    let mut budget = db.get_budget(id, user).unwrap().unwrap();
    budget.limit_amount = money(dec!(750));
    budget.period = Period::Weekly;
    assert!(db.update_budget(&budget).unwrap());
    assert_eq!(db.get_budget(id, user).unwrap().unwrap(), budget);

    assert!(db.delete_budget(id, user).unwrap());
    assert!(db.get_budget(id, user).unwrap().is_none());
    assert!(!db.delete_budget(id, user).unwrap());
}

#[test]
fn test_update_budget_without_id_is_noop() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let budget = food_budget(user, date(2024, 1, 1), date(2024, 1, 31));
    assert!(!db.update_budget(&budget).unwrap());
}

#[test]
fn test_corrupt_budget_row_is_reported() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    db.conn
        .execute(
            "INSERT INTO budgets (user_id, category, limit_amount, spent_amount, start_date, end_date, period, is_active)
             VALUES (?1, 'Food', 1000, 0, '2024-01-01', '2024-01-31', 'fortnightly', 1)",
            params![user],
        )
        .unwrap();
    let err = db.get_budgets_by_user(user).unwrap_err();
    assert!(matches!(
        err,
        StorageError::Corrupt {
            column: "budgets.period",
            ..
        }
    ));
}

#[test]
fn test_negative_stored_amount_is_reported() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    db.conn
        .execute(
            "INSERT INTO budgets (user_id, category, limit_amount, spent_amount, start_date, end_date, period, is_active)
             VALUES (?1, 'Food', 1000, -5, '2024-01-01', '2024-01-31', 'monthly', 1)",
            params![user],
        )
        .unwrap();
    assert!(matches!(
        db.get_budgets_by_user(user),
        Err(StorageError::Corrupt {
            column: "budgets.spent_amount",
            ..
        })
    ));
}

// ── Saving goals ──────────────────────────────────────────────

fn laptop_goal(user_id: i64) -> SavingGoal {
    SavingGoal {
        id: None,
        user_id,
        goal_name: "Laptop".into(),
        target_amount: money(dec!(1500)),
        current_amount: Money::ZERO,
        target_date: date(2024, 12, 1),
        created_date: date(2024, 1, 1),
        status: GoalStatus::Active,
    }
}

#[test]
fn test_goal_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let mut goal = laptop_goal(user);
    let id = db.save_goal(&goal).unwrap();
    goal.id = Some(id);
    assert_eq!(db.get_goal(id, user).unwrap().unwrap(), goal);
    assert_eq!(db.get_goals_by_user(user).unwrap(), vec![goal]);
}

#[test]
fn test_add_saving_to_goal_and_status() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let id = db.save_goal(&laptop_goal(user)).unwrap();

    assert!(db.add_saving_to_goal(id, user, money(dec!(200.25))).unwrap());
    assert!(db.add_saving_to_goal(id, user, money(dec!(99.75))).unwrap());
    assert!(db.update_goal_status(id, user, GoalStatus::Paused).unwrap());

    let goal = db.get_goal(id, user).unwrap().unwrap();
    assert_eq!(goal.current_amount.amount(), dec!(300));
    assert_eq!(goal.status, GoalStatus::Paused);
}

#[test]
fn test_add_saving_to_goal_refuses_unstorable_sum() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let id = db.save_goal(&laptop_goal(user)).unwrap();
    let large = money(dec!(900000000000000));

    assert!(db.add_saving_to_goal(id, user, large).unwrap());
    assert!(!db.add_saving_to_goal(id, user, large).unwrap());

    let goals = db.get_goals_by_user(user).unwrap();
    assert_eq!(goals[0].current_amount, large);
}

#[test]
fn test_goals_are_user_scoped() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice");
    let bob = add_user(&db, "bob");
    let id = db.save_goal(&laptop_goal(alice)).unwrap();

    assert!(db.get_goal(id, bob).unwrap().is_none());
    assert!(!db.add_saving_to_goal(id, bob, money(dec!(10))).unwrap());
    assert!(!db.update_goal_status(id, bob, GoalStatus::Completed).unwrap());
    assert!(!db.delete_goal(id, bob).unwrap());
    assert!(db.delete_goal(id, alice).unwrap());
}

#[test]
fn test_update_goal_overwrites_fields() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let id = db.save_goal(&laptop_goal(user)).unwrap();
    let mut goal = db.get_goal(id, user).unwrap().unwrap();
    goal.goal_name = "Gaming laptop".into();
    goal.target_amount = money(dec!(2500));
    assert!(db.update_goal(&goal).unwrap());
    assert_eq!(db.get_goal(id, user).unwrap().unwrap(), goal);
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let food = category_id(&db, "Food");
    let mut txn = expense(user, food, dec!(12.34), date(2024, 1, 10));
    txn.note = "lunch".into();
    let id = db.insert_transaction(&txn).unwrap();

    let fetched = db.get_transaction(id, user).unwrap().unwrap();
    assert_eq!(fetched.amount, txn.amount);
    assert_eq!(fetched.kind, TransactionKind::Outcome);
    assert_eq!(fetched.note, "lunch");
    assert_eq!(fetched.transaction_date, txn.transaction_date);
    assert_eq!(fetched.created_at.timestamp(), txn.created_at.timestamp());
}

#[test]
fn test_transactions_in_range_filters_category_dates_and_user() {
    let db = Database::open_in_memory().unwrap();
    let alice = add_user(&db, "alice");
    let bob = add_user(&db, "bob");
    let food = category_id(&db, "Food");
    let travel = category_id(&db, "Travel");

    db.insert_transaction(&expense(alice, food, dec!(10), date(2023, 12, 31))).unwrap();
    db.insert_transaction(&expense(alice, food, dec!(20), date(2024, 1, 1))).unwrap();
    db.insert_transaction(&expense(alice, food, dec!(30), date(2024, 1, 31))).unwrap();
    db.insert_transaction(&expense(alice, food, dec!(40), date(2024, 2, 1))).unwrap();
    db.insert_transaction(&expense(alice, travel, dec!(50), date(2024, 1, 15))).unwrap();
    db.insert_transaction(&expense(bob, food, dec!(60), date(2024, 1, 15))).unwrap();

    let in_range = db
        .get_transactions_in_range(alice, "FOOD", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();
    let amounts: Vec<_> = in_range.iter().map(|t| t.amount.amount()).collect();
    assert_eq!(amounts, vec![dec!(20), dec!(30)]);
}

#[test]
fn test_get_transactions_by_month() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let food = category_id(&db, "Food");
    db.insert_transaction(&expense(user, food, dec!(1), date(2024, 1, 5))).unwrap();
    db.insert_transaction(&expense(user, food, dec!(2), date(2024, 1, 20))).unwrap();
    db.insert_transaction(&expense(user, food, dec!(3), date(2024, 2, 5))).unwrap();

    db.insert_transaction(&expense(user, food, dec!(4), date(2024, 10, 1))).unwrap();

    let jan = db
        .get_transactions(user, Some(Month::containing(date(2024, 1, 9))))
        .unwrap();
    assert_eq!(jan.len(), 2);
    // Newest first
    assert_eq!(jan[0].transaction_date, date(2024, 1, 20));
    assert_eq!(jan[1].transaction_date, date(2024, 1, 5));
    assert_eq!(db.get_transactions(user, None).unwrap().len(), 4);
}

#[test]
fn test_delete_transaction() {
    let db = Database::open_in_memory().unwrap();
    let user = add_user(&db, "alice");
    let food = category_id(&db, "Food");
    let id = db
        .insert_transaction(&expense(user, food, dec!(5), date(2024, 1, 5)))
        .unwrap();
    assert!(db.delete_transaction(id, user).unwrap());
    assert!(db.get_transaction(id, user).unwrap().is_none());
    assert!(!db.delete_transaction(id, user).unwrap());
}
