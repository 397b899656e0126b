use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use rust_decimal::Decimal;

use spendwise::engine::{self, ProgressStatus};
use spendwise::models::{
    format_amount, AuthKind, Category, Money, NewBudget, NewGoal, NewTransaction,
};
use spendwise::{Database, Session};

#[derive(Subcommand, Default)]
pub(crate) enum Command {
    /// Refresh and print budgets, goals and alerts
    #[default]
    Dashboard,

    /// Recompute every active budget's spent amount from its transactions
    Reconcile,

    #[command(subcommand)]
    User(UserCommand),

    #[command(subcommand)]
    Category(CategoryCommand),

    #[command(subcommand)]
    Budget(BudgetCommand),

    #[command(subcommand)]
    Goal(GoalCommand),

    #[command(subcommand, alias = "transaction")]
    Txn(TxnCommand),
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    /// Register a user
    Add {
        name: String,
        /// Mark the user as signing in through this OAuth provider
        #[arg(long)]
        oauth: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum CategoryCommand {
    Add { name: String },
    List,
}

#[derive(Subcommand)]
pub(crate) enum BudgetCommand {
    /// Create a budget for a category
    Add {
        category: String,
        #[arg(value_parser = parse_amount)]
        limit: Decimal,
        /// First day covered (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day covered (default: one period after the start)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// weekly, monthly or yearly
        #[arg(long, default_value = "monthly")]
        period: String,
    },
    List,
    UpdateLimit {
        id: i64,
        #[arg(value_parser = parse_amount)]
        limit: Decimal,
    },
    Deactivate { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub(crate) enum GoalCommand {
    Add {
        name: String,
        #[arg(value_parser = parse_amount)]
        target: Decimal,
        /// YYYY-MM-DD, today or later
        target_date: NaiveDate,
    },
    List,
    /// Put money towards a goal
    Save {
        id: i64,
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
    },
    Pause { id: i64 },
    Resume { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub(crate) enum TxnCommand {
    /// Record an expense (or income with --income)
    Add {
        category: String,
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
        #[arg(long)]
        income: bool,
        /// Transaction date (default: today)
        #[arg(long, short)]
        date: Option<NaiveDate>,
        #[arg(long, short, default_value = "")]
        note: String,
    },
    List {
        /// Month to list, YYYY-MM
        #[arg(long, short)]
        month: Option<String>,
    },
    Delete { id: i64 },
}

fn parse_amount(s: &str) -> std::result::Result<Decimal, String> {
    Money::parse(s)
        .map(|m| m.amount())
        .map_err(|e| e.to_string())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn as_cli(command: Command, db: &Database, session: &Session) -> Result<()> {
    match command {
        Command::Dashboard => cli_dashboard(db, session),
        Command::Reconcile => cli_reconcile(db, session),
        Command::User(cmd) => cli_user(cmd, db),
        Command::Category(cmd) => cli_category(cmd, db),
        Command::Budget(cmd) => cli_budget(cmd, db, session),
        Command::Goal(cmd) => cli_goal(cmd, db, session),
        Command::Txn(cmd) => cli_txn(cmd, db, session),
    }
}

fn cli_dashboard(db: &Database, session: &Session) -> Result<()> {
    let today = today();
    let dashboard = engine::refresh_dashboard(db, session, today)?;

    println!("Spendwise: {} ({today})", session.user().username);
    println!("{}", "─".repeat(60));
    println!("  Income:    {}", dashboard.monthly_income);
    println!("  Expenses:  {}", dashboard.monthly_expenses);
    println!("  Net:       {}", format_amount(dashboard.monthly_net()));

    if !dashboard.budgets.is_empty() {
        println!();
        println!("Budgets:");
        for (budget, status) in &dashboard.budgets {
            println!(
                "  {:<4} {:<20} {:>12} / {:<12} {:>6}%  {}",
                budget.id.unwrap_or(0),
                budget.category,
                budget.spent_amount.to_string(),
                budget.limit_amount.to_string(),
                status.display_percentage().to_string(),
                status.tier,
            );
        }
    }

    if !dashboard.goals.is_empty() {
        println!();
        println!("Goals:");
        for (goal, progress) in &dashboard.goals {
            let due = match progress.status {
                ProgressStatus::Completed => String::new(),
                _ if progress.days_remaining >= 0 => {
                    format!("{} days left", progress.days_remaining)
                }
                _ => format!("{} days late", -progress.days_remaining),
            };
            println!(
                "  {:<4} {:<20} {:>12} / {:<12} {:>6}%  {:<11} {due}",
                goal.id.unwrap_or(0),
                goal.goal_name,
                goal.current_amount.to_string(),
                goal.target_amount.to_string(),
                progress.display_percentage().to_string(),
                progress.status.as_str(),
            );
        }
    }

    if !dashboard.alerts.is_empty() {
        println!();
        println!("Alerts:");
        for alert in &dashboard.alerts {
            println!("  ! {alert}");
        }
    }

    let failures = dashboard.reconciliation.failures().count() + dashboard.goal_sync_failures;
    if failures > 0 {
        eprintln!("Warning: {failures} record(s) could not be refreshed; showing stored values");
    }
    Ok(())
}

fn cli_reconcile(db: &Database, session: &Session) -> Result<()> {
    let batch = engine::reconcile_all(db, session)?;
    for (id, outcome) in &batch.outcomes {
        match outcome {
            Ok(rec) if rec.written => println!(
                "Budget {id}: {} -> {}",
                rec.previous, rec.actual
            ),
            Ok(rec) => println!("Budget {id}: {} (unchanged)", rec.actual),
            Err(e) => eprintln!("Budget {id}: {e}"),
        }
    }
    println!(
        "Reconciled {} budget(s), {} updated",
        batch.outcomes.len(),
        batch.written_count()
    );
    if !batch.is_clean() {
        anyhow::bail!("Some budgets could not be reconciled");
    }
    Ok(())
}

fn cli_user(cmd: UserCommand, db: &Database) -> Result<()> {
    match cmd {
        UserCommand::Add { name, oauth } => {
            let auth = match oauth {
                Some(provider) => AuthKind::OAuth { provider },
                None => AuthKind::Password,
            };
            let user = engine::register_user(db, &name, auth)?;
            println!("Added user {} ({})", user.username, user.auth.tag());
        }
    }
    Ok(())
}

fn cli_category(cmd: CategoryCommand, db: &Database) -> Result<()> {
    match cmd {
        CategoryCommand::Add { name } => {
            let category = engine::add_category(db, &name)?;
            println!("Added category: {category}");
        }
        CategoryCommand::List => {
            for category in engine::list_categories(db)? {
                println!("  {:<4} {}", category.id.unwrap_or(0), category.name);
            }
        }
    }
    Ok(())
}

fn cli_budget(cmd: BudgetCommand, db: &Database, session: &Session) -> Result<()> {
    match cmd {
        BudgetCommand::Add {
            category,
            limit,
            start,
            end,
            period,
        } => {
            let candidate = NewBudget {
                category,
                limit_amount: limit,
                start_date: Some(start.unwrap_or_else(today)),
                end_date: end,
                period,
            };
            let budget = engine::create_budget(db, session, &candidate)?;
            println!(
                "Created budget {} for {}: {} from {} to {}",
                budget.id.unwrap_or(0),
                budget.category,
                budget.limit_amount,
                budget.start_date,
                budget.end_date
            );
        }
        BudgetCommand::List => {
            let budgets = db_budgets(db, session)?;
            if budgets.is_empty() {
                println!("No budgets");
                return Ok(());
            }
            println!(
                "{:<4} {:<20} {:>12} {:>12} {:<10} {:<10} {:<8} Status",
                "ID", "Category", "Limit", "Spent", "Start", "End", "Period"
            );
            println!("{}", "─".repeat(90));
            for (budget, status) in budgets {
                println!(
                    "{:<4} {:<20} {:>12} {:>12} {:<10} {:<10} {:<8} {}",
                    budget.id.unwrap_or(0),
                    budget.category,
                    budget.limit_amount.to_string(),
                    budget.spent_amount.to_string(),
                    budget.start_date,
                    budget.end_date,
                    budget.period.as_str(),
                    status.tier,
                );
            }
        }
        BudgetCommand::UpdateLimit { id, limit } => {
            let budget = engine::update_budget_limit(db, session, id, limit)?;
            println!("Budget {id} limit is now {}", budget.limit_amount);
        }
        BudgetCommand::Deactivate { id } => {
            engine::deactivate_budget(db, session, id)?;
            println!("Deactivated budget {id}");
        }
        BudgetCommand::Delete { id } => {
            engine::delete_budget(db, session, id)?;
            println!("Deleted budget {id}");
        }
    }
    Ok(())
}

fn db_budgets(
    db: &Database,
    session: &Session,
) -> Result<Vec<(spendwise::models::Budget, engine::BudgetStatus)>> {
    use spendwise::FinanceStore;

    let budgets = db
        .get_budgets_by_user(session.user_id()?)
        .context("Failed to load budgets")?;
    Ok(budgets
        .into_iter()
        .map(|b| {
            let status = engine::budget_status::classify(&b);
            (b, status)
        })
        .collect())
}

fn cli_goal(cmd: GoalCommand, db: &Database, session: &Session) -> Result<()> {
    match cmd {
        GoalCommand::Add {
            name,
            target,
            target_date,
        } => {
            let goal = engine::create_goal(
                db,
                session,
                &NewGoal::new(name, target, target_date),
                today(),
            )?;
            println!(
                "Created goal {}: {} by {}",
                goal.id.unwrap_or(0),
                goal.target_amount,
                goal.target_date
            );
        }
        GoalCommand::List => {
            use spendwise::FinanceStore;

            let today = today();
            let goals = db
                .get_goals_by_user(session.user_id()?)
                .context("Failed to load goals")?;
            if goals.is_empty() {
                println!("No goals");
                return Ok(());
            }
            println!(
                "{:<4} {:<20} {:>12} {:>12} {:<10} {:<9} Progress",
                "ID", "Goal", "Saved", "Target", "Due", "Status"
            );
            println!("{}", "─".repeat(85));
            for goal in goals {
                let progress = engine::goal_progress::classify(&goal, today);
                println!(
                    "{:<4} {:<20} {:>12} {:>12} {:<10} {:<9} {}% {}",
                    goal.id.unwrap_or(0),
                    goal.goal_name,
                    goal.current_amount.to_string(),
                    goal.target_amount.to_string(),
                    goal.target_date,
                    goal.status.as_str(),
                    progress.display_percentage(),
                    progress.status,
                );
            }
        }
        GoalCommand::Save { id, amount } => {
            let goal = engine::add_saving(db, session, id, amount)?;
            println!(
                "{}: {} of {} saved",
                goal.goal_name, goal.current_amount, goal.target_amount
            );
            if goal.is_completed() {
                println!("Goal reached!");
            }
        }
        GoalCommand::Pause { id } => {
            let status = engine::set_goal_paused(db, session, id, true)?;
            println!("Goal {id} is {status}");
        }
        GoalCommand::Resume { id } => {
            let status = engine::set_goal_paused(db, session, id, false)?;
            println!("Goal {id} is {status}");
        }
        GoalCommand::Delete { id } => {
            engine::delete_goal(db, session, id)?;
            println!("Deleted goal {id}");
        }
    }
    Ok(())
}

fn cli_txn(cmd: TxnCommand, db: &Database, session: &Session) -> Result<()> {
    match cmd {
        TxnCommand::Add {
            category,
            amount,
            income,
            date,
            note,
        } => {
            let date = date.unwrap_or_else(today);
            let base = if income {
                NewTransaction::income(amount, category, date)
            } else {
                NewTransaction::expense(amount, category, date)
            };
            let candidate = base.with_note(note);
            let recorded = engine::record_transaction(db, session, &candidate)?;
            println!(
                "Recorded transaction {}: {} {}",
                recorded.transaction.id.unwrap_or(0),
                recorded.transaction.kind.as_str(),
                recorded.transaction.amount
            );
            if let Some(budget_id) = recorded.charged_budget {
                println!("Charged to budget {budget_id}");
            }
        }
        TxnCommand::List { month } => {
            let txns = engine::list_transactions(db, session, month.as_deref())?;
            if txns.is_empty() {
                println!("No transactions");
                return Ok(());
            }
            let categories = engine::list_categories(db)?;
            println!(
                "{:<5} {:<10} {:<8} {:>12} {:<20} Note",
                "ID", "Date", "Type", "Amount", "Category"
            );
            println!("{}", "─".repeat(75));
            for t in &txns {
                let category = Category::find_by_id(&categories, t.category_id)
                    .map(|c| c.name.as_str())
                    .unwrap_or("?");
                println!(
                    "{:<5} {:<10} {:<8} {:>12} {:<20} {}",
                    t.id.unwrap_or(0),
                    t.transaction_date,
                    t.kind.as_str(),
                    format_amount(t.signed_amount()),
                    category,
                    t.note
                );
            }
        }
        TxnCommand::Delete { id } => {
            engine::delete_transaction(db, session, id)?;
            println!("Deleted transaction {id} (run `reconcile` to update budgets)");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rust_decimal_macros::dec;
    use spendwise::engine::BudgetTier;
    use spendwise::models::Period;

    #[test]
    fn test_parse_amount_accepts_currency_input() {
        assert_eq!(parse_amount("$1,234.50").unwrap(), dec!(1234.50));
        assert_eq!(parse_amount("20").unwrap(), dec!(20));
        assert!(parse_amount("twenty").is_err());
        assert!(parse_amount("-5").is_err());
    }

    #[test]
    fn test_commands_drive_the_engine() {
        let db = Database::open_in_memory().unwrap();
        let session = engine::sign_in_or_register(&db, "default").unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        cli_budget(
            BudgetCommand::Add {
                category: "Food".into(),
                limit: dec!(100),
                start: Some(start),
                end: None,
                period: Period::Monthly.as_str().into(),
            },
            &db,
            &session,
        )
        .unwrap();
        cli_txn(
            TxnCommand::Add {
                category: "Food".into(),
                amount: dec!(95),
                income: false,
                date: Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
                note: String::new(),
            },
            &db,
            &session,
        )
        .unwrap();

        let budgets = db_budgets(&db, &session).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].1.tier, BudgetTier::Critical);
        cli_reconcile(&db, &session).unwrap();
    }

    #[test]
    fn test_default_command_is_dashboard() {
        assert!(matches!(Command::default(), Command::Dashboard));
    }
}
