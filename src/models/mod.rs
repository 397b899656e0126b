mod budget;
mod category;
mod goal;
mod money;
mod transaction;
mod user;

pub use budget::{Budget, NewBudget, Period};
pub use category::Category;
pub use goal::{GoalStatus, NewGoal, SavingGoal};
pub use money::{format_amount, Money};
pub use transaction::{Month, NewTransaction, Transaction, TransactionKind};
pub use user::{AuthKind, User};
