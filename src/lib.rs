//! Budget and savings goal progress tracking over a local SQLite ledger.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod store;

pub use db::Database;
pub use error::{ConfigError, EngineError, Result, StorageError, ValidationError};
pub use session::Session;
pub use store::FinanceStore;
