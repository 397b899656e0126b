//! Error types for the progress engine.
//!
//! Input problems are [`ValidationError`]s and are always raised before
//! anything is written. Storage failures are [`StorageError`]s. Both roll up
//! into [`EngineError`], which is what every engine operation returns.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Bad input, rejected before any persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("category must not be empty")]
    EmptyCategory,

    #[error("goal name must not be empty")]
    EmptyGoalName,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("amount must not be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("amount must be greater than zero: {0}")]
    NonPositiveAmount(Decimal),

    #[error("amount has more than {max_scale} decimal places: {value}")]
    TooPrecise { value: Decimal, max_scale: u32 },

    #[error("amount is too large: {0}")]
    AmountOverflow(Decimal),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("{0} is required")]
    MissingDate(&'static str),

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("target date {target} is in the past (today is {today})")]
    TargetDateInPast { target: NaiveDate, today: NaiveDate },

    #[error("invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("unknown period '{0}' (expected weekly, monthly or yearly)")]
    UnknownPeriod(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// Failure talking to the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt value in {column}: '{value}'")]
    Corrupt { column: &'static str, value: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "an active budget for '{category}' already covers {existing_start} to {existing_end} (budget #{existing_id})"
    )]
    Conflict {
        category: String,
        existing_id: i64,
        existing_start: NaiveDate,
        existing_end: NaiveDate,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("no user named '{0}'")]
    UnknownUser(String),

    #[error("session has been invalidated")]
    SessionInvalidated,
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Validation and conflict errors can be fixed by the caller and retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Conflict { .. })
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(e))
    }
}

/// Failure loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a data directory for this platform")]
    NoDataDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
