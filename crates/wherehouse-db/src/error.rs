//! # Storage Errors
//!
//! Everything a repository call can fail with, and how it folds into the
//! outward [`ErrorKind`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  source                               DbError              ErrorKind    │
//! │  ───────────────────────────────      ────────────────     ──────────   │
//! │  rule in wherehouse-core              Core(..)             inner kind   │
//! │  "UNIQUE constraint failed: ..."      UniqueViolation      Conflict     │
//! │  "FOREIGN KEY constraint failed"      ForeignKeyViolation  Conflict     │
//! │  pool closed / timed out              Unavailable          Internal     │
//! │  migration rejected                   Schema               Internal     │
//! │  anything else from SQLite            Storage              Internal     │
//! │  bad wherehouse.toml / env            Config               Internal     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A constraint failure is reported as a plain conflict. SQLite does not say
//! which foreign key failed, and the repositories do not spend extra queries
//! finding out.

use thiserror::Error;
use wherehouse_core::{CoreError, ErrorKind, ValidationError};

const UNIQUE_PREFIX: &str = "UNIQUE constraint failed";
const FOREIGN_KEY_PREFIX: &str = "FOREIGN KEY constraint failed";

#[derive(Debug, Error)]
pub enum DbError {
    /// A domain rule rejected the operation (not found, cycle, bad input, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// `target` is SQLite's description, e.g. `tags.name` or `code namespace`.
    #[error("{target} is already taken")]
    UniqueViolation { target: String },

    /// A row is still referenced, or a reference points nowhere:
    /// a location with children, a user with items, an unknown tag id.
    #[error("Change rejected by a reference between records: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Schema migration failed: {0}")]
    Schema(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        DbError::Core(CoreError::not_found(entity, key))
    }

    /// The outward classification the HTTP layer maps to a status.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Core(e) => e.kind(),
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorKind::Conflict
            }
            DbError::Unavailable(_)
            | DbError::Schema(_)
            | DbError::Storage(_)
            | DbError::Config(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Sorts an SQLite error message into a constraint variant, if it is one.
fn classify_constraint(message: &str) -> Option<DbError> {
    if let Some(rest) = message.strip_prefix(UNIQUE_PREFIX) {
        let target = rest.trim_start_matches(':').trim();
        return Some(DbError::UniqueViolation {
            target: if target.is_empty() { "value" } else { target }.to_string(),
        });
    }
    if message.starts_with(FOREIGN_KEY_PREFIX) {
        return Some(DbError::ForeignKeyViolation {
            message: message.to_string(),
        });
    }
    None
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => classify_constraint(db_err.message())
                .unwrap_or_else(|| DbError::Storage(db_err.message().to_string())),
            sqlx::Error::PoolTimedOut => {
                DbError::Unavailable("timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::Unavailable("store is closed".to_string()),
            other => DbError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Schema(err.to_string())
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::from(err))
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_messages() {
        match classify_constraint("UNIQUE constraint failed: tags.name") {
            Some(DbError::UniqueViolation { target }) => assert_eq!(target, "tags.name"),
            other => panic!("unexpected {other:?}"),
        }
        match classify_constraint("UNIQUE constraint failed: code namespace") {
            Some(DbError::UniqueViolation { target }) => assert_eq!(target, "code namespace"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_foreign_key_and_other_messages() {
        let fk = classify_constraint("FOREIGN KEY constraint failed").unwrap();
        assert_eq!(fk.kind(), ErrorKind::Conflict);
        assert!(classify_constraint("no such table: widgets").is_none());
    }

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err: DbError = CoreError::InvalidOperation("cycle".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(DbError::not_found("Item", 3).is_not_found());
    }

    #[test]
    fn test_infrastructure_errors_are_internal() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }
}
