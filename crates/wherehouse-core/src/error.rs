//! # Error Types
//!
//! Domain-specific error types for wherehouse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wherehouse-core errors (this file)                                    │
//! │  ├── CoreError        - Domain failures (not found, invariants, ...)   │
//! │  ├── ValidationError  - Malformed input                                │
//! │  └── ErrorKind        - Stable outward classification                  │
//! │                                                                         │
//! │  wherehouse-db errors (separate crate)                                 │
//! │  └── DbError          - Constraint / connection failures + CoreError   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ErrorKind → HTTP status │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Existence Hiding
//! An entity that exists but belongs to another user is reported exactly like
//! an entity that does not exist: `NotFound`, never a permission error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Stable classification of every failure the core can surface.
///
/// Each kind maps to exactly one outward status, so the HTTP collaborator
/// never has to inspect messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Entity absent or not owned by the requester.
    NotFound,
    /// A structural invariant would be violated (e.g. self-parenting).
    InvalidOperation,
    /// A uniqueness or referential-integrity constraint rejected the change.
    Conflict,
    /// Malformed input (empty search query, over-long name, ...).
    InvalidArgument,
    /// A stored credential record could not be decoded.
    CorruptCredential,
    /// Infrastructure failure (pool, I/O, randomness).
    Internal,
}

impl ErrorKind {
    /// The single HTTP status code this kind is reported with.
    pub const fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidOperation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::CorruptCredential => 500,
            ErrorKind::Internal => 500,
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity cannot be found for this requester.
    ///
    /// ## When This Occurs
    /// - ID or code doesn't exist
    /// - Entity belongs to a different user
    /// - Referenced parent location / item location is not the caller's
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The requested change would break a structural invariant.
    ///
    /// ## When This Occurs
    /// - A location is made its own parent
    /// - A location is moved underneath one of its own descendants
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A uniqueness rule detected before touching storage.
    ///
    /// ## When This Occurs
    /// - Creating a tag whose name is already taken
    /// - Registering a username that already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input (wraps ValidationError).
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// A stored credential record is not a valid salt‖key encoding.
    ///
    /// This is fatal and distinct from a password mismatch; callers must
    /// propagate it rather than treat it as "wrong password".
    #[error("Stored credential is corrupt: {0}")]
    CorruptCredential(String),

    /// The operating system's secure random source failed.
    #[error("Secure random source unavailable")]
    RandomUnavailable,
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and key (id or code).
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    /// Returns the outward classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CoreError::CorruptCredential(_) => ErrorKind::CorruptCredential,
            CoreError::RandomUnavailable => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything touches storage.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. unparseable monetary value).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
