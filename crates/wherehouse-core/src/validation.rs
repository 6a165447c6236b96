//! # Validation Module
//!
//! Input validation utilities for WhereHouse.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP collaborator                                            │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any storage access)                      │
//! │  ├── Required fields, length limits                                    │
//! │  └── Surfaces as InvalidArgument                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (codes, usernames, tag names)                  │
//! │  └── Foreign key constraints   → surfaces as Conflict                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Length limits are counted in characters, not bytes.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const NAME_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 1000;
pub const NOTES_MAX: usize = 2000;
/// Manufacturer, serial number and model number.
pub const DETAIL_MAX: usize = 200;
pub const TAG_NAME_MAX: usize = 100;
pub const COLOR_MAX: usize = 7;
pub const USERNAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    max_len(field, value, max)
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates an item or location name.
///
/// ## Example
/// ```rust
/// use wherehouse_core::validation::validate_name;
///
/// assert!(validate_name("Garage Shelf 2").is_ok());
/// assert!(validate_name("  ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    required("name", name, NAME_MAX)
}

/// Validates an optional free-text field. `None` always passes.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => max_len(field, v, max),
        None => Ok(()),
    }
}

pub fn validate_tag_name(name: &str) -> ValidationResult<()> {
    required("tag name", name, TAG_NAME_MAX)
}

/// Validates a tag colour. Only the length is enforced.
pub fn validate_color(color: &str) -> ValidationResult<()> {
    max_len("color", color, COLOR_MAX)
}

pub fn validate_username(username: &str) -> ValidationResult<()> {
    required("username", username, USERNAME_MAX)
}

/// Validates an email. May be empty (the bootstrap admin has none).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    max_len("email", email, EMAIL_MAX)
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item value in cents. Zero is allowed, negatives are not.
pub fn validate_value_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "value".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
