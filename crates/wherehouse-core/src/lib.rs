//! # wherehouse-core: Pure Domain Logic for WhereHouse
//!
//! This crate holds the identity, hierarchy and association rules of the
//! WhereHouse inventory system as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        WhereHouse Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                HTTP layer (external collaborator)               │   │
//! │  │     routing, DTO shaping, token issuance, QR image rendering    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ wherehouse-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌────────────────┐  │   │
//! │  │  │credential │ │   code    │ │ hierarchy │ │  association   │  │   │
//! │  │  │ PBKDF2    │ │ 128-bit   │ │ re-parent │ │  tag-set diff  │  │   │
//! │  │  │ salt‖key  │ │ hex codes │ │  checks   │ │                │  │   │
//! │  │  └───────────┘ └───────────┘ └───────────┘ └────────────────┘  │   │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌────────────────┐  │   │
//! │  │  │  search   │ │   types   │ │  patch    │ │  validation    │  │   │
//! │  │  └───────────┘ └───────────┘ └───────────┘ └────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               wherehouse-db (Database Layer)                    │   │
//! │  │        SQLite transactions, constraints, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (User, Location, Item, Tag, LabelTemplate)
//! - [`requests`] - Create requests and partial-update patches
//! - [`patch`] - Tri-state `Patch<T>` for partial updates
//! - [`money`] - Integer-cent monetary values
//! - [`credential`] - Salted PBKDF2 credential hashing
//! - [`code`] - Opaque code issuance (the identity namespace)
//! - [`hierarchy`] - Location tree re-parent rules
//! - [`association`] - Item↔Tag set replacement diff
//! - [`search`] - Query parsing and field matching
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod association;
pub mod code;
pub mod credential;
pub mod error;
pub mod hierarchy;
pub mod money;
pub mod patch;
pub mod requests;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use code::{CodeIssuer, CodeTarget, EntityKind};
pub use credential::CredentialHasher;
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use patch::Patch;
pub use requests::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Username of the account created by the first-run bootstrap.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Password given to the bootstrap admin account until it is changed.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";
