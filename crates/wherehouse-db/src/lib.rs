//! # wherehouse-db: Database Layer for WhereHouse
//!
//! Durable, owner-scoped storage for the WhereHouse inventory system.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       WhereHouse Data Flow                              │
//! │                                                                         │
//! │  HTTP collaborator (update_location)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  wherehouse-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ LocationRepo  │    │ 001_schema   │  │   │
//! │  │   │               │    │ ItemRepo      │    │ 002_labels   │  │   │
//! │  │   │               │    │ TagRepo, ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ rules                          │   │
//! │  │                                ▼                                │   │
//! │  │                       wherehouse-core                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/wherehouse/wherehouse.db                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - TOML + environment configuration
//! - [`bootstrap`] - Idempotent admin account creation
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wherehouse_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("wherehouse.db")).await?;
//! let results = db.search().search(owner_id, "drill").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use bootstrap::bootstrap_admin;
pub use config::{AppConfig, ConfigOrigin};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::code::CodeRepository;
pub use repository::item::ItemRepository;
pub use repository::label::LabelTemplateRepository;
pub use repository::location::LocationRepository;
pub use repository::search::SearchRepository;
pub use repository::tag::TagRepository;
pub use repository::user::UserRepository;
