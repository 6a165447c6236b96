//! # Repository Module
//!
//! Owner-scoped storage operations for WhereHouse.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP collaborator                                                     │
//! │       │                                                                 │
//! │       │  db.locations().update(id, owner, patch)                       │
//! │       ▼                                                                 │
//! │  LocationRepository                                                    │
//! │  ├── validate request            (wherehouse-core)                     │
//! │  ├── BEGIN IMMEDIATE             (takes the write lock up front)       │
//! │  ├── load + ownership check      → NotFound                            │
//! │  ├── rule checks                 (hierarchy / association)             │
//! │  ├── write rows                                                        │
//! │  └── COMMIT  (any error drops the transaction → ROLLBACK)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Helpers that run inside a transaction take `&mut SqliteConnection` so the
//! same code serves both a transaction and a plain pooled connection.
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts and authentication
//! - [`LocationRepository`](location::LocationRepository) - Location tree
//! - [`ItemRepository`](item::ItemRepository) - Items and their tag sets
//! - [`TagRepository`](tag::TagRepository) - Global tags
//! - [`LabelTemplateRepository`](label::LabelTemplateRepository) - Label sheet templates
//! - [`CodeRepository`](code::CodeRepository) - Code lookup across kinds
//! - [`SearchRepository`](search::SearchRepository) - Substring search

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbResult;

pub mod code;
pub mod item;
pub mod label;
pub mod location;
pub mod search;
pub mod tag;
pub mod user;

/// Opens a transaction that holds SQLite's write lock from its first
/// statement.
///
/// A deferred transaction that reads before it writes cannot upgrade its
/// lock while another writer is active and fails with `SQLITE_BUSY` at once.
/// Taking the lock in `BEGIN` makes concurrent writers queue on the busy
/// timeout instead.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
