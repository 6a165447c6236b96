//! # Schema Migrations
//!
//! The schema ships inside the binary and is applied when the store opens.
//!
//! ## Referential Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  users ◄──────── locations.user_id        ON DELETE CASCADE             │
//! │  users ◄──────── items.user_id            ON DELETE RESTRICT            │
//! │  locations ◄──── locations.parent_location_id  NO ACTION (children block)│
//! │  locations ◄──── items.location_id        ON DELETE SET NULL            │
//! │  items ◄──────── item_tags.item_id        ON DELETE CASCADE             │
//! │  tags ◄───────── item_tags.tag_id         ON DELETE CASCADE             │
//! │                                                                         │
//! │  qr_code: UNIQUE per table, triggers keep items and locations disjoint  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Files live in `migrations/sqlite/` as `NNN_description.sql`. Applied files
//! are checksummed by sqlx, so changes go into a new file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((total, applied as usize))
}
