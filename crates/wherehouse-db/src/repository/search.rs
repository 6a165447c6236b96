//! # Search Repository
//!
//! Case-insensitive substring search over one owner's items and locations.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  search(owner, "drill")                                                │
//! │       │                                                                 │
//! │       ├── SearchQuery::parse      blank? → InvalidArgument             │
//! │       ├── load owner's items (with tag names) and locations            │
//! │       ├── keep rows where any searched field contains the needle       │
//! │       └── SearchResults { items, locations }   (id ascending)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Matching happens in Rust with Unicode lower-casing rather than SQL `LIKE`,
//! whose case folding is ASCII-only in SQLite.

use sqlx::SqlitePool;
use tracing::debug;
use wherehouse_core::search::SearchQuery;
use wherehouse_core::SearchResults;

use crate::error::DbResult;
use crate::repository::{item, location};

#[derive(Debug, Clone)]
pub struct SearchRepository {
    pool: SqlitePool,
}

impl SearchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SearchRepository { pool }
    }

    pub async fn search(&self, owner_id: i64, query: &str) -> DbResult<SearchResults> {
        let query = SearchQuery::parse(query)?;

        let mut conn = self.pool.acquire().await?;

        let items = item::list_for_owner(&mut conn, owner_id)
            .await?
            .into_iter()
            .filter(|i| query.matches_item(i))
            .collect::<Vec<_>>();

        let locations = location::list_for_owner(&mut conn, owner_id)
            .await?
            .into_iter()
            .filter(|l| query.matches_location(l))
            .collect::<Vec<_>>();

        debug!(
            owner_id,
            items = items.len(),
            locations = locations.len(),
            "Search complete"
        );

        Ok(SearchResults { items, locations })
    }
}
