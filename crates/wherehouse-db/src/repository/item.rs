//! # Item Repository
//!
//! Items, their optional location and their tag set.
//!
//! ## Tag Set Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_tags(item, [3, 4, 4])          stored: {1, 3}                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  ├── DELETE item_tags (item, 1)                                         │
//! │  ├── INSERT item_tags (item, 4)      ← unknown tag id? FK fails         │
//! │  └── COMMIT                             → whole call rolls back,        │
//! │                                           {1, 3} stays, Conflict        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tag ids are not checked up front; the foreign key does it.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};
use wherehouse_core::association;
use wherehouse_core::{CodeIssuer, Item, ItemPatch, NewItem, Patch, Tag};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use crate::repository::location;

const ITEM_COLUMNS: &str = "id, name, description, notes, value_cents, manufacturer, \
     serial_number, model_number, purchase_date, qr_code, location_id, user_id, \
     created_at, updated_at";

/// Repository for items. Every operation is scoped to an owner.
///
/// ## Usage
/// ```rust,ignore
/// let drill = db.items().create(owner_id, NewItem {
///     name: "Cordless Drill".into(),
///     location_id: Some(shelf.id),
///     tag_ids: vec![power_tools.id],
///     ..Default::default()
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
    codes: CodeIssuer,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository {
            pool,
            codes: CodeIssuer::new(),
        }
    }

    /// Lists the owner's items with their tags, id ascending.
    pub async fn list(&self, owner_id: i64) -> DbResult<Vec<Item>> {
        let mut conn = self.pool.acquire().await?;
        list_for_owner(&mut conn, owner_id).await
    }

    pub async fn get(&self, id: i64, owner_id: i64) -> DbResult<Item> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    pub async fn get_by_code(&self, code: &str, owner_id: i64) -> DbResult<Item> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut conn, code, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", code))
    }

    /// Creates an item with a fresh code and its initial tags.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - the location does not exist for this owner
    /// * `Err(Conflict)` - a tag id does not exist
    pub async fn create(&self, owner_id: i64, request: NewItem) -> DbResult<Item> {
        request.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        if let Some(location_id) = request.location_id {
            ensure_location(&mut tx, location_id, owner_id).await?;
        }

        let code = self.codes.issue()?;
        let now = Utc::now();

        let mut item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items
                 (name, description, notes, value_cents, manufacturer, serial_number,
                  model_number, purchase_date, qr_code, location_id, user_id,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.notes)
        .bind(request.value.map(|v| v.cents()))
        .bind(&request.manufacturer)
        .bind(&request.serial_number)
        .bind(&request.model_number)
        .bind(request.purchase_date)
        .bind(&code)
        .bind(request.location_id)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        replace_tags(&mut tx, item.id, &request.tag_ids).await?;
        item.tags = tags_for_item(&mut tx, item.id).await?;

        tx.commit().await?;

        debug!(item_id = item.id, owner_id, tags = item.tags.len(), "Item created");
        Ok(item)
    }

    /// Applies a partial update, including an optional tag set replacement,
    /// in one transaction.
    pub async fn update(&self, id: i64, owner_id: i64, patch: ItemPatch) -> DbResult<Item> {
        patch.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let mut item = fetch(&mut tx, id, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))?;

        if let Patch::Set(location_id) = patch.location_id {
            ensure_location(&mut tx, location_id, owner_id).await?;
        }

        if let Some(name) = patch.name {
            item.name = name;
        }
        patch.description.apply(&mut item.description);
        patch.notes.apply(&mut item.notes);
        patch.value.map(|v| v.cents()).apply(&mut item.value_cents);
        patch.manufacturer.apply(&mut item.manufacturer);
        patch.serial_number.apply(&mut item.serial_number);
        patch.model_number.apply(&mut item.model_number);
        patch.purchase_date.apply(&mut item.purchase_date);
        patch.location_id.apply(&mut item.location_id);
        item.updated_at = Utc::now();

        sqlx::query(
            "UPDATE items
             SET name = ?, description = ?, notes = ?, value_cents = ?, manufacturer = ?,
                 serial_number = ?, model_number = ?, purchase_date = ?, location_id = ?,
                 updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.notes)
        .bind(item.value_cents)
        .bind(&item.manufacturer)
        .bind(&item.serial_number)
        .bind(&item.model_number)
        .bind(item.purchase_date)
        .bind(item.location_id)
        .bind(item.updated_at)
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        if let Some(tag_ids) = &patch.tag_ids {
            replace_tags(&mut tx, id, tag_ids).await?;
            item.tags = tags_for_item(&mut tx, id).await?;
        }

        tx.commit().await?;

        debug!(item_id = id, owner_id, "Item updated");
        Ok(item)
    }

    /// Replaces the item's whole tag set. Order is ignored and duplicates
    /// collapse.
    pub async fn set_tags(&self, id: i64, owner_id: i64, tag_ids: &[i64]) -> DbResult<Item> {
        let mut tx = begin_write(&self.pool).await?;

        let mut item = fetch(&mut tx, id, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))?;

        replace_tags(&mut tx, id, tag_ids).await?;

        item.updated_at = Utc::now();
        sqlx::query("UPDATE items SET updated_at = ? WHERE id = ?")
            .bind(item.updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        item.tags = tags_for_item(&mut tx, id).await?;

        tx.commit().await?;

        debug!(item_id = id, owner_id, tags = ?item.tag_ids(), "Item tags replaced");
        Ok(item)
    }

    /// Deletes an item; its tag associations go with it.
    pub async fn delete(&self, id: i64, owner_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        info!(item_id = id, owner_id, "Item deleted");
        Ok(())
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

#[derive(sqlx::FromRow)]
struct TaggedRow {
    item_id: i64,
    #[sqlx(flatten)]
    tag: Tag,
}

async fn ensure_location(conn: &mut SqliteConnection, location_id: i64, owner_id: i64) -> DbResult<()> {
    match location::fetch(conn, location_id, owner_id).await? {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Location", location_id)),
    }
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: i64,
    owner_id: i64,
) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    with_tags(conn, item).await
}

pub(crate) async fn fetch_by_code(
    conn: &mut SqliteConnection,
    code: &str,
    owner_id: i64,
) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE qr_code = ? AND user_id = ?"
    ))
    .bind(code)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    with_tags(conn, item).await
}

async fn with_tags(conn: &mut SqliteConnection, item: Option<Item>) -> DbResult<Option<Item>> {
    match item {
        Some(mut item) => {
            item.tags = tags_for_item(conn, item.id).await?;
            Ok(Some(item))
        }
        None => Ok(None),
    }
}

/// All of an owner's items with their tags, id ascending. Two queries.
pub(crate) async fn list_for_owner(conn: &mut SqliteConnection, owner_id: i64) -> DbResult<Vec<Item>> {
    let mut items = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ? ORDER BY id"
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;

    let rows = sqlx::query_as::<_, TaggedRow>(
        "SELECT it.item_id, t.id, t.name, t.color, t.created_at
         FROM item_tags it
         JOIN tags t ON t.id = it.tag_id
         JOIN items i ON i.id = it.item_id
         WHERE i.user_id = ?
         ORDER BY it.item_id, t.id",
    )
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_item: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in rows {
        by_item.entry(row.item_id).or_default().push(row.tag);
    }
    for item in &mut items {
        item.tags = by_item.remove(&item.id).unwrap_or_default();
    }

    Ok(items)
}

async fn tags_for_item(conn: &mut SqliteConnection, item_id: i64) -> DbResult<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        "SELECT t.id, t.name, t.color, t.created_at
         FROM tags t
         JOIN item_tags it ON it.tag_id = t.id
         WHERE it.item_id = ?
         ORDER BY t.id",
    )
    .bind(item_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tags)
}

/// Diffs the stored tag ids against `desired` and applies the difference.
/// Must run inside the caller's transaction.
async fn replace_tags(conn: &mut SqliteConnection, item_id: i64, desired: &[i64]) -> DbResult<()> {
    let current: Vec<i64> =
        sqlx::query_scalar("SELECT tag_id FROM item_tags WHERE item_id = ?")
            .bind(item_id)
            .fetch_all(&mut *conn)
            .await?;

    let diff = association::diff(&current, desired);
    if diff.is_empty() {
        return Ok(());
    }

    for tag_id in &diff.to_remove {
        sqlx::query("DELETE FROM item_tags WHERE item_id = ? AND tag_id = ?")
            .bind(item_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    let now = Utc::now();
    for tag_id in &diff.to_add {
        sqlx::query("INSERT INTO item_tags (item_id, tag_id, created_at) VALUES (?, ?, ?)")
            .bind(item_id)
            .bind(tag_id)
            .bind(now)
            .execute(&mut *conn)
            .await?;
    }

    debug!(
        item_id,
        removed = diff.to_remove.len(),
        added = diff.to_add.len(),
        "Applied tag diff"
    );
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
