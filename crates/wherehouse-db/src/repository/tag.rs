//! # Tag Repository
//!
//! Tags are shared by every user. Names are unique, compared case-sensitively.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use wherehouse_core::{CoreError, NewTag, Tag, TagPatch};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;

const TAG_COLUMNS: &str = "id, name, color, created_at";

/// Repository for tags.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Creates a new TagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TagRepository { pool }
    }

    /// Lists all tags ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    pub async fn get(&self, id: i64) -> DbResult<Tag> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Tag", id))
    }

    /// Creates a tag.
    ///
    /// ## Returns
    /// * `Err(Conflict)` - a tag with exactly this name exists
    pub async fn create(&self, request: NewTag) -> DbResult<Tag> {
        request.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        ensure_name_free(&mut tx, &request.name).await?;

        let tag = sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (name, color, created_at) VALUES (?, ?, ?) RETURNING {TAG_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.color)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Renames and/or recolours a tag. Renaming to its current name is a no-op.
    pub async fn update(&self, id: i64, patch: TagPatch) -> DbResult<Tag> {
        patch.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let mut tag = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Tag", id))?;

        if let Some(name) = patch.name {
            if name != tag.name {
                ensure_name_free(&mut tx, &name).await?;
                tag.name = name;
            }
        }
        patch.color.apply(&mut tag.color);

        sqlx::query("UPDATE tags SET name = ?, color = ? WHERE id = ?")
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(tag_id = id, "Tag updated");
        Ok(tag)
    }

    /// Deletes a tag and removes it from every item.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tag", id));
        }

        info!(tag_id = id, "Tag deleted");
        Ok(())
    }
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(tag)
}

async fn ensure_name_free(conn: &mut SqliteConnection, name: &str) -> DbResult<()> {
    let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    match taken {
        Some(_) => Err(CoreError::Conflict(format!("Tag '{}' already exists", name)).into()),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
