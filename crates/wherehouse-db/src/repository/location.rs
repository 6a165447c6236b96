//! # Location Repository
//!
//! The per-owner location tree.
//!
//! ## Tree Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Each row stores only its parent id. Children are found by query.      │
//! │                                                                         │
//! │   Garage (root)            parent_location_id = NULL                   │
//! │     ├── Shelf A            parent_location_id = Garage.id              │
//! │     │     └── Bin 3        parent_location_id = Shelf A.id             │
//! │     └── Workbench          parent_location_id = Garage.id              │
//! │                                                                         │
//! │  delete Shelf A  → Conflict (Bin 3 still points at it)                 │
//! │  delete Bin 3    → ok, items in Bin 3 keep existing with no location   │
//! │  move Garage under Bin 3 → InvalidOperation (Bin 3 descends from it)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use wherehouse_core::hierarchy::broken_rule;
use wherehouse_core::{
    CodeIssuer, ItemSummary, Location, LocationDetails, LocationPatch, NewLocation, Patch,
};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;

pub(crate) const LOCATION_COLUMNS: &str =
    "id, name, description, qr_code, parent_location_id, user_id, created_at, updated_at";

/// Bound on the ancestor walk; deeper trees are not expected.
const MAX_DEPTH: i64 = 10_000;

/// Repository for locations. Every operation is scoped to an owner.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
    codes: CodeIssuer,
}

impl LocationRepository {
    /// Creates a new LocationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository {
            pool,
            codes: CodeIssuer::new(),
        }
    }

    /// Lists the owner's locations, id ascending.
    pub async fn list(&self, owner_id: i64) -> DbResult<Vec<Location>> {
        let mut conn = self.pool.acquire().await?;
        list_for_owner(&mut conn, owner_id).await
    }

    pub async fn get(&self, id: i64, owner_id: i64) -> DbResult<Location> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))
    }

    pub async fn get_by_code(&self, code: &str, owner_id: i64) -> DbResult<Location> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut conn, code, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", code))
    }

    /// The location, its immediate children and the items stored directly in it.
    pub async fn get_with_children(&self, id: i64, owner_id: i64) -> DbResult<LocationDetails> {
        let mut conn = self.pool.acquire().await?;
        let location = fetch(&mut conn, id, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))?;
        details(&mut conn, location).await
    }

    /// Same as [`get_with_children`](Self::get_with_children), keyed by code.
    pub async fn get_with_children_by_code(
        &self,
        code: &str,
        owner_id: i64,
    ) -> DbResult<LocationDetails> {
        let mut conn = self.pool.acquire().await?;
        let location = fetch_by_code(&mut conn, code, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", code))?;
        details(&mut conn, location).await
    }

    /// Creates a location with a fresh code.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - the parent does not exist for this owner
    pub async fn create(&self, owner_id: i64, request: NewLocation) -> DbResult<Location> {
        request.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        if let Some(parent_id) = request.parent_location_id {
            if fetch(&mut tx, parent_id, owner_id).await?.is_none() {
                return Err(DbError::not_found("Parent location", parent_id));
            }
        }

        let code = self.codes.issue()?;
        let now = Utc::now();

        let location = sqlx::query_as::<_, Location>(&format!(
            "INSERT INTO locations
                 (name, description, qr_code, parent_location_id, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(&code)
        .bind(request.parent_location_id)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            location_id = location.id,
            owner_id,
            parent_id = ?location.parent_location_id,
            "Location created"
        );
        Ok(location)
    }

    /// Applies a partial update. Only fields present in the patch change.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - location or new parent not found for this owner
    /// * `Err(InvalidOperation)` - new parent is the location itself or one
    ///   of its descendants
    pub async fn update(&self, id: i64, owner_id: i64, patch: LocationPatch) -> DbResult<Location> {
        patch.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let mut location = fetch(&mut tx, id, owner_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))?;

        if let Patch::Set(parent_id) = patch.parent_location_id {
            let chain = ancestor_chain(&mut tx, parent_id, owner_id).await?;
            if let Some(rule) = broken_rule(id, parent_id, &chain) {
                warn!(location_id = id, parent_id, rule = rule.as_str(), "Re-parent rejected");
                return Err(rule.into_error(id, parent_id).into());
            }
        }

        if let Some(name) = patch.name {
            location.name = name;
        }
        patch.description.apply(&mut location.description);
        patch.parent_location_id.apply(&mut location.parent_location_id);
        location.updated_at = Utc::now();

        sqlx::query(
            "UPDATE locations
             SET name = ?, description = ?, parent_location_id = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&location.name)
        .bind(&location.description)
        .bind(location.parent_location_id)
        .bind(location.updated_at)
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(location_id = id, owner_id, "Location updated");
        Ok(location)
    }

    /// Deletes a location.
    ///
    /// Items stored in it are detached. A location that still has child
    /// locations is refused by the schema and reported as `Conflict`.
    pub async fn delete(&self, id: i64, owner_id: i64) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        if fetch(&mut tx, id, owner_id).await?.is_none() {
            return Err(DbError::not_found("Location", id));
        }

        sqlx::query("DELETE FROM locations WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(location_id = id, owner_id, "Location deleted");
        Ok(())
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: i64,
    owner_id: i64,
) -> DbResult<Option<Location>> {
    let location = sqlx::query_as::<_, Location>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(location)
}

pub(crate) async fn fetch_by_code(
    conn: &mut SqliteConnection,
    code: &str,
    owner_id: i64,
) -> DbResult<Option<Location>> {
    let location = sqlx::query_as::<_, Location>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE qr_code = ? AND user_id = ?"
    ))
    .bind(code)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(location)
}

pub(crate) async fn list_for_owner(
    conn: &mut SqliteConnection,
    owner_id: i64,
) -> DbResult<Vec<Location>> {
    let locations = sqlx::query_as::<_, Location>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE user_id = ? ORDER BY id"
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(locations)
}

/// `start` followed by its ancestors up to the root, within one owner's tree.
/// Empty when `start` is not one of the owner's locations.
async fn ancestor_chain(
    conn: &mut SqliteConnection,
    start: i64,
    owner_id: i64,
) -> DbResult<Vec<i64>> {
    let chain = sqlx::query_scalar::<_, i64>(
        "WITH RECURSIVE chain(id, parent_location_id, depth) AS (
             SELECT id, parent_location_id, 0
             FROM locations
             WHERE id = ?1 AND user_id = ?2
             UNION ALL
             SELECT l.id, l.parent_location_id, c.depth + 1
             FROM locations l
             JOIN chain c ON l.id = c.parent_location_id
             WHERE l.user_id = ?2 AND c.depth < ?3
         )
         SELECT id FROM chain ORDER BY depth",
    )
    .bind(start)
    .bind(owner_id)
    .bind(MAX_DEPTH)
    .fetch_all(&mut *conn)
    .await?;
    Ok(chain)
}

async fn details(conn: &mut SqliteConnection, location: Location) -> DbResult<LocationDetails> {
    let children = sqlx::query_as::<_, Location>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations
         WHERE parent_location_id = ? AND user_id = ?
         ORDER BY id"
    ))
    .bind(location.id)
    .bind(location.user_id)
    .fetch_all(&mut *conn)
    .await?;

    let items = sqlx::query_as::<_, ItemSummary>(
        "SELECT id, name, description, value_cents, qr_code, location_id
         FROM items
         WHERE location_id = ? AND user_id = ?
         ORDER BY id",
    )
    .bind(location.id)
    .bind(location.user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(LocationDetails {
        location,
        children,
        items,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use wherehouse_core::{ErrorKind, NewItem, NewUser};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for name in ["owner", "other"] {
            let user = db
                .users()
                .register(NewUser {
                    username: name.into(),
                    password: "pw".into(),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (db, ids[0], ids[1])
    }

    fn named(name: &str, parent: Option<i64>) -> NewLocation {
        NewLocation {
            name: name.into(),
            description: None,
            parent_location_id: parent,
        }
    }

    #[tokio::test]
    async fn test_create_root_and_child() {
        let (db, owner, _) = setup().await;
        let repo = db.locations();

        let garage = repo.create(owner, named("Garage", None)).await.unwrap();
        assert!(garage.is_root());
        assert_eq!(garage.qr_code.len(), 32);

        let shelf = repo.create(owner, named("Shelf", Some(garage.id))).await.unwrap();
        assert_eq!(shelf.parent_location_id, Some(garage.id));
        assert_ne!(shelf.qr_code, garage.qr_code);

        let details = repo.get_with_children(garage.id, owner).await.unwrap();
        assert_eq!(details.children, vec![shelf]);
        assert!(details.items.is_empty());
    }

    #[tokio::test]
    async fn test_parent_must_belong_to_owner() {
        let (db, owner, other) = setup().await;
        let repo = db.locations();
        let theirs = repo.create(other, named("Theirs", None)).await.unwrap();

        let err = repo.create(owner, named("Mine", Some(theirs.id))).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.create(owner, named("Mine", Some(9999))).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cross_owner_reads_are_not_found() {
        let (db, owner, other) = setup().await;
        let repo = db.locations();
        let loc = repo.create(owner, named("Attic", None)).await.unwrap();

        assert!(repo.get(loc.id, other).await.unwrap_err().is_not_found());
        assert!(repo.get_by_code(&loc.qr_code, other).await.unwrap_err().is_not_found());
        assert!(repo.delete(loc.id, other).await.unwrap_err().is_not_found());
        assert_eq!(repo.get_by_code(&loc.qr_code, owner).await.unwrap(), loc);
    }

    #[tokio::test]
    async fn test_self_parent_rejected() {
        let (db, owner, _) = setup().await;
        let repo = db.locations();
        let loc = repo.create(owner, named("Box", None)).await.unwrap();

        let err = repo
            .update(
                loc.id,
                owner,
                LocationPatch {
                    parent_location_id: Patch::Set(loc.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_reparent_under_descendant_rejected() {
        let (db, owner, _) = setup().await;
        let repo = db.locations();
        let a = repo.create(owner, named("A", None)).await.unwrap();
        let b = repo.create(owner, named("B", Some(a.id))).await.unwrap();
        let c = repo.create(owner, named("C", Some(b.id))).await.unwrap();

        for descendant in [b.id, c.id] {
            let err = repo
                .update(
                    a.id,
                    owner,
                    LocationPatch {
                        parent_location_id: Patch::Set(descendant),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        }
        assert!(repo.get(a.id, owner).await.unwrap().is_root());

        // Moving a leaf elsewhere in the tree is fine.
        let moved = repo
            .update(
                c.id,
                owner,
                LocationPatch {
                    parent_location_id: Patch::Set(a.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.parent_location_id, Some(a.id));
    }

    #[tokio::test]
    async fn test_reparent_to_foreign_location_is_not_found() {
        let (db, owner, other) = setup().await;
        let repo = db.locations();
        let mine = repo.create(owner, named("Mine", None)).await.unwrap();
        let theirs = repo.create(other, named("Theirs", None)).await.unwrap();

        let err = repo
            .update(
                mine.id,
                owner,
                LocationPatch {
                    parent_location_id: Patch::Set(theirs.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_partial_update_and_clear_parent() {
        let (db, owner, _) = setup().await;
        let repo = db.locations();
        let root = repo.create(owner, named("Basement", None)).await.unwrap();
        let child = repo
            .create(
                owner,
                NewLocation {
                    name: "Rack".into(),
                    description: Some("metal".into()),
                    parent_location_id: Some(root.id),
                },
            )
            .await
            .unwrap();

        let renamed = repo
            .update(
                child.id,
                owner,
                LocationPatch {
                    name: Some("Rack 1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Rack 1");
        assert_eq!(renamed.description.as_deref(), Some("metal"));
        assert_eq!(renamed.parent_location_id, Some(root.id));
        assert!(renamed.updated_at >= child.updated_at);

        let detached = repo
            .update(
                child.id,
                owner,
                LocationPatch {
                    description: Patch::Clear,
                    parent_location_id: Patch::Clear,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(detached.is_root());
        assert!(detached.description.is_none());

        let stored = repo.get(child.id, owner).await.unwrap();
        assert!(stored.is_root());
        assert_eq!(stored.name, "Rack 1");
        assert!(stored.description.is_none());
    }

    #[tokio::test]
    async fn test_delete_with_children_conflicts() {
        let (db, owner, _) = setup().await;
        let repo = db.locations();
        let root = repo.create(owner, named("Shed", None)).await.unwrap();
        let child = repo.create(owner, named("Hook", Some(root.id))).await.unwrap();

        let err = repo.delete(root.id, owner).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(repo.get(root.id, owner).await.is_ok());

        repo.delete(child.id, owner).await.unwrap();
        repo.delete(root.id, owner).await.unwrap();
        assert!(repo.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_detaches_items() {
        let (db, owner, _) = setup().await;
        let bin = db.locations().create(owner, named("Bin", None)).await.unwrap();
        let item = db
            .items()
            .create(
                owner,
                NewItem {
                    name: "Drill".into(),
                    location_id: Some(bin.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        db.locations().delete(bin.id, owner).await.unwrap();

        let item = db.items().get(item.id, owner).await.unwrap();
        assert_eq!(item.location_id, None);
        assert!(db.locations().get(bin.id, owner).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let (db, owner, other) = setup().await;
        let repo = db.locations();
        let a = repo.create(owner, named("A", None)).await.unwrap();
        repo.create(other, named("B", None)).await.unwrap();
        let c = repo.create(owner, named("C", None)).await.unwrap();

        let ids: Vec<i64> = repo.list(owner).await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }
}
