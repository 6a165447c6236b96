//! # Code Lookup
//!
//! Resolves a scanned code back to the item or location it names.
//!
//! ```text
//!   scan "9f86d081…"  ──►  resolve(code, owner)
//!                              ├── item with this code, owned?      → Item
//!                              ├── location with this code, owned?  → Location
//!                              └── otherwise                        → None
//! ```
//!
//! A code owned by someone else resolves to nothing, exactly like an unknown
//! code.

use sqlx::SqlitePool;
use tracing::debug;
use wherehouse_core::code::is_well_formed;
use wherehouse_core::{CodeTarget, EntityKind};

use crate::error::DbResult;
use crate::repository::{item, location};

#[derive(Debug, Clone)]
pub struct CodeRepository {
    pool: SqlitePool,
}

impl CodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CodeRepository { pool }
    }

    /// Looks a code up among one kind of entity. A string that cannot be an
    /// issued code resolves to nothing without touching the store.
    pub async fn lookup(
        &self,
        code: &str,
        kind: EntityKind,
        owner_id: i64,
    ) -> DbResult<Option<CodeTarget>> {
        if !is_well_formed(code) {
            return Ok(None);
        }
        let mut conn = self.pool.acquire().await?;
        let target = match kind {
            EntityKind::Item => item::fetch_by_code(&mut conn, code, owner_id)
                .await?
                .map(CodeTarget::Item),
            EntityKind::Location => location::fetch_by_code(&mut conn, code, owner_id)
                .await?
                .map(CodeTarget::Location),
        };
        Ok(target)
    }

    /// Looks a code up among both kinds.
    pub async fn resolve(&self, code: &str, owner_id: i64) -> DbResult<Option<CodeTarget>> {
        if !is_well_formed(code) {
            debug!(owner_id, "Malformed code");
            return Ok(None);
        }
        for kind in [EntityKind::Item, EntityKind::Location] {
            if let Some(target) = self.lookup(code, kind, owner_id).await? {
                debug!(kind = %kind, owner_id, "Code resolved");
                return Ok(Some(target));
            }
        }
        debug!(owner_id, "Code did not resolve");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use wherehouse_core::{CodeTarget, EntityKind, ErrorKind, NewItem, NewLocation, NewUser};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for name in ["owner", "other"] {
            ids.push(
                db.users()
                    .register(NewUser {
                        username: name.into(),
                        password: "pw".into(),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
                    .id,
            );
        }
        (db, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_resolve_both_kinds() {
        let (db, owner, other) = setup().await;
        let shelf = db
            .locations()
            .create(owner, NewLocation {
                name: "Shelf".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let drill = db
            .items()
            .create(owner, NewItem {
                name: "Drill".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let codes = db.codes();
        let found = codes.resolve(&shelf.qr_code, owner).await.unwrap().unwrap();
        assert_eq!(found.kind(), EntityKind::Location);
        assert_eq!(found.code(), shelf.qr_code);

        match codes.resolve(&drill.qr_code, owner).await.unwrap() {
            Some(CodeTarget::Item(item)) => assert_eq!(item.id, drill.id),
            other => panic!("expected item, got {other:?}"),
        }

        assert!(codes
            .lookup(&drill.qr_code, EntityKind::Location, owner)
            .await
            .unwrap()
            .is_none());
        assert!(codes.resolve(&drill.qr_code, other).await.unwrap().is_none());
        assert!(codes.resolve("not-a-code", owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_code_reuse_across_kinds_is_rejected() {
        let (db, owner, _) = setup().await;
        let shelf = db
            .locations()
            .create(owner, NewLocation {
                name: "Shelf".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let drill = db
            .items()
            .create(owner, NewItem {
                name: "Drill".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let now = Utc::now();

        let new_item_with_location_code = sqlx::query(
            "INSERT INTO items (name, qr_code, user_id, created_at, updated_at)
             VALUES ('Saw', ?, ?, ?, ?)",
        )
        .bind(&shelf.qr_code)
        .bind(owner)
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await;

        let new_location_with_item_code = sqlx::query(
            "INSERT INTO locations (name, qr_code, user_id, created_at, updated_at)
             VALUES ('Bin', ?, ?, ?, ?)",
        )
        .bind(&drill.qr_code)
        .bind(owner)
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await;

        let item_takes_location_code = sqlx::query("UPDATE items SET qr_code = ? WHERE id = ?")
            .bind(&shelf.qr_code)
            .bind(drill.id)
            .execute(db.pool())
            .await;

        let location_takes_item_code =
            sqlx::query("UPDATE locations SET qr_code = ? WHERE id = ?")
                .bind(&drill.qr_code)
                .bind(shelf.id)
                .execute(db.pool())
                .await;

        for result in [
            new_item_with_location_code,
            new_location_with_item_code,
            item_takes_location_code,
            location_takes_item_code,
        ] {
            let err = DbError::from(result.unwrap_err());
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert!(matches!(err, DbError::UniqueViolation { .. }));
        }

        // Nothing changed hands.
        let found = db.codes().resolve(&shelf.qr_code, owner).await.unwrap().unwrap();
        assert_eq!(found.kind(), EntityKind::Location);
        let found = db.codes().resolve(&drill.qr_code, owner).await.unwrap().unwrap();
        assert_eq!(found.kind(), EntityKind::Item);
        assert_eq!(db.items().list(owner).await.unwrap().len(), 1);
        assert_eq!(db.locations().list(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_code_skips_lookup() {
        let (db, owner, _) = setup().await;
        let codes = db.codes();
        for code in ["", "not-a-code", "0123456789ABCDEF0123456789ABCDEF"] {
            assert!(codes.resolve(code, owner).await.unwrap().is_none());
            assert!(codes.lookup(code, EntityKind::Item, owner).await.unwrap().is_none());
        }
    }
}
