//! # User Repository
//!
//! Accounts, password checks and admin account management.
//!
//! ## Authentication
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  authenticate(username, password)                                      │
//! │       │                                                                 │
//! │       ├── no such user          → Ok(None)                              │
//! │       ├── stored record corrupt → Err(CorruptCredential)   (fatal)      │
//! │       ├── password mismatch     → Ok(None)                              │
//! │       └── match                 → last_login_at = now, Ok(Some(user))   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown user and wrong password look the same to the caller.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use wherehouse_core::{CoreError, CredentialHasher, NewUser, User, UserPatch};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_admin, created_at, last_login_at";

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    hasher: CredentialHasher,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository {
            pool,
            hasher: CredentialHasher::new(),
        }
    }

    /// Self-service registration. The new account is never an admin.
    pub async fn register(&self, request: NewUser) -> DbResult<User> {
        self.create(NewUser {
            is_admin: false,
            ..request
        })
        .await
    }

    /// Creates an account with the requested admin flag.
    ///
    /// ## Returns
    /// * `Err(Conflict)` - username already taken (case-sensitive)
    pub async fn create(&self, request: NewUser) -> DbResult<User> {
        request.validate()?;
        let password_hash = self.hasher.hash(&request.password)?;

        let mut tx = begin_write(&self.pool).await?;

        if fetch_by_username(&mut tx, &request.username).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "Username '{}' already exists",
                request.username
            ))
            .into());
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.username)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(request.is_admin)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user_id = user.id, username = %user.username, is_admin = user.is_admin, "User created");
        Ok(user)
    }

    /// Checks a username/password pair and records the login.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;

        let Some(mut user) = fetch_by_username(&mut conn, username).await? else {
            debug!(username = %username, "Login for unknown user");
            return Ok(None);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            debug!(user_id = user.id, "Login with wrong password");
            return Ok(None);
        }

        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(now)
            .bind(user.id)
            .execute(&mut *conn)
            .await?;
        user.last_login_at = Some(now);

        debug!(user_id = user.id, "Login succeeded");
        Ok(Some(user))
    }

    /// Lists all accounts, id ascending.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn get(&self, id: i64) -> DbResult<User> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_username(&mut conn, username).await
    }

    /// Applies an admin edit. A new password is re-hashed with a fresh salt.
    pub async fn update(&self, id: i64, patch: UserPatch) -> DbResult<User> {
        patch.validate()?;

        let mut tx = begin_write(&self.pool).await?;

        let mut user = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password) = patch.password {
            user.password_hash = self.hasher.hash(&password)?;
        }
        if let Some(is_admin) = patch.is_admin {
            user.is_admin = is_admin;
        }

        sqlx::query("UPDATE users SET email = ?, password_hash = ?, is_admin = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(user_id = id, "User updated");
        Ok(user)
    }

    /// Deletes an account together with its locations.
    ///
    /// ## Returns
    /// * `Err(Conflict)` - the user still owns items
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        if fetch(&mut tx, id).await?.is_none() {
            return Err(DbError::not_found("User", id));
        }

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id = id, "User deleted");
        Ok(())
    }
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}

async fn fetch_by_username(conn: &mut SqliteConnection, username: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use wherehouse_core::{ErrorKind, NewItem, NewLocation};

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: password.into(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let users = repo().await;
        let created = users.register(new_user("alice", "s3cret")).await.unwrap();
        assert!(!created.is_admin);
        assert!(created.last_login_at.is_none());
        assert_ne!(created.password_hash, "s3cret");

        let logged_in = users.authenticate("alice", "s3cret").await.unwrap().unwrap();
        assert_eq!(logged_in.id, created.id);
        assert!(logged_in.last_login_at.is_some());

        let stored = users.get(created.id).await.unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_register_ignores_admin_flag() {
        let users = repo().await;
        let mut req = new_user("mallory", "pw");
        req.is_admin = true;
        assert!(!users.register(req).await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let users = repo().await;
        users.register(new_user("bob", "right")).await.unwrap();

        assert!(users.authenticate("bob", "wrong").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "right").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let users = repo().await;
        users.register(new_user("carol", "a")).await.unwrap();
        let err = users.register(new_user("carol", "b")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // case-sensitive
        assert!(users.register(new_user("Carol", "b")).await.is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_not_a_mismatch() {
        let users = repo().await;
        let user = users.register(new_user("dave", "pw")).await.unwrap();

        sqlx::query("UPDATE users SET password_hash = 'not base64!' WHERE id = ?")
            .bind(user.id)
            .execute(&users.pool)
            .await
            .unwrap();

        let err = users.authenticate("dave", "pw").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptCredential);
    }

    #[tokio::test]
    async fn test_update_rehashes_password() {
        let users = repo().await;
        let user = users.register(new_user("erin", "old")).await.unwrap();

        let updated = users
            .update(
                user.id,
                UserPatch {
                    password: Some("new".into()),
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_admin);
        assert_eq!(updated.email, "erin@example.com");

        assert!(users.authenticate("erin", "old").await.unwrap().is_none());
        assert!(users.authenticate("erin", "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_user() {
        let users = repo().await;
        assert!(users.get(404).await.unwrap_err().is_not_found());
        assert!(users.delete(404).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_blocked_while_user_owns_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().register(new_user("carol", "pw")).await.unwrap();
        let item = db
            .items()
            .create(user.id, NewItem {
                name: "Lamp".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = db.users().delete(user.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(db.users().get(user.id).await.is_ok());

        db.items().delete(item.id, user.id).await.unwrap();
        db.users().delete(user.id).await.unwrap();
        assert!(db.users().get(user.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_owned_locations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().register(new_user("dave", "pw")).await.unwrap();
        let root = db
            .locations()
            .create(user.id, NewLocation {
                name: "Loft".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        db.locations()
            .create(user.id, NewLocation {
                name: "Trunk".into(),
                parent_location_id: Some(root.id),
                ..Default::default()
            })
            .await
            .unwrap();

        db.users().delete(user.id).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM locations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
