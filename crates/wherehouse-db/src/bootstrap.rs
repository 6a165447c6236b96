//! # First-Run Bootstrap
//!
//! Makes sure an administrator account exists. Run once by the process entry
//! point after migrations; running it again changes nothing.

use tracing::info;
use wherehouse_core::{ErrorKind, NewUser};

use crate::error::DbResult;
use crate::pool::Database;

/// Creates the admin account unless a user with `username` already exists.
///
/// Returns `true` when an account was created. An existing account is left
/// untouched even if it is not an admin or has a different password.
pub async fn bootstrap_admin(db: &Database, username: &str, password: &str) -> DbResult<bool> {
    if db.users().get_by_username(username).await?.is_some() {
        info!(username = %username, "Admin account already present");
        return Ok(false);
    }

    let created = db
        .users()
        .create(NewUser {
            username: username.to_string(),
            email: String::new(),
            password: password.to_string(),
            is_admin: true,
        })
        .await;

    match created {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "Admin account created");
            Ok(true)
        }
        // Another process created it between the check and the insert. Both
        // the repository's own check and the index report a conflict.
        Err(e) if e.kind() == ErrorKind::Conflict => {
            info!(username = %username, "Admin account created concurrently");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
