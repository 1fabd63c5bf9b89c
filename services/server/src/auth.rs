use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::repo::users::{self, UserRow};

/// Identity bound to an operator connection after a successful `login`.
pub struct OperatorIdentity {
    pub user_id: i64,
    pub role: String,
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Verifies a username/password pair against `users.password_hash`. The
/// hashing algorithm itself is out of scope; this uses the same `sha2`
/// primitive the codebase already depends on for token hashing.
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Option<OperatorIdentity>, sqlx::Error> {
    let row: Option<UserRow> = users::find_by_username(pool, username).await?;
    Ok(row.and_then(|row| {
        if row.password_hash == hash_password(password) {
            Some(OperatorIdentity {
                user_id: row.id,
                role: row.role,
            })
        } else {
            None
        }
    }))
}

/// Role-derived admin check.
pub fn is_admin(role: &str) -> bool {
    role == "admin"
}
