//! # User Repository
//!
//! Credential store. Passwords are kept as argon2 PHC strings and only
//! ever compared through [`verify_password`].

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::gateway::with_reconnect;
use tracker_core::validation::{validate_password, validate_username};
use tracker_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash. A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - bad username or short password
    /// * `UniqueViolation` - username already taken
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<User> {
        let username = validate_username(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let (name, hash) = (username.as_str(), password_hash.as_str());
        let pool = &self.pool;

        let user: User = with_reconnect("create_user", move || async move {
            let user = sqlx::query_as(&format!(
                "INSERT INTO users (username, password_hash, role, created_at) \
                 VALUES (?1, ?2, ?3, ?4) \
                 RETURNING {}",
                USER_COLUMNS
            ))
            .bind(name)
            .bind(hash)
            .bind(role)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;
            Ok(user)
        })
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", name),
            other => other,
        })?;

        info!(username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Gets an account by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let username = username.trim();
        let pool = &self.pool;

        with_reconnect("get_user", move || async move {
            let user = sqlx::query_as(&format!(
                "SELECT {} FROM users WHERE username = ?1",
                USER_COLUMNS
            ))
            .bind(username)
            .fetch_optional(pool)
            .await?;
            Ok(user)
        })
        .await
    }

    /// Number of accounts.
    pub async fn count(&self) -> DbResult<i64> {
        let pool = &self.pool;
        with_reconnect("count_users", move || async move {
            let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;
            Ok(count)
        })
        .await
    }

    /// Returns the user when the password matches.
    ///
    /// An unknown username and a wrong password both give `Ok(None)`.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let user = self.get_by_username(username).await?;

        let verified = user.filter(|u| verify_password(password, &u.password_hash));
        debug!(username = username.trim(), verified = verified.is_some(), "Credentials checked");

        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::db;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("correct horse"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not a hash"));
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let db = db().await;
        let users = db.users();

        let user = users.create("bursar", "ledger-2024", Role::Admin).await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_ne!(user.password_hash, "ledger-2024");
        assert_eq!(users.count().await.unwrap(), 1);

        let found = users.verify_credentials("bursar", "ledger-2024").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
        assert!(users.verify_credentials("bursar", "nope-nope").await.unwrap().is_none());
        assert!(users.verify_credentials("nobody", "ledger-2024").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = db().await;
        let users = db.users();
        users.create("clerk", "password1", Role::Staff).await.unwrap();

        let err = users.create("clerk", "password2", Role::Admin).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "username");
                assert_eq!(value, "clerk");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let db = db().await;
        assert!(db.users().create("ab", "password1", Role::Staff).await.is_err());
        assert!(db.users().create("clerk", "short", Role::Staff).await.is_err());
        assert_eq!(db.users().count().await.unwrap(), 0);
    }
}
