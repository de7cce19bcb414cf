//! User account service
//!
//! Handles registration, login and session token management.

use sqlx::sqlite::SqlitePool;
use thiserror::Error;

use super::{generate_token, PasswordHash};

/// User data
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailExists,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A concurrent registration can win the race past the existence check;
/// the UNIQUE constraint on `email` then reports it.
fn insert_error(err: sqlx::Error) -> AuthError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailExists,
        other => AuthError::Database(other),
    }
}

/// Account service for authentication operations
pub struct AccountService {
    pool: SqlitePool,
}

impl AccountService {
    /// Create a new account service
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new user
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password = PasswordHash::new(password);
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, salt, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(&password.hash)
        .bind(&password.salt)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            created_at: now,
        })
    }

    /// Login with email and password, issuing a fresh session token
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, password_hash, salt, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let (id, hash, salt, created_at) = row.ok_or(AuthError::InvalidCredentials)?;

        if !PasswordHash::from_parts(salt, hash).verify(password) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        sqlx::query("UPDATE users SET token = ? WHERE id = ?")
            .bind(&token)
            .bind(id)
            .execute(&self.pool)
            .await?;

        let user = User {
            id,
            email: email.to_string(),
            created_at,
        };

        Ok((user, token))
    }

    /// Resolve a session token to its user
    pub async fn validate_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        let row: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, email, created_at FROM users WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, email, created_at)| User {
            id,
            email,
            created_at,
        }))
    }

    /// Logout by clearing the token
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE users SET token = NULL WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
