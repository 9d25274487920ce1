//! User accounts and bearer token repository.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use smart_todo_core::{
    defaults, Error, RegisterUserRequest, Result, UpdateProfileRequest, User, UserRepository,
};

use crate::password::{hash_password, verify_password};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, is_active, date_joined";

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a random alphanumeric string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a token using SHA256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Build a fresh token string.
    pub fn generate_token() -> String {
        format!(
            "{}{}",
            defaults::TOKEN_PREFIX,
            Self::generate_secret(defaults::TOKEN_RANDOM_LEN)
        )
    }
}

fn map_row_to_user(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_active: row.get("is_active"),
        date_joined: row.get("date_joined"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: RegisterUserRequest) -> Result<User> {
        let username = req.username.trim();
        if username.is_empty() || req.password.is_empty() {
            return Err(Error::InvalidInput(
                "Username and password are required".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let id = Uuid::now_v7();

        let row = sqlx::query(&format!(
            "INSERT INTO app_user (id, username, email, password_hash, date_joined)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (username) DO NOTHING
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(username)
        .bind(req.email.trim())
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => {
                info!(
                    subsystem = "database",
                    component = "users",
                    op = "create",
                    user_id = %id,
                    "User registered"
                );
                Ok(map_row_to_user(&row))
            }
            None => Err(Error::Conflict("Username already exists".to_string())),
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM app_user WHERE username = $1 AND is_active",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stored: String = row.get("password_hash");
        if verify_password(password, &stored) {
            Ok(Some(map_row_to_user(&row)))
        } else {
            debug!(
                subsystem = "database",
                component = "users",
                op = "authenticate",
                "Password mismatch"
            );
            Ok(None)
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        let row = sqlx::query(&format!(
            "UPDATE app_user SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name)
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(req.first_name)
        .bind(req.last_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(map_row_to_user)
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    async fn issue_token(&self, user_id: Uuid) -> Result<String> {
        let token = Self::generate_token();
        sqlx::query("INSERT INTO auth_token (token_hash, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(Self::hash_secret(&token))
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(token)
    }

    async fn validate_token(&self, token: &str) -> Result<Option<User>> {
        if !token.starts_with(defaults::TOKEN_PREFIX) {
            return Ok(None);
        }

        let row = sqlx::query(
            "UPDATE auth_token t SET last_used_at = NOW()
             FROM app_user u
             WHERE t.token_hash = $1 AND u.id = t.user_id AND u.is_active
             RETURNING u.id, u.username, u.email, u.first_name, u.last_name,
                       u.is_active, u.date_joined",
        )
        .bind(Self::hash_secret(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn revoke_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_token WHERE token_hash = $1")
            .bind(Self::hash_secret(token))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let token = PgUserRepository::generate_token();
        assert!(token.starts_with("st_tok_"));
        assert_eq!(
            token.len(),
            defaults::TOKEN_PREFIX.len() + defaults::TOKEN_RANDOM_LEN
        );
        assert!(token[defaults::TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = PgUserRepository::generate_token();
        let b = PgUserRepository::generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_secret_is_stable_hex() {
        let h1 = PgUserRepository::hash_secret("st_tok_abc");
        let h2 = PgUserRepository::hash_secret("st_tok_abc");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, PgUserRepository::hash_secret("st_tok_abd"));
    }
}
