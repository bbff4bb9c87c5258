//! # User Repository
//!
//! Operator logins. Passwords are stored as Argon2 PHC strings, never in
//! the clear; see [`crate::auth`].

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::{DbError, DbResult};
use vitrine_core::{Identity, Role};

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: Role,
    active: bool,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity {
            user_id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Verifies an email/password pair.
    ///
    /// Unknown email, wrong password and disabled account all return the
    /// same [`DbError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> DbResult<Identity> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, active FROM users WHERE email = ?1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(email = %email, "Login for unknown email");
            return Err(DbError::InvalidCredentials);
        };

        if !row.active || !verify_password(password, &row.password_hash) {
            warn!(user_id = %row.id, "Rejected login");
            return Err(DbError::InvalidCredentials);
        }

        Ok(row.into())
    }

    /// Creates an operator login.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> DbResult<Identity> {
        let id = Uuid::new_v4().to_string();
        let hash = hash_password(password)?;
        let now = Utc::now();
        let email = email.trim().to_lowercase();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(&email)
        .bind(&hash)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: email.clone(),
            },
            other => other,
        })?;

        debug!(user_id = %id, role = role.as_str(), "Created user");

        Ok(Identity {
            user_id: id,
            name: name.to_string(),
            email,
            role,
        })
    }

    /// Active operators, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, active FROM users WHERE active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Identity::from).collect())
    }

    pub async fn set_role(&self, user_id: &str, role: Role) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(role)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
