//! MySQL implementation of the TokenStore trait.
//!
//! Persists refresh token records with SQLx. The table keeps one row per
//! issued refresh token; revocation is a flag flip so audit fields survive
//! until the housekeeping sweep deletes the row.
//!
//! Reference schema:
//!
//! ```sql
//! CREATE TABLE refresh_tokens (
//!     token_id    CHAR(64)     NOT NULL PRIMARY KEY,
//!     session_key VARCHAR(128) NOT NULL,
//!     user_id     CHAR(36)     NOT NULL,
//!     issued_at   DATETIME(6)  NOT NULL,
//!     expires_at  DATETIME(6)  NOT NULL,
//!     not_before  DATETIME(6)  NOT NULL,
//!     revoked     BOOLEAN      NOT NULL DEFAULT FALSE,
//!     revoked_at  DATETIME(6)  NULL,
//!     replaced_by CHAR(64)     NULL,
//!     client_info VARCHAR(255) NULL,
//!     client_ip   VARCHAR(45)  NULL,
//!     INDEX idx_refresh_tokens_session (session_key, revoked)
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pv_core::domain::entities::token::RefreshTokenRecord;
use pv_core::errors::StoreError;
use pv_core::repositories::token::TokenStore;

/// MySQL implementation of TokenStore
pub struct MySqlTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenStore {
    /// Create a new MySQL token store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, StoreError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| backend(format!("Failed to get user_id: {}", e)))?;

        Ok(RefreshTokenRecord {
            token_id: row
                .try_get("token_id")
                .map_err(|e| backend(format!("Failed to get token_id: {}", e)))?,
            session_key: row
                .try_get("session_key")
                .map_err(|e| backend(format!("Failed to get session_key: {}", e)))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| backend(format!("Invalid user UUID: {}", e)))?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| backend(format!("Failed to get issued_at: {}", e)))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| backend(format!("Failed to get expires_at: {}", e)))?,
            not_before: row
                .try_get::<DateTime<Utc>, _>("not_before")
                .map_err(|e| backend(format!("Failed to get not_before: {}", e)))?,
            revoked: row
                .try_get("revoked")
                .map_err(|e| backend(format!("Failed to get revoked: {}", e)))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| backend(format!("Failed to get revoked_at: {}", e)))?,
            replaced_by: row
                .try_get("replaced_by")
                .map_err(|e| backend(format!("Failed to get replaced_by: {}", e)))?,
            client_info: row
                .try_get("client_info")
                .map_err(|e| backend(format!("Failed to get client_info: {}", e)))?,
            client_ip: row
                .try_get("client_ip")
                .map_err(|e| backend(format!("Failed to get client_ip: {}", e)))?,
        })
    }
}

fn backend(message: String) -> StoreError {
    StoreError::Backend { message }
}

const SELECT_COLUMNS: &str = "token_id, session_key, user_id, issued_at, expires_at, \
                              not_before, revoked, revoked_at, replaced_by, client_info, client_ip";

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, StoreError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                token_id, session_key, user_id, issued_at, expires_at,
                not_before, revoked, revoked_at, replaced_by, client_info, client_ip
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&record.token_id)
            .bind(&record.session_key)
            .bind(record.user_id.to_string())
            .bind(record.issued_at)
            .bind(record.expires_at)
            .bind(record.not_before)
            .bind(record.revoked)
            .bind(record.revoked_at)
            .bind(&record.replaced_by)
            .bind(&record.client_info)
            .bind(&record.client_ip)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false)
                {
                    StoreError::DuplicateTokenId
                } else {
                    backend(format!("Failed to insert refresh token: {}", e))
                }
            })?;

        Ok(record)
    }

    async fn get_by_token_id(
        &self,
        token_id: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM refresh_tokens WHERE token_id = ? LIMIT 1"
        );

        let result = sqlx::query(&query)
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(format!("Failed to find refresh token: {}", e)))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_active_by_session(
        &self,
        session_key: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM refresh_tokens \
             WHERE session_key = ? AND revoked = FALSE \
             ORDER BY issued_at DESC LIMIT 1"
        );

        let result = sqlx::query(&query)
            .bind(session_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(format!("Failed to find active token: {}", e)))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke_by_session(
        &self,
        session_key: &str,
        token_id: Option<&str>,
        replaced_by: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        // The `revoked = FALSE` guard makes the flip-count usable as a
        // compare-and-swap by racing rotations.
        let result = match token_id {
            Some(token_id) => {
                let query = r#"
                    UPDATE refresh_tokens
                    SET revoked = TRUE, revoked_at = ?, replaced_by = ?
                    WHERE session_key = ? AND token_id = ? AND revoked = FALSE
                "#;
                sqlx::query(query)
                    .bind(revoked_at)
                    .bind(replaced_by)
                    .bind(session_key)
                    .bind(token_id)
                    .execute(&self.pool)
                    .await
            }
            None => {
                let query = r#"
                    UPDATE refresh_tokens
                    SET revoked = TRUE, revoked_at = ?, replaced_by = ?
                    WHERE session_key = ? AND revoked = FALSE
                "#;
                sqlx::query(query)
                    .bind(revoked_at)
                    .bind(replaced_by)
                    .bind(session_key)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| backend(format!("Failed to revoke session tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn update_client_info(
        &self,
        token_id: &str,
        client_info: &str,
        client_ip: &str,
    ) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE refresh_tokens
            SET client_info = ?, client_ip = ?
            WHERE token_id = ?
        "#;

        let result = sqlx::query(query)
            .bind(client_info)
            .bind(client_ip)
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(format!("Failed to update client info: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = ?
            WHERE revoked = FALSE AND expires_at <= ?
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(format!("Failed to revoke expired tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_revoked(&self) -> Result<usize, StoreError> {
        let query = "DELETE FROM refresh_tokens WHERE revoked = TRUE";

        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(format!("Failed to delete revoked tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}
