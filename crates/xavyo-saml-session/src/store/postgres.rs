//! PostgreSQL-backed session attributes
//!
//! Lets several `IdP` nodes share browser session state. Schema lives in
//! `migrations/`.

use super::attributes::{SessionAttributeStore, StorageError};
use super::handle::SessionHandle;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

/// PostgreSQL-backed session attribute store for production
pub struct PostgresSessionAttributeStore {
    pool: PgPool,
}

impl PostgresSessionAttributeStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete every attribute of a session (returns count of deleted rows)
    pub async fn invalidate(&self, session: &SessionHandle) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r"DELETE FROM saml_idp_session_attributes WHERE session_id = $1",
        )
        .bind(*session.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError(format!("Failed to invalidate session: {e}")))?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::debug!(session = %session, deleted = deleted, "Invalidated SAML IdP session attributes");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl SessionAttributeStore for PostgresSessionAttributeStore {
    async fn get(&self, session: &SessionHandle, key: &str) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT attribute_value
            FROM saml_idp_session_attributes
            WHERE session_id = $1 AND attribute_key = $2
            ",
        )
        .bind(*session.as_uuid())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError(format!("Failed to read session attribute: {e}")))?;

        row.map(|r| {
            r.try_get::<sqlx::types::Json<Value>, _>("attribute_value")
                .map(|json| json.0)
                .map_err(|e| StorageError(format!("Failed to decode session attribute: {e}")))
        })
        .transpose()
    }

    async fn set(
        &self,
        session: &SessionHandle,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO saml_idp_session_attributes
                (session_id, attribute_key, attribute_value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (session_id, attribute_key) DO UPDATE
            SET attribute_value = EXCLUDED.attribute_value,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(*session.as_uuid())
        .bind(key)
        .bind(sqlx::types::Json(&value))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError(format!("Failed to write session attribute: {e}")))?;

        Ok(())
    }
}
