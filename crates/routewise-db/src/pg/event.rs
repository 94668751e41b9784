//! PostgreSQL processed event ledger

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::repo::ProcessedEventRepository;

/// PostgreSQL processed event repository
#[derive(Clone)]
pub struct PgProcessedEventRepository {
    pool: PgPool,
}

impl PgProcessedEventRepository {
    /// Create a new processed event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedEventRepository for PgProcessedEventRepository {
    async fn claim(&self, key: &str, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_events (key, processed_at)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM processed_events WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
