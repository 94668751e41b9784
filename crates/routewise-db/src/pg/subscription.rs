//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routewise_types::{SubscriptionId, SubscriptionStatus};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::SubscriptionRepository;

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, customer_id, status, cancelled_at, created_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn update_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $1,
                cancelled_at = CASE WHEN $1 = 'CANCELLED' THEN cancelled_at ELSE NULL END
            WHERE id = $2 AND status <> $1
            "#,
        )
        .bind(status.as_str())
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn cancel(&self, id: SubscriptionId, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET status = 'CANCELLED', cancelled_at = $1
            WHERE id = $2 AND status <> 'CANCELLED'
            "#,
        )
        .bind(at)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
