//! PostgreSQL payment repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routewise_types::{PaymentId, PaymentStatus};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::PaymentRow;
use crate::repo::PaymentRepository;

/// PostgreSQL payment repository
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn find_by_id(&self, id: PaymentId) -> DbResult<Option<PaymentRow>> {
        let payment = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, customer_id, subscription_id, amount_cents, currency, status,
                   retry_count, date, failure_reason, processor_payment_id, paid_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn find_by_status(&self, status: PaymentStatus, limit: i64) -> DbResult<Vec<PaymentRow>> {
        let payments = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, customer_id, subscription_id, amount_cents, currency, status,
                   retry_count, date, failure_reason, processor_payment_id, paid_at
            FROM payments
            WHERE status = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn mark_failed(
        &self,
        id: PaymentId,
        retry_count: i32,
        reason: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE payments
            SET status = 'FAILED', retry_count = $1,
                failure_reason = COALESCE($2, failure_reason)
            WHERE id = $3
            "#,
        )
        .bind(retry_count)
        .bind(reason)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_paid(&self, id: PaymentId, paid_at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE payments SET status = 'PAID', paid_at = $1 WHERE id = $2")
            .bind(paid_at)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_retry_count(&self, id: PaymentId, retry_count: i32) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE payments SET retry_count = $1 WHERE id = $2 AND retry_count <> $1",
        )
        .bind(retry_count)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
