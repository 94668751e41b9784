//! PostgreSQL payment retry repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routewise_types::{PaymentId, PaymentRetryId, PaymentRetryStatus};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::PaymentRetryRow;
use crate::repo::{CreatePaymentRetry, PaymentRetryRepository};

/// PostgreSQL payment retry repository
#[derive(Clone)]
pub struct PgPaymentRetryRepository {
    pool: PgPool,
}

impl PgPaymentRetryRepository {
    /// Create a new payment retry repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRetryRepository for PgPaymentRetryRepository {
    async fn create(&self, retry: CreatePaymentRetry) -> DbResult<PaymentRetryRow> {
        let row = sqlx::query_as::<_, PaymentRetryRow>(
            r#"
            INSERT INTO payment_retries (id, payment_id, status, scheduled_for, attempt)
            VALUES ($1, $2, 'SCHEDULED', $3, $4)
            RETURNING id, payment_id, status, scheduled_for, attempt, created_at
            "#,
        )
        .bind(retry.id.0)
        .bind(retry.payment_id.0)
        .bind(retry.scheduled_for)
        .bind(retry.attempt)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_scheduled_by_payment(
        &self,
        payment_id: PaymentId,
    ) -> DbResult<Vec<PaymentRetryRow>> {
        let rows = sqlx::query_as::<_, PaymentRetryRow>(
            r#"
            SELECT id, payment_id, status, scheduled_for, attempt, created_at
            FROM payment_retries
            WHERE payment_id = $1 AND status = 'SCHEDULED'
            ORDER BY scheduled_for
            "#,
        )
        .bind(payment_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> DbResult<Vec<PaymentRetryRow>> {
        let rows = sqlx::query_as::<_, PaymentRetryRow>(
            r#"
            SELECT id, payment_id, status, scheduled_for, attempt, created_at
            FROM payment_retries
            WHERE status = 'SCHEDULED' AND scheduled_for <= $1
            ORDER BY scheduled_for
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn finish(&self, id: PaymentRetryId, status: PaymentRetryStatus) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE payment_retries SET status = $1 WHERE id = $2 AND status = 'SCHEDULED'",
        )
        .bind(status.as_str())
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn finish_all_for_payment(
        &self,
        payment_id: PaymentId,
        status: PaymentRetryStatus,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE payment_retries SET status = $1
            WHERE payment_id = $2 AND status = 'SCHEDULED'
            "#,
        )
        .bind(status.as_str())
        .bind(payment_id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn reschedule(&self, id: PaymentRetryId) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE payment_retries SET status = 'SCHEDULED' WHERE id = $1 AND status = 'COMPLETED'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
