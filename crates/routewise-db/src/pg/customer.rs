//! PostgreSQL customer repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routewise_types::{CustomerId, CustomerStatus};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::CustomerRow;
use crate::repo::CustomerRepository;

/// PostgreSQL customer repository
#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> DbResult<Option<CustomerRow>> {
        let customer = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, email, zip_code, status, service_credits,
                   credits_depleted_at, processor_customer_id, created_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list_by_status(&self, status: CustomerStatus) -> DbResult<Vec<CustomerRow>> {
        let customers = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, email, zip_code, status, service_credits,
                   credits_depleted_at, processor_customer_id, created_at
            FROM customers
            WHERE status = $1
            ORDER BY created_at
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn update_status(&self, id: CustomerId, status: CustomerStatus) -> DbResult<bool> {
        let result = sqlx::query("UPDATE customers SET status = $1 WHERE id = $2 AND status <> $1")
            .bind(status.as_str())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_service_credits(&self, id: CustomerId, credits: i32) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE customers
            SET service_credits = service_credits + $1, credits_depleted_at = NULL
            WHERE id = $2
            "#,
        )
        .bind(credits)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn deplete_service_credits(&self, id: CustomerId, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET service_credits = 0,
                credits_depleted_at = COALESCE(credits_depleted_at, $1)
            WHERE id = $2
              AND (service_credits <> 0 OR credits_depleted_at IS NULL)
            "#,
        )
        .bind(at)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
