//! PostgreSQL coverage area repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::CoverageAreaRow;
use crate::repo::CoverageAreaRepository;

/// PostgreSQL coverage area repository
#[derive(Clone)]
pub struct PgCoverageAreaRepository {
    pool: PgPool,
}

impl PgCoverageAreaRepository {
    /// Create a new coverage area repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoverageAreaRepository for PgCoverageAreaRepository {
    async fn list_active(&self) -> DbResult<Vec<CoverageAreaRow>> {
        let areas = sqlx::query_as::<_, CoverageAreaRow>(
            "SELECT id, employee_id, zip_code, active FROM coverage_areas WHERE active",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(areas)
    }
}
