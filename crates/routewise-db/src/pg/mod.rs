//! PostgreSQL repository implementations

mod coverage;
mod customer;
mod event;
mod payment;
mod retry;
mod subscription;

pub use coverage::PgCoverageAreaRepository;
pub use customer::PgCustomerRepository;
pub use event::PgProcessedEventRepository;
pub use payment::PgPaymentRepository;
pub use retry::PgPaymentRetryRepository;
pub use subscription::PgSubscriptionRepository;

use std::sync::Arc;

use crate::repo::Repositories;
use crate::DbPool;

/// Create all repositories from a database pool
pub fn repositories(pool: DbPool) -> Repositories {
    Repositories {
        customers: Arc::new(PgCustomerRepository::new(pool.clone())),
        subscriptions: Arc::new(PgSubscriptionRepository::new(pool.clone())),
        payments: Arc::new(PgPaymentRepository::new(pool.clone())),
        retries: Arc::new(PgPaymentRetryRepository::new(pool.clone())),
        coverage: Arc::new(PgCoverageAreaRepository::new(pool.clone())),
        events: Arc::new(PgProcessedEventRepository::new(pool)),
    }
}
