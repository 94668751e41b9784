//! Routewise DB - Database abstractions
//!
//! SQLx-based database layer for Routewise services.
//!
//! # Example
//!
//! ```rust,ignore
//! use routewise_db::{create_pool, pg};
//!
//! let pool = create_pool("postgres://localhost/routewise", 10).await?;
//! let repos = pg::repositories(pool);
//!
//! let failed = repos.payments.find_by_status(PaymentStatus::Failed, 50).await?;
//! ```

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pool::{create_pool, DbPool};
pub use repo::*;
