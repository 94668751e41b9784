//! Routewise Types - Shared domain types
//!
//! This crate contains domain types used across Routewise services:
//! - Identifiers for customers, subscriptions, payments and staff
//! - Payment, retry, subscription and customer status machines
//! - Roles carried in session tokens
//! - Zip code normalization for coverage checks

#[macro_use]
mod macros;

pub mod customer;
pub mod error;
pub mod ids;
pub mod payment;
pub mod role;
pub mod subscription;
pub mod zip;

pub use customer::*;
pub use error::*;
pub use ids::*;
pub use payment::*;
pub use role::*;
pub use subscription::*;
pub use zip::*;
