//! Routewise Coverage - Zips with customers but nobody to serve them
//!
//! A zip code is at risk when at least one ACTIVE customer lives there and no
//! active coverage area claims it. Detection is two full scans and a set
//! difference; [`CoverageService`] wraps that with reporting and email.

pub mod error;
pub mod metrics;
pub mod risk;
pub mod service;

pub use error::CoverageError;
pub use risk::at_risk_zips;
pub use service::*;
