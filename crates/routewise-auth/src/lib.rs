//! Routewise Auth - Session tokens
//!
//! Issues and verifies the signed session tokens that carry a caller's role.
//! Request plumbing (header/cookie extraction, extractors) lives in
//! `routewise-axum`.

pub mod config;
pub mod error;
pub mod token;

pub use config::*;
pub use error::*;
pub use token::*;
