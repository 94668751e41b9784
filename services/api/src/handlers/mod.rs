//! HTTP handlers

mod auth;
mod coverage;
mod health;
mod payments;
pub mod shared;
mod webhook;

pub use auth::*;
pub use coverage::*;
pub use health::*;
pub use payments::*;
pub use webhook::*;
