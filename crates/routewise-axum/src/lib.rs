//! Routewise Axum Integration
//!
//! Axum middleware and extractors shared by Routewise HTTP services.
//!
//! # Overview
//!
//! - **Layer**: [`AuthLayer`] reads the session token from the
//!   `Authorization: Bearer` header or the session cookie and stores an
//!   [`AuthContext`] in the request extensions
//! - **Extractors**: [`RequireAuth`], [`RequireAdmin`], [`RequireStaff`], [`MaybeAuth`]
//! - **Rate limiting**: [`SlidingWindowLimiter`] and the [`rate_limit`] middleware
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use routewise_axum::{AuthLayer, RequireAdmin};
//! use axum::{Router, routing::get};
//!
//! async fn admin_only(auth: RequireAdmin) -> String {
//!     format!("Hello, {}!", auth.subject)
//! }
//!
//! let app = Router::new()
//!     .route("/api/admin/ping", get(admin_only))
//!     .layer(AuthLayer::new(Arc::new(token_service)));
//! ```
//!
//! Invalid or expired tokens never fail the request in the layer; the
//! request continues anonymously and the extractors decide.

pub mod context;
pub mod error;
pub mod extractors;
pub mod layer;
pub mod rate_limit;

pub use context::{AuthContext, AuthSource};
pub use error::AuthRejection;
pub use extractors::{MaybeAuth, RequireAdmin, RequireAuth, RequireStaff};
pub use layer::{AuthLayer, AuthService};
pub use rate_limit::{client_key, rate_limit, RateLimited, SlidingWindowLimiter};
