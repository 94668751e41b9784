//! Routewise Billing - Failed payments and retries
//!
//! Tracks failed payments, schedules retries with a configurable back-off,
//! and when retries run out cancels the subscription and flags the customer
//! as do-not-service. Processor webhooks and the periodic retry job both feed
//! into [`PaymentRetryService`].

pub mod config;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod service;
pub mod stripe;
pub mod webhook;

pub use config::*;
pub use error::*;
pub use processor::*;
pub use service::*;
pub use stripe::StripeProcessor;
pub use webhook::*;
