//! Routewise Notify - Email dispatch
//!
//! A [`Mailer`] delivers a single [`Email`]; [`Notifier`] renders the
//! messages the billing and coverage workflows send.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use routewise_notify::{LogMailer, Notifier};
//!
//! let notifier = Notifier::new(Arc::new(LogMailer), "billing@example.com", "ops@example.com");
//! notifier.coverage_risk_digest(&zips).await?;
//! ```

pub mod error;
pub mod mailer;
pub mod notifier;
pub mod resend;

pub use error::NotifyError;
pub use mailer::{Email, LogMailer, Mailer};
pub use notifier::{format_amount, Notifier, Recipient, ZipRisk};
pub use resend::ResendMailer;
