//! Rendered notifications
//!
//! Every message the billing and coverage workflows send is built here so the
//! wording lives in one place.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{Email, Mailer, NotifyError};

/// Someone a notification is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// One zip code in a coverage-risk digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipRisk {
    pub zip: String,
    pub customers: usize,
}

/// Format an amount in minor units, e.g. `4999, "usd"` -> `49.99 USD`
pub fn format_amount(amount_cents: i64, currency: &str) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    format!(
        "{sign}{}.{:02} {}",
        abs / 100,
        abs % 100,
        currency.to_ascii_uppercase()
    )
}

/// Renders and sends workflow notifications
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    admin_email: String,
}

impl Notifier {
    /// Create a notifier sending as `from`, with staff alerts going to `admin_email`
    pub fn new(
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            from: from.into(),
            admin_email: admin_email.into(),
        }
    }

    /// Address staff alerts are sent to
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    async fn send(&self, to: &str, subject: String, text: String) -> Result<(), NotifyError> {
        self.mailer
            .send(Email {
                from: self.from.clone(),
                to: vec![to.to_string()],
                subject,
                text,
            })
            .await
    }

    /// Tell a customer their payment failed and when it will be retried
    pub async fn payment_failed(
        &self,
        customer: &Recipient,
        amount_cents: i64,
        currency: &str,
        next_attempt: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        let amount = format_amount(amount_cents, currency);
        let text = format!(
            "Hi {},\n\n\
             We couldn't process your payment of {amount}. \
             We'll try again on {}.\n\n\
             If your card details have changed, please update them before then \
             so your service isn't interrupted.\n",
            customer.name,
            next_attempt.format("%B %-d, %Y"),
        );

        self.send(&customer.email, format!("Payment of {amount} failed"), text)
            .await
    }

    /// Tell a customer their service has been suspended after the last retry
    pub async fn retries_exhausted_customer(
        &self,
        customer: &Recipient,
        amount_cents: i64,
        currency: &str,
    ) -> Result<(), NotifyError> {
        let amount = format_amount(amount_cents, currency);
        let text = format!(
            "Hi {},\n\n\
             We were unable to collect your payment of {amount} after several attempts, \
             so your subscription has been cancelled and scheduled visits are on hold.\n\n\
             Reply to this email or call us to settle the balance and restart service.\n",
            customer.name,
        );

        self.send(&customer.email, "Your service has been suspended".to_string(), text)
            .await
    }

    /// Alert staff that a customer was moved to do-not-service
    pub async fn retries_exhausted_admin(
        &self,
        customer: &Recipient,
        payment_id: &str,
        amount_cents: i64,
        currency: &str,
    ) -> Result<(), NotifyError> {
        let amount = format_amount(amount_cents, currency);
        let text = format!(
            "Payment {payment_id} for {} <{}> ({amount}) failed on its final retry.\n\n\
             The subscription was cancelled and the customer is now DO_NOT_SERVICE. \
             Remove them from upcoming routes.\n",
            customer.name, customer.email,
        );

        self.send(
            &self.admin_email,
            format!("Do not service: {}", customer.name),
            text,
        )
        .await
    }

    /// Send staff one digest listing every uncovered zip code
    pub async fn coverage_risk_digest(&self, zips: &[ZipRisk]) -> Result<(), NotifyError> {
        let total: usize = zips.iter().map(|z| z.customers).sum();
        let mut text = format!(
            "{} zip code(s) with {total} active customer(s) have no active coverage:\n\n",
            zips.len()
        );
        for zip in zips {
            text.push_str(&format!("  {}  {} customer(s)\n", zip.zip, zip.customers));
        }
        text.push_str("\nAssign an employee to these areas before the next service run.\n");

        self.send(
            &self.admin_email,
            format!("Coverage risk: {} zip code(s) uncovered", zips.len()),
            text,
        )
        .await
    }

    /// Warn a customer that their area is temporarily without a technician
    pub async fn coverage_risk_customer(
        &self,
        customer: &Recipient,
        zip: &str,
    ) -> Result<(), NotifyError> {
        let text = format!(
            "Hi {},\n\n\
             We're currently reassigning technicians in your area ({zip}). \
             Your next visit may be delayed by a few days; we'll confirm the new date \
             as soon as it is scheduled.\n",
            customer.name,
        );

        self.send(&customer.email, "A note about your next visit".to_string(), text)
            .await
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("from", &self.from)
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}
