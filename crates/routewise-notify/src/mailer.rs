//! Mailer abstraction

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::NotifyError;

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

impl Email {
    /// Reject messages without a plausible recipient before they reach a provider
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.to.is_empty() {
            return Err(NotifyError::InvalidRecipient("no recipients".to_string()));
        }
        if let Some(bad) = self.to.iter().find(|addr| !addr.contains('@')) {
            return Err(NotifyError::InvalidRecipient(bad.clone()));
        }
        Ok(())
    }
}

/// Delivers email
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single message
    async fn send(&self, email: Email) -> Result<(), NotifyError>;
}

/// Mailer that writes messages to the log instead of sending them
///
/// Used when no email provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        email.validate()?;
        info!(
            to = ?email.to,
            subject = %email.subject,
            "Email not sent (no provider configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &[&str]) -> Email {
        Email {
            from: "billing@example.com".to_string(),
            to: to.iter().map(|s| s.to_string()).collect(),
            subject: "hello".to_string(),
            text: "body".to_string(),
        }
    }

    #[test]
    fn test_validate() {
        assert!(email(&["a@example.com"]).validate().is_ok());
        assert!(matches!(
            email(&[]).validate(),
            Err(NotifyError::InvalidRecipient(_))
        ));
        assert!(matches!(
            email(&["a@example.com", "nobody"]).validate(),
            Err(NotifyError::InvalidRecipient(addr)) if addr == "nobody"
        ));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_valid_email() {
        assert!(LogMailer.send(email(&["a@example.com"])).await.is_ok());
        assert!(LogMailer.send(email(&[])).await.is_err());
    }
}
