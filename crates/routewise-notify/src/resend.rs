//! Resend HTTP API mailer

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::{Email, Mailer, NotifyError};

const RESEND_API_BASE: &str = "https://api.resend.com";

/// Mailer backed by the Resend transactional email API
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendMailer {
    /// Create a new mailer
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: RESEND_API_BASE.to_string(),
        }
    }

    /// Point the mailer at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        email.validate()?;

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Email API request failed");
                NotifyError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Email API error");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<SendResponse>().await {
            Ok(sent) => debug!(id = %sent.id, "Email accepted"),
            Err(e) => debug!(error = %e, "Email accepted without a readable id"),
        }

        Ok(())
    }
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
