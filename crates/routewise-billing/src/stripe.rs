//! Stripe payment processor implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::error::BillingError;
use crate::processor::{ChargeOutcome, ChargeRequest, PaymentProcessor};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe payment processor
#[derive(Clone)]
pub struct StripeProcessor {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeProcessor {
    /// Create a new Stripe processor
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
            base_url: STRIPE_API_BASE.to_string(),
        }
    }

    /// Point the processor at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make authenticated request to Stripe
    async fn stripe_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
    ) -> Result<T, BillingError> {
        let url = format!("{}{endpoint}", self.base_url);

        let response = self
            .client
            .request(method, &url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Stripe API request failed");
                BillingError::Processor(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Stripe API error");
            return Err(BillingError::Processor(format!(
                "Stripe API error: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            BillingError::Processor(e.to_string())
        })
    }

    /// Default payment method saved on the customer, if any
    async fn default_payment_method(&self, customer_id: &str) -> Result<Option<String>, BillingError> {
        let customer: StripeCustomer = self
            .stripe_request(reqwest::Method::GET, &format!("/customers/{customer_id}"))
            .await?;

        Ok(customer
            .invoice_settings
            .and_then(|s| s.default_payment_method)
            .or(customer.default_source))
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    #[instrument(skip(self, request), fields(payment_id = %request.payment_id))]
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, BillingError> {
        let Some(payment_method) = self
            .default_payment_method(&request.processor_customer_id)
            .await?
        else {
            warn!("Customer has no default payment method");
            return Ok(ChargeOutcome::Declined {
                charge_id: request.idempotency_key.clone(),
                reason: "no payment method on file".to_string(),
            });
        };

        let amount = request.amount_cents.to_string();
        let currency = request.currency.to_ascii_lowercase();
        let payment_id = request.payment_id.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency.as_str()),
            ("customer", request.processor_customer_id.as_str()),
            ("payment_method", payment_method.as_str()),
            ("confirm", "true"),
            ("off_session", "true"),
            ("metadata[payment_id]", payment_id.as_str()),
        ];

        debug!(amount = %amount, currency = %currency, "Creating payment intent");

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .header("Idempotency-Key", request.idempotency_key.as_str())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Stripe API request failed");
                BillingError::Processor(e.to_string())
            })?;

        let status = response.status();

        // Card errors come back as 402 with the failed intent attached
        if status == StatusCode::PAYMENT_REQUIRED {
            let body: StripeErrorEnvelope = response.json().await.map_err(|e| {
                error!(error = %e, "Failed to parse Stripe card error");
                BillingError::Processor(e.to_string())
            })?;
            let charge_id = body
                .error
                .payment_intent
                .map(|pi| pi.id)
                .unwrap_or_else(|| request.idempotency_key.clone());
            let reason = body
                .error
                .message
                .or(body.error.decline_code)
                .or(body.error.code)
                .unwrap_or_else(|| "card declined".to_string());
            return Ok(ChargeOutcome::Declined { charge_id, reason });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Stripe API error");
            return Err(BillingError::Processor(format!(
                "Stripe API error: {status}"
            )));
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            BillingError::Processor(e.to_string())
        })?;

        Ok(intent.into_outcome())
    }
}

impl std::fmt::Debug for StripeProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProcessor")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// Stripe API response types

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    default_source: Option<String>,
    invoice_settings: Option<StripeInvoiceSettings>,
}

#[derive(Debug, Deserialize)]
struct StripeInvoiceSettings {
    default_payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    status: String,
    last_payment_error: Option<StripeApiError>,
}

impl StripePaymentIntent {
    fn into_outcome(self) -> ChargeOutcome {
        match self.status.as_str() {
            "succeeded" => ChargeOutcome::Succeeded { charge_id: self.id },
            "processing" | "requires_capture" => ChargeOutcome::Pending { charge_id: self.id },
            other => {
                let reason = self
                    .last_payment_error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| format!("payment intent {other}"));
                ChargeOutcome::Declined {
                    charge_id: self.id,
                    reason,
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    code: Option<String>,
    decline_code: Option<String>,
    message: Option<String>,
    payment_intent: Option<StripeIntentRef>,
}

#[derive(Debug, Deserialize)]
struct StripeIntentRef {
    id: String,
}
