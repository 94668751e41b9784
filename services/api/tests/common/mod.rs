//! Common test utilities for routewise-api integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use routewise_api::{build_router, AppState, Config};
use routewise_auth::TokenService;
use routewise_db::memory::{self, MemoryStore};
use routewise_db::{CustomerRow, PaymentRow};
use routewise_notify::{Email, Mailer, NotifyError};
use routewise_types::Role;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const WEBHOOK_SECRET: &str = "whsec_api_test_secret";

/// Mailer that records every message it is asked to send
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<Email>>,
}

impl Outbox {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// The full router over in-memory repositories
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<Outbox>,
}

pub fn config(overrides: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://routewise@localhost/routewise_test"),
        ("AUTH_TOKEN_SECRET", "api-test-secret-that-is-at-least-32-bytes"),
        ("ADMIN_EMAIL", ADMIN_EMAIL),
        ("PAYMENT_WEBHOOK_SECRET", WEBHOOK_SECRET),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        env.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|name| env.get(name).cloned()).expect("test config")
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config(&[]))
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let outbox = Arc::new(Outbox::default());
        // Only /ready touches the pool
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let state = AppState::new(config, store.repositories(), pool, outbox.clone(), None);

        Self {
            router: build_router(state.clone(), None),
            state,
            store,
            outbox,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.state.tokens
    }

    pub fn token_for(&self, role: Role) -> String {
        self.tokens()
            .issue(format!("{role:?}-1").to_lowercase(), role, None)
            .unwrap()
            .token
    }

    /// Seed a customer with an active subscription and a pending payment
    pub fn seed(&self) -> (CustomerRow, PaymentRow) {
        let customer = memory::customer("Alice Smith", Some("10001"));
        let subscription = memory::subscription(customer.id);
        let payment = memory::payment(customer.id, Some(subscription.id), 4999);

        self.store.insert_customer(customer.clone());
        self.store.insert_subscription(subscription);
        self.store.insert_payment(payment.clone());

        (customer, payment)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(authed(Request::get(uri), token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(
            authed(Request::post(uri), token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

fn authed(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

