//! Common test utilities for routewise-billing integration tests

pub mod mocks;

use std::sync::Arc;

use routewise_billing::{PaymentRetryService, RetryPolicy};
use routewise_db::memory::{self, MemoryStore};
use routewise_db::{CustomerRow, PaymentRow, Repositories, SubscriptionRow};
use routewise_notify::Notifier;

#[allow(unused_imports)]
pub use mocks::{FlakyPayments, Outbox, ScriptedProcessor};

pub const ADMIN_EMAIL: &str = "ops@example.com";

/// A service wired to in-memory repositories and a recording mailer
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<Outbox>,
    pub service: PaymentRetryService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        let store = MemoryStore::new();
        let repos = store.repositories();
        Self::build(store, repos, policy)
    }

    /// Harness whose payment writes go through a switchable failing wrapper
    #[allow(dead_code)]
    pub fn with_flaky_payments() -> (Self, Arc<FlakyPayments>) {
        let store = MemoryStore::new();
        let mut repos = store.repositories();
        let payments = Arc::new(FlakyPayments::new(repos.payments.clone()));
        repos.payments = payments.clone();
        (Self::build(store, repos, RetryPolicy::default()), payments)
    }

    fn build(store: Arc<MemoryStore>, repos: Repositories, policy: RetryPolicy) -> Self {
        let outbox = Arc::new(Outbox::default());
        let notifier = Notifier::new(outbox.clone(), "billing@example.com", ADMIN_EMAIL);
        let service = PaymentRetryService::new(repos, notifier, policy);
        Self {
            store,
            outbox,
            service,
        }
    }

    #[allow(dead_code)]
    pub fn with_processor(mut self, processor: Arc<ScriptedProcessor>) -> Self {
        self.service = self.service.with_processor(processor);
        self
    }

    /// Seed an active customer with an active subscription and a pending payment
    pub fn seed(&self) -> (CustomerRow, SubscriptionRow, PaymentRow) {
        let customer = memory::customer("Alice Smith", Some("10001"));
        let subscription = memory::subscription(customer.id);
        let payment = memory::payment(customer.id, Some(subscription.id), 4999);

        self.store.insert_customer(customer.clone());
        self.store.insert_subscription(subscription.clone());
        self.store.insert_payment(payment.clone());

        (customer, subscription, payment)
    }
}
