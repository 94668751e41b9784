//! Test doubles for the processor and mailer

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routewise_billing::{BillingError, ChargeOutcome, ChargeRequest, PaymentProcessor};
use routewise_db::{DbError, DbResult, PaymentRepository, PaymentRow};
use routewise_notify::{Email, Mailer, NotifyError};
use routewise_types::{PaymentId, PaymentStatus};

/// Mailer that records every message it is asked to send
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<Email>>,
}

impl Outbox {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<Email> {
        self.sent()
            .into_iter()
            .filter(|e| e.to.iter().any(|to| to == address))
            .collect()
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// What the scripted processor should do with the next charge
#[allow(dead_code)]
pub enum Scripted {
    Succeed,
    Decline(&'static str),
    Pending,
    Unreachable,
}

/// Processor that answers charges from a script, in order
#[derive(Default)]
pub struct ScriptedProcessor {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChargeRequest>>,
}

#[allow(dead_code)]
impl ScriptedProcessor {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, BillingError> {
        self.requests.lock().unwrap().push(request.clone());
        let charge_id = format!("pi_{}", request.idempotency_key);
        let next = self.script.lock().unwrap().pop_front();

        match next.unwrap_or(Scripted::Unreachable) {
            Scripted::Succeed => Ok(ChargeOutcome::Succeeded { charge_id }),
            Scripted::Decline(reason) => Ok(ChargeOutcome::Declined {
                charge_id,
                reason: reason.to_string(),
            }),
            Scripted::Pending => Ok(ChargeOutcome::Pending { charge_id }),
            Scripted::Unreachable => Err(BillingError::Processor("connection refused".to_string())),
        }
    }
}

/// Payment repository whose status writes can be made to fail
pub struct FlakyPayments {
    inner: Arc<dyn PaymentRepository>,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl FlakyPayments {
    pub fn new(inner: Arc<dyn PaymentRepository>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> DbResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for FlakyPayments {
    async fn find_by_id(&self, id: PaymentId) -> DbResult<Option<PaymentRow>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_status(&self, status: PaymentStatus, limit: i64) -> DbResult<Vec<PaymentRow>> {
        self.inner.find_by_status(status, limit).await
    }

    async fn mark_failed(
        &self,
        id: PaymentId,
        retry_count: i32,
        reason: Option<&str>,
    ) -> DbResult<()> {
        self.check()?;
        self.inner.mark_failed(id, retry_count, reason).await
    }

    async fn mark_paid(&self, id: PaymentId, paid_at: DateTime<Utc>) -> DbResult<()> {
        self.check()?;
        self.inner.mark_paid(id, paid_at).await
    }

    async fn set_retry_count(&self, id: PaymentId, retry_count: i32) -> DbResult<bool> {
        self.inner.set_retry_count(id, retry_count).await
    }
}
