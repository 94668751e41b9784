//! Coverage-risk detection and notification

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use routewise_db::Repositories;
use routewise_notify::{Notifier, Recipient, ZipRisk};
use routewise_types::{CustomerId, CustomerStatus, ZipCode};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::CoverageError;
use crate::metrics;
use crate::risk::at_risk_zips;

/// An active customer living in an uncovered zip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtRiskCustomer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

/// Result of one coverage scan
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    /// Uncovered zips and the active customers in each, sorted by zip
    pub at_risk: BTreeMap<ZipCode, Vec<AtRiskCustomer>>,
    /// Active customers considered
    pub customers_checked: usize,
    /// Distinct zips with active coverage
    pub covered_zips: usize,
    /// Active customers skipped for a missing or malformed zip
    pub customers_without_zip: usize,
    pub checked_at: DateTime<Utc>,
}

impl CoverageReport {
    /// Whether any zip is at risk
    pub fn has_risk(&self) -> bool {
        !self.at_risk.is_empty()
    }

    /// Customers across every at-risk zip
    pub fn customers_at_risk(&self) -> usize {
        self.at_risk.values().map(Vec::len).sum()
    }
}

/// A coverage scan and the emails it produced
#[derive(Debug, Clone, Serialize)]
pub struct CoverageNotification {
    pub report: CoverageReport,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

/// Finds zips whose customers have nobody assigned to serve them
#[derive(Clone)]
pub struct CoverageService {
    repos: Repositories,
    notifier: Notifier,
}

impl CoverageService {
    pub fn new(repos: Repositories, notifier: Notifier) -> Self {
        Self { repos, notifier }
    }

    /// Scan active customers against active coverage areas
    #[instrument(skip(self))]
    pub async fn detect(&self) -> Result<CoverageReport, CoverageError> {
        let customers = self
            .repos
            .customers
            .list_by_status(CustomerStatus::Active)
            .await?;
        let areas = self.repos.coverage.list_active().await?;

        let covered: BTreeSet<ZipCode> = areas
            .iter()
            .filter_map(|area| match ZipCode::parse(&area.zip_code) {
                Ok(zip) => Some(zip),
                Err(e) => {
                    warn!(area_id = %area.id, error = %e, "Skipping coverage area with malformed zip");
                    None
                }
            })
            .collect();

        let mut by_zip: BTreeMap<ZipCode, Vec<AtRiskCustomer>> = BTreeMap::new();
        let mut customers_without_zip = 0;

        for customer in &customers {
            let zip = match customer.zip_code.as_deref().map(ZipCode::parse) {
                Some(Ok(zip)) => zip,
                Some(Err(e)) => {
                    warn!(customer_id = %customer.id, error = %e, "Active customer has malformed zip");
                    customers_without_zip += 1;
                    continue;
                }
                None => {
                    debug!(customer_id = %customer.id, "Active customer has no zip");
                    customers_without_zip += 1;
                    continue;
                }
            };

            by_zip.entry(zip).or_default().push(AtRiskCustomer {
                id: customer.customer_id(),
                name: customer.name.clone(),
                email: customer.email.clone(),
            });
        }

        let at_risk = at_risk_zips(by_zip.keys(), &covered);
        by_zip.retain(|zip, _| at_risk.contains(zip));

        let report = CoverageReport {
            at_risk: by_zip,
            customers_checked: customers.len(),
            covered_zips: covered.len(),
            customers_without_zip,
            checked_at: Utc::now(),
        };

        metrics::record_scan(report.at_risk.len());
        info!(
            customers = report.customers_checked,
            covered_zips = report.covered_zips,
            at_risk_zips = report.at_risk.len(),
            customers_at_risk = report.customers_at_risk(),
            "Coverage scan finished"
        );

        Ok(report)
    }

    /// Scan and email staff, and optionally every affected customer
    ///
    /// Nothing is sent when no zip is at risk. A failed email is logged and
    /// counted; the remaining emails are still sent.
    #[instrument(skip(self))]
    pub async fn detect_and_notify(
        &self,
        notify_customers: bool,
    ) -> Result<CoverageNotification, CoverageError> {
        let report = self.detect().await?;
        let mut emails_sent = 0;
        let mut emails_failed = 0;

        if !report.has_risk() {
            return Ok(CoverageNotification {
                report,
                emails_sent,
                emails_failed,
            });
        }

        let digest: Vec<ZipRisk> = report
            .at_risk
            .iter()
            .map(|(zip, customers)| ZipRisk {
                zip: zip.to_string(),
                customers: customers.len(),
            })
            .collect();

        match self.notifier.coverage_risk_digest(&digest).await {
            Ok(()) => {
                metrics::record_email("admin", true);
                emails_sent += 1;
            }
            Err(e) => {
                warn!(error = %e, "Failed to send coverage digest");
                metrics::record_email("admin", false);
                emails_failed += 1;
            }
        }

        if notify_customers {
            for (zip, customers) in &report.at_risk {
                for customer in customers {
                    let recipient = Recipient {
                        name: customer.name.clone(),
                        email: customer.email.clone(),
                    };
                    match self
                        .notifier
                        .coverage_risk_customer(&recipient, zip.as_str())
                        .await
                    {
                        Ok(()) => {
                            metrics::record_email("customer", true);
                            emails_sent += 1;
                        }
                        Err(e) => {
                            warn!(customer_id = %customer.id, error = %e, "Failed to send coverage notice");
                            metrics::record_email("customer", false);
                            emails_failed += 1;
                        }
                    }
                }
            }
        }

        info!(emails_sent, emails_failed, "Coverage notifications sent");

        Ok(CoverageNotification {
            report,
            emails_sent,
            emails_failed,
        })
    }
}

impl std::fmt::Debug for CoverageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageService")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
