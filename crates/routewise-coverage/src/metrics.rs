//! Coverage metrics

use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};

/// Zip codes found at risk by the last scan
pub const AT_RISK_ZIPS: &str = "routewise_coverage_at_risk_zips";
/// Coverage-risk emails sent, by audience and result
pub const COVERAGE_EMAILS_TOTAL: &str = "routewise_coverage_emails_total";

pub(crate) fn record_scan(at_risk: usize) {
    gauge!(AT_RISK_ZIPS).set(at_risk as f64);
}

pub(crate) fn record_email(audience: &'static str, sent: bool) {
    let result = if sent { "sent" } else { "failed" };
    counter!(COVERAGE_EMAILS_TOTAL, "audience" => audience, "result" => result).increment(1);
}

/// Describe coverage metrics for registration with a recorder
pub fn describe_metrics() {
    describe_gauge!(
        AT_RISK_ZIPS,
        Unit::Count,
        "Zip codes with active customers and no active coverage"
    );
    describe_counter!(
        COVERAGE_EMAILS_TOTAL,
        Unit::Count,
        "Coverage-risk emails sent to staff and customers"
    );
}
