//! Shared handler utilities

use std::time::Instant;

use routewise_types::PaymentId;

use crate::error::ApiError;

/// Histogram of handler latency, labelled by operation and result
pub const OPERATION_DURATION: &str = "routewise_operation_duration_seconds";

/// Parse a payment id from a path segment.
pub fn parse_payment_id(raw: &str) -> Result<PaymentId, ApiError> {
    PaymentId::parse(raw).map_err(|_| ApiError::BadRequest(format!("invalid payment id: {raw}")))
}

/// Record HTTP operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        OPERATION_DURATION,
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payment_id() {
        let id = PaymentId::new();
        assert_eq!(parse_payment_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_payment_id("42"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
