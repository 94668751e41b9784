//! Admin endpoints over the full router

mod common;

use axum::http::{header, StatusCode};
use common::{json_body, TestApp, ADMIN_EMAIL};
use routewise_db::memory;
use routewise_types::{CustomerStatus, PaymentId, Role};
use serde_json::json;

#[tokio::test]
async fn test_admin_routes_require_a_token() {
    let app = TestApp::new();

    let response = app.get("/api/admin/payments/failed", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let app = TestApp::new();

    for role in [Role::Customer, Role::Employee] {
        let token = app.token_for(role);
        let response = app.get("/api/admin/coverage/risk", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role:?}");
    }
}

#[tokio::test]
async fn test_forged_token_is_anonymous() {
    let app = TestApp::new();
    let token = app.token_for(Role::Admin);
    let forged = format!("{}x", token);

    let response = app.get("/api/admin/payments/failed", Some(&forged)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let app = TestApp::new();
    let token = app.token_for(Role::Admin);
    let request = axum::http::Request::get("/api/admin/payments/failed")
        .header(header::COOKIE, format!("routewise_session={token}"))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_failed_payments_listing() {
    let app = TestApp::new();
    let (_, payment) = app.seed();
    app.state
        .billing
        .record_failure(payment.payment_id(), Some("card declined"), Some("pi_1"))
        .await
        .unwrap();
    let token = app.token_for(Role::Admin);

    let response = app
        .get("/api/admin/payments/failed?limit=10", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    let listed = &body["payments"][0];
    assert_eq!(listed["id"], payment.id.to_string());
    assert_eq!(listed["retry_count"], 1);
    assert_eq!(listed["failure_reason"], "card declined");
    assert!(listed["next_retry_at"].is_string());
}

#[tokio::test]
async fn test_cancel_retries_cuts_customer_off() {
    let app = TestApp::new();
    let (customer, payment) = app.seed();
    app.state
        .billing
        .record_failure(payment.payment_id(), None, Some("pi_1"))
        .await
        .unwrap();
    let token = app.token_for(Role::Admin);
    let uri = format!("/api/admin/payments/{}/cancel-retries", payment.id);

    let response = app.post_json(&uri, Some(&token), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["retries_cancelled"], 1);
    assert_eq!(body["cascaded"], true);
    let stored = app.store.customer(customer.customer_id()).unwrap();
    assert_eq!(stored.status, CustomerStatus::DoNotService);

    // A second call changes nothing
    let again = json_body(app.post_json(&uri, Some(&token), json!({})).await).await;
    assert_eq!(again["retries_cancelled"], 0);
    assert_eq!(again["cascaded"], false);
}

#[tokio::test]
async fn test_cancel_retries_error_statuses() {
    let app = TestApp::new();
    let token = app.token_for(Role::Admin);

    let bad_id = app
        .post_json(
            "/api/admin/payments/not-a-uuid/cancel-retries",
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .post_json(
            &format!("/api/admin/payments/{}/cancel-retries", PaymentId::new()),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(unknown).await["error"]["code"], "PAYMENT_NOT_FOUND");

    let (_, payment) = app.seed();
    app.state
        .billing
        .record_success(payment.payment_id(), Some("pi_ok"))
        .await
        .unwrap();
    let paid = app
        .post_json(
            &format!("/api/admin/payments/{}/cancel-retries", payment.id),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(paid.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_manual_retry_run_without_processor_skips() {
    let app = TestApp::new();
    let token = app.token_for(Role::Admin);

    let response = app
        .post_json("/api/admin/payments/retries/run", Some(&token), json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["due"], 0);
    assert_eq!(body["succeeded"], 0);
}

#[tokio::test]
async fn test_coverage_risk_report() {
    let app = TestApp::new();
    app.store
        .insert_customer(memory::customer("Bob Jones", Some("10003")));
    app.store
        .insert_customer(memory::customer("Carol King", Some("10002")));
    app.store.insert_coverage_area(memory::coverage_area("10002"));
    let token = app.token_for(Role::Admin);

    let response = app.get("/api/admin/coverage/risk", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let at_risk = body["at_risk"].as_object().unwrap();
    assert_eq!(at_risk.len(), 1);
    assert_eq!(at_risk["10003"][0]["name"], "Bob Jones");
    assert_eq!(body["customers_checked"], 2);
    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn test_coverage_risk_notify() {
    let app = TestApp::new();
    app.store
        .insert_customer(memory::customer("Bob Jones", Some("10003")));
    let token = app.token_for(Role::Admin);

    let response = app
        .post_json(
            "/api/admin/coverage/risk/notify",
            Some(&token),
            json!({ "notify_customers": true }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["emails_sent"], 2);
    let sent = app.outbox.sent();
    assert!(sent.iter().any(|e| e.to == vec![ADMIN_EMAIL.to_string()]));
    assert!(sent
        .iter()
        .any(|e| e.to == vec!["bob.jones@example.com".to_string()]));
}

#[tokio::test]
async fn test_refresh_sets_session_cookie() {
    let app = TestApp::new();
    let token = app.token_for(Role::Employee);

    let response = app.post_json("/api/auth/refresh", Some(&token), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("routewise_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));

    let body = json_body(response).await;
    assert_eq!(body["role"], "EMPLOYEE");
    let claims = app.tokens().verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.role, Role::Employee);
}

#[tokio::test]
async fn test_refresh_requires_authentication() {
    let app = TestApp::new();

    let response = app.post_json("/api/auth/refresh", None, json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}
