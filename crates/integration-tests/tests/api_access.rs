//! Router-level tests for health checks, auth guards and request validation.
//!
//! Every request here is answered before the handler reaches the database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use bosco_core::{OrderId, UserId};
use bosco_integration_tests::{
    ADMIN_EMAIL, TestApp, body_json, empty_request, expect_error, json_request,
    json_request_with_cookie,
};

#[tokio::test]
async fn test_health_is_ok_with_security_headers() {
    let app = TestApp::new();

    let response = app.send(empty_request("GET", "/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let app = TestApp::new();
    let mut request = empty_request("GET", "/health", None);
    request
        .headers_mut()
        .insert("x-request-id", "edge-4f1c".parse().unwrap());

    let response = app.send(request).await;

    assert_eq!(response.headers()["x-request-id"], "edge-4f1c");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::new();

    let response = app.send(empty_request("GET", "/health/ready", None)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_admin_endpoints_require_sign_in() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/v1/orders"),
        ("GET", "/api/v1/customers"),
        ("GET", "/api/v1/stats/orders"),
    ] {
        let response = app.send(empty_request(method, uri, None)).await;
        let message = expect_error(response, StatusCode::UNAUTHORIZED).await;
        assert_eq!(message, "Authentication required", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_admin_endpoints_reject_customers() {
    let app = TestApp::new();
    let cookie = app.sign_in("ada@example.com").await;

    let response = app
        .send(empty_request("GET", "/api/v1/customers", Some(&cookie)))
        .await;
    expect_error(response, StatusCode::FORBIDDEN).await;

    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/invoice",
            &cookie,
            &json!({ "orderId": OrderId::generate() }),
        ))
        .await;
    expect_error(response, StatusCode::FORBIDDEN).await;

    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/store",
            &cookie,
            &json!({ "name": "Kaftan", "description": "Plain", "price": "1000", "tag": "suit" }),
        ))
        .await;
    expect_error(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn test_status_patch_rejects_unknown_status() {
    let app = TestApp::new();
    let cookie = app.sign_in(ADMIN_EMAIL).await;
    let uri = format!("/api/v1/orders?orderId={}", OrderId::generate());

    let response = app
        .send(json_request_with_cookie(
            "PATCH",
            &uri,
            &cookie,
            &json!({ "status": "shipped" }),
        ))
        .await;

    let message = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Invalid status");
}

#[tokio::test]
async fn test_status_patch_requires_order_id() {
    let app = TestApp::new();
    let cookie = app.sign_in(ADMIN_EMAIL).await;

    let response = app
        .send(json_request_with_cookie(
            "PATCH",
            "/api/v1/orders",
            &cookie,
            &json!({ "status": "delivered" }),
        ))
        .await;

    expect_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_customer_cannot_list_another_customers_orders() {
    let app = TestApp::new();
    let cookie = app.sign_in("ada@example.com").await;
    let uri = format!("/api/v1/getorder?userId={}", UserId::generate());

    let response = app.send(empty_request("GET", &uri, Some(&cookie))).await;

    expect_error(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn test_place_order_rejects_empty_items() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/orders",
            &json!({
                "items": [],
                "shippingAddress": "12 Allen Avenue, Ikeja",
                "shippingPhone": "+2348030000000",
                "deliveryType": "waybill"
            }),
        ))
        .await;

    expect_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_place_order_rejects_zero_quantity() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/orders",
            &json!({
                "items": [{
                    "productId": bosco_core::ProductId::generate(),
                    "name": "Royal Agbada",
                    "price": "120000",
                    "quantity": 0
                }],
                "shippingAddress": "12 Allen Avenue, Ikeja",
                "shippingPhone": "+2348030000000",
                "deliveryType": "pickup"
            }),
        ))
        .await;

    expect_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_place_order_rejects_unstorable_prices() {
    let app = TestApp::new();

    for (price, quantity, message) in [
        ("79228162514264337593543950335", 2, "invalid item price: amount is too large"),
        ("20000000000", 1, "invalid item price: amount is too large"),
        ("6000000000", 2, "order total is too large"),
        ("1500.005", 1, "invalid item price: amount cannot have more than two decimal places"),
    ] {
        let response = app
            .send(json_request(
                "POST",
                "/api/v1/orders",
                &json!({
                    "items": [{
                        "productId": bosco_core::ProductId::generate(),
                        "name": "Royal Agbada",
                        "price": price,
                        "quantity": quantity
                    }],
                    "shippingAddress": "12 Allen Avenue, Ikeja",
                    "shippingPhone": "+2348030000000",
                    "deliveryType": "pickup"
                }),
            ))
            .await;

        assert_eq!(expect_error(response, StatusCode::BAD_REQUEST).await, message);
    }
}

#[tokio::test]
async fn test_users_rejects_unknown_action() {
    let app = TestApp::new();

    let response = app
        .send(json_request("POST", "/api/v1/users", &json!({ "action": "dance" })))
        .await;

    let message = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Invalid action");
}

#[tokio::test]
async fn test_signup_requires_password() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/users",
            &json!({ "action": "signup", "email": "ada@example.com", "username": "Ada" }),
        ))
        .await;

    let message = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "password is required");
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = TestApp::new();

    let response = app
        .send(json_request("POST", "/api/v1/users", &json!({ "action": "logout" })))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let app = TestApp::new();

    let response = app
        .send(empty_request("GET", "/api/v1/store/not-a-uuid", None))
        .await;
    expect_error(response, StatusCode::BAD_REQUEST).await;

    let response = app
        .send(empty_request("GET", "/api/v1/ref-verify?orderId=42", None))
        .await;
    expect_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_ref_verify_requires_order_id() {
    let app = TestApp::new();

    let response = app
        .send(empty_request("GET", "/api/v1/ref-verify", None))
        .await;

    expect_error(response, StatusCode::BAD_REQUEST).await;
}
