//! Cart and wishlist flows over the session cookie.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use bosco_core::ProductId;
use bosco_integration_tests::{
    TestApp, body_json, empty_request, expect_error, json_request, json_request_with_cookie,
    session_cookie,
};

fn agbada(product_id: ProductId, size: &str, quantity: u32) -> Value {
    json!({
        "productId": product_id,
        "name": "Royal Agbada",
        "price": "5000",
        "quantity": quantity,
        "size": size,
        "image": "https://images.bosco.com/agbada.jpg"
    })
}

/// Add the first item and return the new session cookie.
async fn start_cart(app: &TestApp, item: &Value) -> String {
    let response = app.send(json_request("POST", "/api/v1/cart/items", item)).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).unwrap()
}

#[tokio::test]
async fn test_empty_cart() {
    let app = TestApp::new();

    let response = app.send(empty_request("GET", "/api/v1/cart", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_cart_merges_same_line_and_splits_sizes() {
    let app = TestApp::new();
    let product_id = ProductId::generate();
    let cookie = start_cart(&app, &agbada(product_id, "M", 1)).await;

    app.send(json_request_with_cookie(
        "POST",
        "/api/v1/cart/items",
        &cookie,
        &agbada(product_id, "M", 2),
    ))
    .await;
    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/cart/items",
            &cookie,
            &agbada(product_id, "XL", 1),
        ))
        .await;

    let body = body_json(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(items[1]["size"], "XL");
    assert_eq!(body["count"], 4);
    assert_eq!(body["total"], "20000");
}

#[tokio::test]
async fn test_cart_update_to_zero_removes_line() {
    let app = TestApp::new();
    let product_id = ProductId::generate();
    let cookie = start_cart(&app, &agbada(product_id, "M", 2)).await;

    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/cart/items/update",
            &cookie,
            &json!({ "productId": product_id, "size": "M", "quantity": 0 }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_cart_update_unknown_line_is_not_found() {
    let app = TestApp::new();
    let product_id = ProductId::generate();
    let cookie = start_cart(&app, &agbada(product_id, "M", 1)).await;

    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/cart/items/update",
            &cookie,
            &json!({ "productId": product_id, "size": "L", "quantity": 3 }),
        ))
        .await;

    expect_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_cart_remove_and_clear() {
    let app = TestApp::new();
    let first = ProductId::generate();
    let second = ProductId::generate();
    let cookie = start_cart(&app, &agbada(first, "M", 1)).await;
    app.send(json_request_with_cookie(
        "POST",
        "/api/v1/cart/items",
        &cookie,
        &agbada(second, "M", 1),
    ))
    .await;

    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/cart/items/remove",
            &cookie,
            &json!({ "productId": first, "size": "M" }),
        ))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let response = app
        .send(empty_request("DELETE", "/api/v1/cart", Some(&cookie)))
        .await;
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/checkout",
            &json!({
                "shippingAddress": "12 Allen Avenue, Ikeja",
                "shippingPhone": "+2348030000000",
                "deliveryType": "waybill"
            }),
        ))
        .await;

    expect_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn test_wishlist_add_contains_remove() {
    let app = TestApp::new();
    let product_id = ProductId::generate();
    let item = json!({
        "productId": product_id,
        "name": "Coral Bead Set",
        "price": "35000",
        "tag": "beads"
    });

    let response = app.send(json_request("POST", "/api/v1/wishlist", &item)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response).unwrap();

    let response = app
        .send(json_request_with_cookie("POST", "/api/v1/wishlist", &cookie, &item))
        .await;
    expect_error(response, StatusCode::CONFLICT).await;

    let uri = format!("/api/v1/wishlist/{product_id}");
    let response = app.send(empty_request("GET", &uri, Some(&cookie))).await;
    assert_eq!(body_json(response).await["inWishlist"], true);

    let response = app.send(empty_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(body_json(response).await["items"], json!([]));

    let response = app.send(empty_request("DELETE", &uri, Some(&cookie))).await;
    expect_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_cart_rejects_overflowing_price() {
    let app = TestApp::new();
    let item = json!({
        "productId": ProductId::generate(),
        "name": "Royal Agbada",
        "price": "79228162514264337593543950335",
        "quantity": 2
    });

    let response = app.send(json_request("POST", "/api/v1/cart/items", &item)).await;

    assert_eq!(
        expect_error(response, StatusCode::BAD_REQUEST).await,
        "invalid price: amount is too large"
    );
}

#[tokio::test]
async fn test_cart_quantity_update_past_money_limit_is_rejected() {
    let app = TestApp::new();
    let product_id = ProductId::generate();
    let item = json!({
        "productId": product_id,
        "name": "Royal Agbada",
        "price": "9000000000",
        "quantity": 1,
        "size": "M"
    });
    let cookie = start_cart(&app, &item).await;

    let response = app
        .send(json_request_with_cookie(
            "POST",
            "/api/v1/cart/items/update",
            &cookie,
            &json!({ "productId": product_id, "size": "M", "quantity": 2 }),
        ))
        .await;
    assert_eq!(
        expect_error(response, StatusCode::BAD_REQUEST).await,
        "cart total is too large"
    );

    let response = app.send(empty_request("GET", "/api/v1/cart", Some(&cookie))).await;
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], "9000000000");
}
