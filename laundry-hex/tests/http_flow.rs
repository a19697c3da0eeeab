//! End-to-end HTTP tests: accounts, catalog, transactions, payments and the
//! gateway webhook, driven through the full middleware stack.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use gateway_sim::SimulatedGateway;
use http_body_util::BodyExt;
use laundry_hex::{JwtCredentials, PosService, RevocationList, inbound::HttpServer};
use laundry_repo::SqliteRepo;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Helper to create a router over a fresh in-memory database.
async fn create_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let credentials = JwtCredentials::new(
        "integration-secret",
        chrono::Duration::minutes(60),
        Arc::new(RevocationList::new()),
    );
    let service = PosService::new(
        repo,
        Arc::new(SimulatedGateway::default()),
        Arc::new(credentials),
    );
    HttpServer::new(service).router()
}

/// Helper to build a JSON request, with a bearer token when given.
fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to send a request and decode the JSON response.
async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Helper to register an account and sign in, returning the token.
async fn sign_in(app: &Router, username: &str) -> String {
    let creds = json!({ "username": username, "password": "rahasia" });

    let (status, _) = send(app, request(Method::POST, "/register", None, Some(creds.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, request(Method::POST, "/login", None, Some(creds))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_app().await;

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_app().await;

    let (status, body) = send(&app, request(Method::GET, "/transactions", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) = send(
        &app,
        request(Method::GET, "/transactions", Some("garbage"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wash_three_kilos_paid_through_webhook() {
    let app = create_app().await;
    let token = sign_in(&app, "owner").await;
    let auth = Some(token.as_str());

    let (status, wash) = send(
        &app,
        request(
            Method::POST,
            "/services",
            auth,
            Some(json!({ "serviceName": "Wash", "unitPrice": 8000, "unit": "kg" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, customer) = send(
        &app,
        request(
            Method::POST,
            "/customers",
            auth,
            Some(json!({ "fullName": "Siti Rahma", "phoneNumber": "08123456789" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A client-supplied unitPrice is ignored
    let (status, tx) = send(
        &app,
        request(
            Method::POST,
            "/transactions",
            auth,
            Some(json!({
                "customerId": customer["id"],
                "items": [{ "serviceId": wash["id"], "quantity": 3, "unitPrice": 1 }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["totalAmount"], 24000);
    assert_eq!(tx["items"][0]["unitPrice"], 8000);
    assert_eq!(tx["items"][0]["totalPrice"], 24000);

    let (status, created) = send(
        &app,
        request(
            Method::POST,
            "/create-payment",
            auth,
            Some(json!({ "transaction_id": tx["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["confirmation_data"]["fullName"], "Siti Rahma");
    assert_eq!(created["confirmation_data"]["total_amount"], 24000);
    let order_id = created["order_id"].as_str().unwrap().to_string();

    let detail_uri = format!("/payment-detail?order_id={}", order_id);
    let (status, payment) = send(&app, request(Method::GET, &detail_uri, auth, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["gross_amount"], 24000);
    assert_eq!(payment["status"], "Pending");

    // The gateway calls back without a token
    let (status, ack) = send(
        &app,
        request(
            Method::POST,
            "/webhook/midtrans",
            None,
            Some(json!({ "order_id": order_id, "transaction_status": "settlement" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "ok");

    let (_, payment) = send(&app, request(Method::GET, &detail_uri, auth, None)).await;
    assert_eq!(payment["status"], "settlement");

    let tx_uri = format!("/transaction-id?id={}", tx["id"].as_str().unwrap());
    let (status, tx) = send(&app, request(Method::GET, &tx_uri, auth, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["status"], "Paid");
}

#[tokio::test]
async fn test_webhook_without_status_is_bad_request() {
    let app = create_app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/webhook/midtrans",
            None,
            Some(json!({ "order_id": "INV-1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_unknown_service_is_bad_request() {
    let app = create_app().await;
    let token = sign_in(&app, "owner").await;
    let auth = Some(token.as_str());

    let (_, customer) = send(
        &app,
        request(
            Method::POST,
            "/customers",
            auth,
            Some(json!({ "fullName": "Siti Rahma" })),
        ),
    )
    .await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/transactions",
            auth,
            Some(json!({
                "customerId": customer["id"],
                "items": [{ "serviceId": uuid::Uuid::new_v4(), "quantity": 1 }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&app, request(Method::GET, "/transactions", auth, None)).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_undecodable_body_is_bad_request() {
    let app = create_app().await;
    let token = sign_in(&app, "owner").await;
    let auth = Some(token.as_str());

    let (status, body) = send(
        &app,
        request(Method::POST, "/create-payment", auth, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("transaction_id"));

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/transactions",
            auth,
            Some(json!({
                "customerId": "abc",
                "items": [{ "serviceId": "def", "quantity": 1 }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, body) = send(&app, request(Method::POST, "/login", None, Some(json!([])))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_unknown_path_is_not_found_without_token() {
    let app = create_app().await;

    let (status, _) = send(&app, request(Method::GET, "/no-such-route", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_paid_transaction_cannot_be_paid_again() {
    let app = create_app().await;
    let token = sign_in(&app, "owner").await;
    let auth = Some(token.as_str());

    let (_, wash) = send(
        &app,
        request(
            Method::POST,
            "/services",
            auth,
            Some(json!({ "serviceName": "Wash", "unitPrice": 8000, "unit": "kg" })),
        ),
    )
    .await;
    let (_, customer) = send(
        &app,
        request(Method::POST, "/customers", auth, Some(json!({ "fullName": "Budi" }))),
    )
    .await;
    let (_, tx) = send(
        &app,
        request(
            Method::POST,
            "/transactions",
            auth,
            Some(json!({
                "customerId": customer["id"],
                "items": [{ "serviceId": wash["id"], "quantity": 3 }],
            })),
        ),
    )
    .await;

    let mut order_ids = Vec::new();
    for _ in 0..2 {
        let (status, created) = send(
            &app,
            request(
                Method::POST,
                "/create-payment",
                auth,
                Some(json!({ "transaction_id": tx["id"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        order_ids.push(created["order_id"].as_str().unwrap().to_string());
    }

    // Second attempt settles, then the abandoned first one expires
    for (order_id, status) in [(&order_ids[1], "settlement"), (&order_ids[0], "expire")] {
        let (code, _) = send(
            &app,
            request(
                Method::POST,
                "/webhook/midtrans",
                None,
                Some(json!({ "order_id": order_id, "transaction_status": status })),
            ),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
    }

    let tx_uri = format!("/transaction-id?id={}", tx["id"].as_str().unwrap());
    let (_, fetched) = send(&app, request(Method::GET, &tx_uri, auth, None)).await;
    assert_eq!(fetched["status"], "Paid");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/create-payment",
            auth,
            Some(json!({ "transaction_id": tx["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
}

#[tokio::test]
async fn test_query_id_is_validated() {
    let app = create_app().await;
    let token = sign_in(&app, "owner").await;
    let auth = Some(token.as_str());

    let (status, _) = send(&app, request(Method::GET, "/transaction-id", auth, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(Method::GET, "/transaction-id?id=nope", auth, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/transaction-id?id={}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, request(Method::DELETE, &uri, auth, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_staff_cannot_change_catalog() {
    let app = create_app().await;
    let admin = sign_in(&app, "owner").await;
    let staff = sign_in(&app, "kasir").await;
    let service = json!({ "serviceName": "Iron", "unitPrice": 5000, "unit": "pcs" });

    let (status, body) = send(
        &app,
        request(Method::POST, "/services", Some(&staff), Some(service.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    // The inventory alias shares the catalog
    let (status, _) = send(
        &app,
        request(Method::POST, "/inventory", Some(&admin), Some(service)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = send(&app, request(Method::GET, "/services", Some(&staff), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = create_app().await;
    let token = sign_in(&app, "owner").await;

    let (status, _) = send(&app, request(Method::POST, "/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request(Method::GET, "/customers", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = create_app().await;
    sign_in(&app, "owner").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "owner", "password": "lain" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
}
