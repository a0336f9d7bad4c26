use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use retail_pos::config::StoreSettings;
use retail_pos::{db, server};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let settings = StoreSettings {
        tax_rate: 0.1,
        points_per_currency_unit: 1.0,
    };
    server::build_router(db, settings, &[])
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register the bootstrap admin and return its token
async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "admin", "password": "admin-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");

    login(app, "admin", "admin-password").await
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}

async fn create_tiers(app: &Router, token: &str) {
    for tier in [
        json!({ "name": "Bronze", "min_points": 0, "max_points": 999 }),
        json!({ "name": "Silver", "min_points": 1000, "max_points": 4999 }),
        json!({ "name": "Gold", "min_points": 5000, "max_points": null }),
    ] {
        let (status, _) = send(app, "POST", "/api/loyalty/tiers", Some(token), Some(tier)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

async fn create_product(app: &Router, token: &str, sku: &str, price: f64, stock: i32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/products",
        Some(token),
        Some(json!({
            "sku": sku,
            "name": format!("Product {}", sku),
            "price": price,
            "stock_quantity": stock
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["product"]["id"].as_i64().unwrap()
}

async fn create_verified_customer(app: &Router, token: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/customers",
        Some(token),
        Some(json!({ "first_name": "Ada", "last_name": "Lovelace", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer"]["kyc_status"], "pending");
    let id = body["customer"]["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        "POST",
        &format!("/api/customers/{}/kyc", id),
        Some(token),
        Some(json!({ "document_type": "passport", "document_number": "X1234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["kyc_status"], "submitted");

    let (status, body) = send(
        app,
        "POST",
        &format!("/api/customers/{}/kyc/review", id),
        Some(token),
        Some(json!({ "approve": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["kyc_status"], "verified");

    id
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_resolve_tier_endpoint() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    create_tiers(&app, &token).await;

    for (points, expected) in [(1000, "Silver"), (10000, "Gold"), (-5, "No Tier")] {
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/loyalty/tiers/resolve?points={}", points),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], expected);
    }
}

#[tokio::test]
async fn test_checkout_awards_points_and_issues_invoice() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    create_tiers(&app, &token).await;

    let product_id = create_product(&app, &token, "cof-250", 500.0, 10).await;
    let customer_id = create_verified_customer(&app, &token, "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "customer_id": customer_id,
            "items": [
                { "product_id": product_id, "quantity": 1 },
                { "product_id": product_id, "quantity": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["subtotal"], 1000.0);
    assert_eq!(body["order"]["tax"], 100.0);
    assert_eq!(body["order"]["total"], 1100.0);
    assert_eq!(body["order"]["points_earned"], 1100);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert!(body["invoice"]["invoice_number"]
        .as_str()
        .unwrap()
        .starts_with("INV-"));
    assert_eq!(body["loyalty"]["tier"]["tier_name"], "Silver");
    let order_id = body["order"]["id"].as_i64().unwrap();
    let account_id = body["loyalty"]["account"]["id"].as_i64().unwrap();

    // Stock went down
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/products/{}", product_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["product"]["stock_quantity"], 8);
    assert_eq!(body["product"]["sku"], "COF-250");

    // Customer loyalty view
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/customers/{}/loyalty", customer_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["points_balance"], 1100);
    assert_eq!(body["account"]["tier_name"], "Silver");

    // Invoice document
    let (status, body) = send(&app, "GET", "/api/invoices", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let invoice_id = body["invoices"][0]["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/invoices/{}", invoice_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["customer"]["name"], "Ada Lovelace");
    assert_eq!(body["invoice"]["lines"][0]["quantity"], 2);

    // Cancel: restock, void, reverse points
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/orders/{}/cancel", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "cancelled");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/loyalty/accounts/{}", account_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["account"]["points_balance"], 0);
    assert_eq!(body["account"]["tier_name"], "Bronze");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/invoices/{}", invoice_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["invoice"]["status"], "void");

    // A second cancel is refused
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/orders/{}/cancel", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unverified_customer_cannot_order() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    let product_id = create_product(&app, &token, "MUG-001", 9.0, 5).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({ "first_name": "Bob", "last_name": "Pending" })),
    )
    .await;
    let customer_id = body["customer"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 1 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // Stock untouched
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/products/{}", product_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["product"]["stock_quantity"], 5);
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    let plenty = create_product(&app, &token, "TEA-100", 5.0, 10).await;
    let scarce = create_product(&app, &token, "TEA-200", 5.0, 1).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "items": [
                { "product_id": plenty, "quantity": 2 },
                { "product_id": scarce, "quantity": 3 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/products/{}", plenty),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["product"]["stock_quantity"], 10);

    let (_, body) = send(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_walk_in_order_and_low_stock() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    let product_id = create_product(&app, &token, "MUG-002", 12.5, 6).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({ "items": [{ "product_id": product_id, "quantity": 2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["loyalty"].is_null());
    assert_eq!(body["order"]["points_earned"], 0);

    let (status, body) = send(&app, "GET", "/api/products/low-stock", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["products"][0]["sku"], "MUG-002");
}

#[tokio::test]
async fn test_reward_redemption() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    create_tiers(&app, &token).await;
    let customer_id = create_verified_customer(&app, &token, "grace@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/loyalty/accounts",
        Some(&token),
        Some(json!({ "customer_id": customer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["tier_name"], "Bronze");
    let account_id = body["account"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/loyalty/accounts/{}/transactions", account_id),
        Some(&token),
        Some(json!({ "kind": "adjust", "points": 1200, "note": "Welcome bonus" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/loyalty/rewards",
        Some(&token),
        Some(json!({ "name": "Free coffee", "points_cost": 300 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reward_id = body["reward"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/loyalty/accounts/{}/redeem", account_id),
        Some(&token),
        Some(json!({ "reward_id": reward_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["points_balance"], 900);
    assert_eq!(body["tier"]["tier_name"], "Bronze");
    assert_eq!(body["tier"]["changed"], true);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/loyalty/accounts/{}/transactions", account_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["transactions"][0]["kind"], "redeem");

    // Spend the rest
    for _ in 0..3 {
        send(
            &app,
            "POST",
            &format!("/api/loyalty/accounts/{}/redeem", account_id),
            Some(&token),
            Some(json!({ "reward_id": reward_id })),
        )
        .await;
    }
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/loyalty/accounts/{}", account_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["account"]["points_balance"], 0);
}

#[tokio::test]
async fn test_kyc_rejection_requires_reason() {
    let app = setup_app().await;
    let token = admin_token(&app).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({ "first_name": "Eve", "last_name": "Doe" })),
    )
    .await;
    let id = body["customer"]["id"].as_i64().unwrap();

    // Review before submission is refused
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/customers/{}/kyc/review", id),
        Some(&token),
        Some(json!({ "approve": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(
        &app,
        "POST",
        &format!("/api/customers/{}/kyc", id),
        Some(&token),
        Some(json!({ "document_type": "id_card", "document_number": "AB123" })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/customers/{}/kyc/review", id),
        Some(&token),
        Some(json!({ "approve": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/customers/{}/kyc/review", id),
        Some(&token),
        Some(json!({ "approve": false, "reason": "Document expired" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["kyc_status"], "rejected");
    assert_eq!(body["customer"]["kyc_rejection_reason"], "Document expired");
}

#[tokio::test]
async fn test_messaging_between_staff() {
    let app = setup_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(&admin),
        Some(json!({ "username": "cashier", "password": "cashier-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "staff");
    let cashier_id = body["user"]["id"].as_i64().unwrap();
    let cashier = login(&app, "cashier", "cashier-password").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/messages",
        Some(&admin),
        Some(json!({ "recipient_id": cashier_id, "subject": "Stock", "body": "Please restock mugs" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "GET", "/api/messages", Some(&cashier), None).await;
    assert_eq!(body["unread"], 1);
    let message_id = body["messages"][0]["id"].as_i64().unwrap();

    // Only the recipient can mark it read
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/messages/{}/read", message_id),
        Some(&admin),
        None,
    )
    .await;
    assert_ne!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/messages/{}/read", message_id),
        Some(&cashier),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/messages", Some(&cashier), None).await;
    assert_eq!(body["unread"], 0);

    let (_, body) = send(&app, "GET", "/api/messages/sent", Some(&admin), None).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    create_tiers(&app, &token).await;
    let product_id = create_product(&app, &token, "COF-500", 50.0, 4).await;
    let customer_id = create_verified_customer(&app, &token, "linus@example.com").await;

    send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 2 }]
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/dashboard/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["summary"];
    assert_eq!(summary["completed_orders"], 1);
    assert_eq!(summary["revenue"], 110.0);
    assert_eq!(summary["active_customers"], 1);
    assert_eq!(summary["low_stock_products"], 1);
    assert_eq!(summary["loyalty_accounts"], 1);
    assert_eq!(summary["tier_distribution"]["Bronze"], 1);
}

#[tokio::test]
async fn test_openapi_document_lists_core_routes() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let paths = body["paths"].as_object().expect("paths object");
    for path in [
        "/api/loyalty/tiers/resolve",
        "/api/loyalty/accounts",
        "/api/loyalty/accounts/{id}/transactions",
        "/api/loyalty/accounts/{id}/redeem",
        "/api/orders",
        "/api/orders/{id}/cancel",
        "/api/invoices/{id}",
    ] {
        assert!(paths.contains_key(path), "{} missing from OpenAPI", path);
    }
}

#[tokio::test]
async fn test_points_out_of_range_is_a_client_error() {
    let app = setup_app().await;
    let token = admin_token(&app).await;
    let customer_id = create_verified_customer(&app, &token, "max@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/loyalty/accounts",
        Some(&token),
        Some(json!({ "customer_id": customer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = body["account"]["id"].as_i64().unwrap();
    let uri = format!("/api/loyalty/accounts/{}/transactions", account_id);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "kind": "adjust", "points": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "kind": "earn", "points": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("out of range"));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/loyalty/accounts/{}", account_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["points_balance"], i64::MAX);
}
