//! Integration tests for the cart and order flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p hello-laundry-api)
//!
//! Run with: cargo test -p hello-laundry-integration-tests -- --include-ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;

use hello_laundry_integration_tests::{api_base_url, client, latest_otp, test_pool, unique_mobile};

/// Log a fresh user in and return their bearer token.
async fn login(client: &Client, pool: &PgPool) -> String {
    let base_url = api_base_url();
    let mobile = unique_mobile();

    client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to send OTP");

    let code = latest_otp(pool, &mobile).await;
    let resp = client
        .post(format!("{base_url}/api/accounts/verify-otp"))
        .json(&json!({ "mobile": mobile, "otp": code }))
        .send()
        .await
        .expect("Failed to verify OTP");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("Missing token").to_string()
}

/// Seed a laundry with one priced item; returns `(laundry_id, item_price_id)`.
async fn seed_catalog(pool: &PgPool, price: &str) -> (i32, i32) {
    let laundry_id: i32 =
        sqlx::query_scalar("INSERT INTO laundry (name) VALUES ('Test Laundry') RETURNING id")
            .fetch_one(pool)
            .await
            .expect("Failed to insert laundry");

    let item_id: i32 = sqlx::query_scalar("INSERT INTO item (name) VALUES ('Shirt') RETURNING id")
        .fetch_one(pool)
        .await
        .expect("Failed to insert item");

    let item_price_id: i32 = sqlx::query_scalar(
        "INSERT INTO item_price (laundry_id, item_id, price) VALUES ($1, $2, $3::numeric) \
         RETURNING id",
    )
    .bind(laundry_id)
    .bind(item_id)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("Failed to insert item price");

    (laundry_id, item_price_id)
}

/// Resolve the user id behind a bearer token.
async fn user_id_for_token(pool: &PgPool, token: &str) -> i32 {
    sqlx::query_scalar("SELECT user_id FROM auth_token WHERE key = $1")
        .bind(token)
        .fetch_one(pool)
        .await
        .expect("Token not found")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_repeated_adds_merge_into_one_line() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, item_price_id) = seed_catalog(&pool, "5.00").await;

    let add = |quantity: u32| {
        client
            .post(format!("{base_url}/api/cart/add"))
            .header("Authorization", format!("Token {token}"))
            .json(&json!({
                "laundry_id": laundry_id,
                "item_price_id": item_price_id,
                "quantity": quantity,
            }))
            .send()
    };

    let resp = add(2).await.expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = add(3).await.expect("Failed to add to cart again");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse cart response");
    let items = body["cart"]["items"].as_array().expect("Missing items");
    assert_eq!(items.len(), 1, "Adds should merge into a single line");
    assert_eq!(items[0]["quantity"].as_u64(), Some(5));
    assert_eq!(body["cart"]["total_price"].as_str(), Some("25.00"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_adds_share_one_cart_and_sum_quantities() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, item_price_id) = seed_catalog(&pool, "2.00").await;

    // Fire the adds in parallel; the partial unique index and the quantity
    // upsert must keep this down to one cart with one accumulated line.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let token = token.clone();
        let base_url = base_url.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(format!("{base_url}/api/cart/add"))
                .header("Authorization", format!("Token {token}"))
                .json(&json!({
                    "laundry_id": laundry_id,
                    "item_price_id": item_price_id,
                    "quantity": 3,
                }))
                .send()
                .await
                .expect("Failed to add to cart")
                .status()
        }));
    }
    for handle in handles {
        let status = handle.await.expect("Add task panicked");
        assert_eq!(status, StatusCode::OK);
    }

    let user_id = user_id_for_token(&pool, &token).await;

    let active_carts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM cart WHERE user_id = $1 AND laundry_id = $2 AND is_active",
    )
    .bind(user_id)
    .bind(laundry_id)
    .fetch_one(&pool)
    .await
    .expect("Failed to count carts");
    assert_eq!(active_carts, 1, "Parallel adds must share one active cart");

    let (lines, quantity): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(ci.quantity), 0)::bigint \
         FROM cart_item ci JOIN cart c ON c.id = ci.cart_id \
         WHERE c.user_id = $1 AND c.laundry_id = $2",
    )
    .bind(user_id)
    .bind(laundry_id)
    .fetch_one(&pool)
    .await
    .expect("Failed to read cart lines");
    assert_eq!(lines, 1, "Parallel adds must merge into one line");
    assert_eq!(quantity, 24, "No add may be lost or double-counted");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_place_creates_exactly_one_order() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, item_price_id) = seed_catalog(&pool, "5.00").await;

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "laundry_id": laundry_id,
            "item_price_id": item_price_id,
            "quantity": 2,
        }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let place = |client: Client, base_url: String, token: String| async move {
        client
            .post(format!("{base_url}/api/order/place"))
            .header("Authorization", format!("Token {token}"))
            .send()
            .await
            .expect("Failed to place order")
            .status()
    };

    let first = tokio::spawn(place(client.clone(), base_url.clone(), token.clone()));
    let second = tokio::spawn(place(client.clone(), base_url.clone(), token.clone()));
    let statuses = [
        first.await.expect("Place task panicked"),
        second.await.expect("Place task panicked"),
    ];

    // The row lock serializes the two placements; the loser finds the cart
    // already consumed.
    let wins = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(wins, 1, "Exactly one placement may win, got {statuses:?}");
    assert!(statuses.contains(&StatusCode::BAD_REQUEST));

    let user_id = user_id_for_token(&pool, &token).await;
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM laundry_order WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .expect("Failed to count orders");
    assert_eq!(orders, 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_out_of_range_quantity_is_rejected() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, item_price_id) = seed_catalog(&pool, "5.00").await;

    for quantity in [0, -3, 100_000] {
        let resp = client
            .post(format!("{base_url}/api/cart/add"))
            .header("Authorization", format!("Token {token}"))
            .json(&json!({
                "laundry_id": laundry_id,
                "item_price_id": item_price_id,
                "quantity": quantity,
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "quantity {quantity}");

        let body: Value = resp.json().await.expect("Failed to parse error body");
        assert_eq!(body["success"].as_bool(), Some(false));
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_item_price_is_404() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, _) = seed_catalog(&pool, "5.00").await;

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "laundry_id": laundry_id,
            "item_price_id": 999_999_999,
            "quantity": 1,
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_place_order_snapshots_prices_and_closes_cart() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, item_price_id) = seed_catalog(&pool, "4.50").await;

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "laundry_id": laundry_id,
            "item_price_id": item_price_id,
            "quantity": 2,
        }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/api/order/place"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse order response");
    assert_eq!(body["status"].as_str(), Some("pending"));
    assert_eq!(body["payment_status"].as_str(), Some("pending"));
    assert_eq!(body["total_price"].as_str(), Some("9.00"));
    let order_id = body["order_id"].as_i64().expect("Missing order_id");

    // A later catalog price change must not touch the snapshot
    sqlx::query("UPDATE item_price SET price = 99 WHERE id = $1")
        .bind(item_price_id)
        .execute(&pool)
        .await
        .expect("Failed to reprice item");

    let snapshot: String =
        sqlx::query_scalar("SELECT price::text FROM order_item WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(&pool)
            .await
            .expect("Failed to read order item");
    assert_eq!(snapshot, "4.50");

    // The cart is consumed; placing again has nothing to convert
    let resp = client
        .post(format!("{base_url}/api/order/place"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .expect("Failed to place order again");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_status_transitions_follow_the_table() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();

    let token = login(&client, &pool).await;
    let (laundry_id, item_price_id) = seed_catalog(&pool, "3.00").await;

    client
        .post(format!("{base_url}/api/cart/add"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "laundry_id": laundry_id,
            "item_price_id": item_price_id,
            "quantity": 1,
        }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base_url}/api/order/place"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .expect("Failed to place order");
    let body: Value = resp.json().await.expect("Failed to parse order response");
    let order_id = body["order_id"].as_i64().expect("Missing order_id");

    let patch_status = |status: &'static str| {
        client
            .patch(format!("{base_url}/api/order/{order_id}/status"))
            .json(&json!({ "status": status }))
            .send()
    };

    // pending -> completed skips steps and must be rejected
    let resp = patch_status("completed").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The legal path walks through each stage
    for status in ["accepted", "processing", "completed"] {
        let resp = patch_status(status).await.expect("Request failed");
        assert_eq!(resp.status(), StatusCode::OK, "transition to {status}");
    }

    // completed is terminal
    let resp = patch_status("cancelled").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Unknown status values never reach the transition table, and the
    // rejection body keeps the standard shape
    let resp = patch_status("exploded").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["success"].as_bool(), Some(false));
    assert!(body["message"].is_string());

    // Payment runs on its own table
    let patch_payment = |payment_status: &'static str| {
        client
            .patch(format!("{base_url}/api/order/{order_id}/payment-status"))
            .json(&json!({ "payment_status": payment_status }))
            .send()
    };

    let resp = patch_payment("refunded").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = patch_payment("paid").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = patch_payment("refunded").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_requires_auth() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({ "laundry_id": 1, "item_price_id": 1, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["success"].as_bool(), Some(false));
    assert_eq!(body["message"].as_str(), Some("Authentication required"));
}
