//! Integration tests for the OTP login flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p hello-laundry-api)
//!
//! Run with: cargo test -p hello-laundry-integration-tests -- --include-ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use hello_laundry_integration_tests::{api_base_url, client, latest_otp, test_pool, unique_mobile};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_send_verify_creates_user_and_token() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();
    let mobile = unique_mobile();

    // Request a code
    let resp = client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to send OTP request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(true)));

    // Verify it
    let code = latest_otp(&pool, &mobile).await;
    let resp = client
        .post(format!("{base_url}/api/accounts/verify-otp"))
        .json(&json!({ "mobile": mobile, "otp": code }))
        .send()
        .await
        .expect("Failed to verify OTP");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(true)));
    let token = body["token"].as_str().expect("Missing token");
    assert!(!token.is_empty());
    assert_eq!(body["user"]["mobile"].as_str(), Some(mobile.as_str()));

    // A second login reuses the same token
    let resp = client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to resend OTP");
    assert_eq!(resp.status(), StatusCode::OK);

    let code = latest_otp(&pool, &mobile).await;
    let resp = client
        .post(format!("{base_url}/api/accounts/verify-otp"))
        .json(&json!({ "mobile": mobile, "otp": code }))
        .send()
        .await
        .expect("Failed to re-verify OTP");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["token"].as_str(), Some(token));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_code_is_rejected() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();
    let mobile = unique_mobile();

    let resp = client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to send OTP request");
    assert_eq!(resp.status(), StatusCode::OK);

    // Submit a code that cannot match the issued one
    let code = latest_otp(&pool, &mobile).await;
    let wrong = if code == "1000" { "1001" } else { "1000" };

    let resp = client
        .post(format!("{base_url}/api/accounts/verify-otp"))
        .json(&json!({ "mobile": mobile, "otp": wrong }))
        .send()
        .await
        .expect("Failed to verify OTP");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(false)));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_code_is_single_use() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();
    let mobile = unique_mobile();

    client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to send OTP request");

    let code = latest_otp(&pool, &mobile).await;
    let verify = || {
        client
            .post(format!("{base_url}/api/accounts/verify-otp"))
            .json(&json!({ "mobile": mobile, "otp": code }))
            .send()
    };

    let resp = verify().await.expect("Failed to verify OTP");
    assert_eq!(resp.status(), StatusCode::OK);

    // The consumed code no longer works
    let resp = verify().await.expect("Failed to re-verify OTP");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_resend_invalidates_older_code() {
    let client = client();
    let pool = test_pool().await;
    let base_url = api_base_url();
    let mobile = unique_mobile();

    client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to send first OTP");
    let first = latest_otp(&pool, &mobile).await;

    client
        .post(format!("{base_url}/api/accounts/send-otp"))
        .json(&json!({ "mobile": mobile }))
        .send()
        .await
        .expect("Failed to send second OTP");
    let second = latest_otp(&pool, &mobile).await;

    if first == second {
        // 1-in-9000 collision; nothing to assert
        return;
    }

    // Only the newest code verifies
    let resp = client
        .post(format!("{base_url}/api/accounts/verify-otp"))
        .json(&json!({ "mobile": mobile, "otp": first }))
        .send()
        .await
        .expect("Failed to verify old OTP");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base_url}/api/accounts/verify-otp"))
        .json(&json!({ "mobile": mobile, "otp": second }))
        .send()
        .await
        .expect("Failed to verify new OTP");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_set_name_requires_auth() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/accounts/customer/set-name"))
        .json(&json!({ "full_name": "Nadia" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_invalid_mobile_shapes() {
    // Pure validation checks, no server needed
    use hello_laundry_core::Mobile;

    assert!(Mobile::parse("+97455512345").is_ok());
    assert!(Mobile::parse("555-0199").is_err());
    assert!(Mobile::parse("").is_err());
}
