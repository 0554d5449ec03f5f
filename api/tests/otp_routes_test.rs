//! End-to-end tests for the passcode endpoints

use actix_web::{http::StatusCode, test, web};
use serde_json::{json, Value};
use std::sync::Arc;

use jp_api::{create_app, AppState};
use jp_core::domain::entities::OtpPurpose;
use jp_core::repositories::{InMemoryOtpStore, OtpStore};
use jp_core::services::{OtpService, OtpServiceConfig};
use jp_infra::MockEmailNotifier;
use jp_shared::config::ServerConfig;

struct TestContext {
    state: web::Data<AppState>,
    store: Arc<InMemoryOtpStore>,
    notifier: Arc<MockEmailNotifier>,
}

fn context() -> TestContext {
    let store = Arc::new(InMemoryOtpStore::new());
    let notifier = Arc::new(MockEmailNotifier::new(10));
    let config = OtpServiceConfig {
        background_delivery: false,
        ..Default::default()
    };
    let otp_service = Arc::new(OtpService::new(store.clone(), notifier.clone(), config));

    TestContext {
        state: web::Data::new(AppState { otp_service }),
        store,
        notifier,
    }
}

/// Code currently stored for a key, read straight from the store
async fn stored_code(store: &InMemoryOtpStore, identifier: &str, purpose: OtpPurpose) -> String {
    store.get(identifier, purpose).await.unwrap().unwrap().code
}

fn wrong(code: &str) -> &'static str {
    if code == "000000" { "111111" } else { "000000" }
}

#[actix_web::test]
async fn test_send_then_verify() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({"identifier": "Seeker@Example.com", "purpose": "registration"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["issued"], true);
    assert_eq!(ctx.notifier.message_count(), 1);

    let code = ctx
        .notifier
        .last_code("seeker@example.com", OtpPurpose::Registration)
        .unwrap();
    assert_eq!(code, stored_code(&ctx.store, "seeker@example.com", OtpPurpose::Registration).await);
    // The code never travels back over the API
    assert!(!body.to_string().contains(&code));

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({"identifier": "seeker@example.com", "purpose": "registration", "code": code}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "success");
    assert_eq!(body["message"], "OTP verified successfully");
    assert!(body.get("remaining_attempts").is_none());

    // Single use
    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({"identifier": "seeker@example.com", "purpose": "registration", "code": code}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "not_found");
}

#[actix_web::test]
async fn test_wrong_codes_until_exhausted() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({"identifier": "a@x.com", "purpose": "login"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let code = stored_code(&ctx.store, "a@x.com", OtpPurpose::Login).await;

    for remaining in (0..5).rev() {
        let req = test::TestRequest::post()
            .uri("/api/v1/otp/verify")
            .set_json(json!({"identifier": "a@x.com", "purpose": "login", "code": wrong(&code)}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"], "mismatch");
        assert_eq!(body["remaining_attempts"], remaining);
        assert_eq!(
            body["message"],
            format!("Invalid OTP. {} attempts remaining", remaining)
        );
    }

    // Exhaustion is sticky even for the right code
    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({"identifier": "a@x.com", "purpose": "login", "code": code}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "too_many_attempts");
    assert_eq!(body["message"], "Too many incorrect attempts");
}

#[actix_web::test]
async fn test_verify_without_issue_is_not_found() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({"identifier": "nobody@example.com", "purpose": "password_reset", "code": "123456"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "not_found");
    assert_eq!(body["message"], "OTP not found");
}

#[actix_web::test]
async fn test_unknown_purpose_is_rejected_before_the_store() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({"identifier": "a@x.com", "purpose": "reset"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_PURPOSE");
    assert_eq!(ctx.store.call_count(), 0);
    assert_eq!(ctx.notifier.message_count(), 0);
}

#[actix_web::test]
async fn test_invalid_email_is_a_validation_error() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({"identifier": "not-an-email", "purpose": "login"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["identifier"].is_array());
    assert_eq!(ctx.store.call_count(), 0);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"identifier\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_store_outage_is_retryable_503() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;
    ctx.store.set_unavailable(true);

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/send")
        .set_json(json!({"identifier": "a@x.com", "purpose": "registration"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["retryable"], true);
    assert_eq!(ctx.notifier.message_count(), 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/verify")
        .set_json(json!({"identifier": "a@x.com", "purpose": "registration", "code": "123456"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_health_and_unknown_route() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ServerConfig::default())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/otp/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
