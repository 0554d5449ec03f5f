//! Application state and factory
//!
//! This module builds the Actix-web application from shared state so the
//! binary and the tests run exactly the same routing.

use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpResponse};
use tracing_actix_web::TracingLogger;

use jp_shared::config::ServerConfig;
use jp_shared::errors::{error_codes, ErrorResponse};

use crate::middleware::create_cors;
use crate::routes::otp::{send_otp, verify_otp, AppState};

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
    server: &ServerConfig,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Request spans first so CORS rejections are traced too
        .wrap(create_cors(server))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/otp")
                        .route("/send", web::post().to(send_otp))
                        .route("/verify", web::post().to(verify_otp)),
                )
                .route("/", web::get().to(api_documentation)),
        )
        .default_service(web::route().to(not_found))
}

/// Malformed or oversized JSON bodies answer 400 in the standard error shape
fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse::new(error_codes::BAD_REQUEST, error.to_string());
    actix_web::error::InternalError::from_response(error, HttpResponse::BadRequest().json(body)).into()
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "job-portal-otp",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// API documentation endpoint
async fn api_documentation() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Job Portal OTP API v1",
        "endpoints": {
            "health": "/health",
            "otp": {
                "send": {
                    "path": "/api/v1/otp/send",
                    "method": "POST",
                    "description": "Issue a one-time passcode and email it",
                    "request_body": {
                        "identifier": "string (email address)",
                        "purpose": "string ('registration', 'login' or 'password_reset')"
                    },
                    "responses": {
                        "200": "Code issued",
                        "400": "Invalid email or purpose",
                        "503": "Passcode store unavailable"
                    }
                },
                "verify": {
                    "path": "/api/v1/otp/verify",
                    "method": "POST",
                    "description": "Verify a submitted passcode",
                    "request_body": {
                        "identifier": "string (email address)",
                        "purpose": "string",
                        "code": "string"
                    },
                    "responses": {
                        "200": "Code verified",
                        "400": "Mismatch, expired or no code issued",
                        "429": "Too many incorrect attempts",
                        "503": "Passcode store unavailable"
                    }
                }
            }
        }
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
