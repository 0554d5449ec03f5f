//! Conversion of domain errors into HTTP responses

use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use jp_core::errors::{AuthError, DomainError};
use jp_shared::errors::{error_codes, ErrorResponse};

/// Status code and body for a domain error
///
/// A store outage is the only server-side fault and the only retryable error.
pub fn domain_error_response(error: &DomainError) -> (StatusCode, ErrorResponse) {
    match error {
        DomainError::Validation { message } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone()),
        ),
        DomainError::InvalidPurpose { purpose } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::INVALID_PURPOSE, format!("Unknown purpose '{}'", purpose))
                .add_detail("allowed", ["registration", "login", "password_reset"]),
        ),
        DomainError::StoreUnavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Verification service is temporarily unavailable",
            )
            .retryable(),
        ),
        DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred"),
        ),
        DomainError::Auth(auth_error) => {
            let (status, code) = match auth_error {
                AuthError::OtpNotFound => (StatusCode::BAD_REQUEST, error_codes::OTP_NOT_FOUND),
                AuthError::OtpExpired => (StatusCode::BAD_REQUEST, error_codes::OTP_EXPIRED),
                AuthError::InvalidOtp { .. } => (StatusCode::BAD_REQUEST, error_codes::OTP_INVALID),
                AuthError::TooManyAttempts => {
                    (StatusCode::TOO_MANY_REQUESTS, error_codes::OTP_TOO_MANY_ATTEMPTS)
                }
            };
            (status, ErrorResponse::new(code, auth_error.to_string()))
        }
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let (status, body) = domain_error_response(&error);

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), "Request rejected");
    }

    HttpResponse::build(status).json(body)
}

/// 400 response listing each invalid field
pub fn handle_validation_errors(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");

    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        response = response.add_detail(field.to_string(), messages);
    }

    HttpResponse::BadRequest().json(response)
}
