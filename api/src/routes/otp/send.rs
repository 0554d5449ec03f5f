use actix_web::{web, HttpResponse};
use validator::Validate;

use jp_shared::utils::mask_identifier;

use crate::dto::{SendOtpRequest, SendOtpResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};

use super::AppState;

/// Handler for POST /api/v1/otp/send
///
/// # Request Body
///
/// ```json
/// { "identifier": "seeker@example.com", "purpose": "registration" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "issued": true, "message": "OTP sent to your email" }
/// ```
///
/// The code itself is never part of the response. A delivery failure still
/// answers 200; the caller simply requests a new code.
///
/// ## Errors
/// - 400 `VALIDATION_ERROR` / `INVALID_PURPOSE`
/// - 503 `SERVICE_UNAVAILABLE` (retryable)
pub async fn send_otp(state: web::Data<AppState>, request: web::Json<SendOtpRequest>) -> HttpResponse {
    if let Err(errors) = request.validate() {
        tracing::warn!(
            identifier = %mask_identifier(&request.identifier),
            "Validation failed for send_otp request"
        );
        return handle_validation_errors(&errors);
    }

    match state.otp_service.issue(&request.identifier, &request.purpose).await {
        Ok(_record) => HttpResponse::Ok().json(SendOtpResponse {
            issued: true,
            message: "OTP sent to your email".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
