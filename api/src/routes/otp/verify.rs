use actix_web::{http::StatusCode, web, HttpResponse};
use validator::Validate;

use jp_core::services::VerifyOutcome;
use jp_shared::utils::mask_identifier;

use crate::dto::{VerifyOtpRequest, VerifyOtpResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};

use super::AppState;

/// Handler for POST /api/v1/otp/verify
///
/// # Request Body
///
/// ```json
/// { "identifier": "seeker@example.com", "purpose": "registration", "code": "042917" }
/// ```
///
/// # Response
///
/// Every outcome shares one body shape:
/// ```json
/// { "outcome": "mismatch", "message": "Invalid OTP. 4 attempts remaining", "remaining_attempts": 4 }
/// ```
///
/// - 200 `success`
/// - 400 `mismatch`, `expired`, `not_found`
/// - 429 `too_many_attempts`
pub async fn verify_otp(state: web::Data<AppState>, request: web::Json<VerifyOtpRequest>) -> HttpResponse {
    if let Err(errors) = request.validate() {
        tracing::warn!(
            identifier = %mask_identifier(&request.identifier),
            "Validation failed for verify_otp request"
        );
        return handle_validation_errors(&errors);
    }

    match state
        .otp_service
        .verify(&request.identifier, &request.purpose, &request.code)
        .await
    {
        Ok(outcome) => HttpResponse::build(outcome_status(&outcome)).json(VerifyOtpResponse::from(outcome)),
        Err(error) => handle_domain_error(error),
    }
}

fn outcome_status(outcome: &VerifyOutcome) -> StatusCode {
    match outcome {
        VerifyOutcome::Success => StatusCode::OK,
        VerifyOutcome::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        VerifyOutcome::NotFound | VerifyOutcome::Expired | VerifyOutcome::Mismatch { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}
