//! Contact service errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::SendMailResponse;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("No mail provider configured")]
    Unconfigured,

    #[error("Admin notification failed: {0}")]
    AdminDeliveryFailed(String),

    #[error("Submission queue closed")]
    QueueClosed,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ContactError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContactError::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
            ContactError::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::AdminDeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            ContactError::QueueClosed => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Every error response keeps the /send-mail body shape so form
// frontends can read a single contract.
impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = SendMailResponse::failure(self.to_string());
        (status, Json(body)).into_response()
    }
}
