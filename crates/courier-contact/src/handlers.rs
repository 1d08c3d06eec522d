//! Contact form HTTP handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::errors::ContactError;
use crate::queue::SubmissionQueue;
use crate::service::SubmissionService;
use crate::types::{ContactSubmission, SendMailRequestBody, SendMailResponse};

/// Shared state for the contact routes
pub struct AppState {
    pub service: SubmissionService,
    /// Present in background dispatch mode; absent means inline
    pub queue: Option<SubmissionQueue>,
}

/// Configure contact routes.
///
/// The form posts from arbitrary static-site origins, so the CORS
/// layer allows any origin, method and header.
pub fn configure_routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/send-mail", post(send_mail))
        .route("/healthz", get(healthz))
        .layer(cors)
}

/// Submit a contact form
#[utoipa::path(
    tag = "Contact",
    post,
    path = "/send-mail",
    request_body = SendMailRequestBody,
    responses(
        (status = 200, description = "Admin notification delivered", body = SendMailResponse),
        (status = 202, description = "Submission queued for background delivery", body = SendMailResponse),
        (status = 400, description = "Missing or invalid fields", body = SendMailResponse),
        (status = 500, description = "No mail provider configured", body = SendMailResponse),
        (status = 502, description = "All providers failed", body = SendMailResponse)
    )
)]
pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMailRequestBody>,
) -> Result<impl IntoResponse, ContactError> {
    let submission = ContactSubmission::from_request(body)?;

    if let Some(queue) = &state.queue {
        queue.enqueue(submission).await?;
        // Delivery happens in the worker; the client is not told the
        // outcome
        return Ok((StatusCode::ACCEPTED, Json(SendMailResponse::accepted())));
    }

    let outcome = state.service.process(&submission).await?;
    Ok((
        StatusCode::OK,
        Json(SendMailResponse::sent(outcome.client_email_sent)),
    ))
}

/// Liveness probe
#[utoipa::path(
    tag = "Contact",
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(OpenApi)]
#[openapi(
    paths(send_mail, healthz),
    components(schemas(SendMailRequestBody, SendMailResponse)),
    tags(
        (name = "Contact", description = "Contact form submission endpoints")
    )
)]
pub struct ContactApiDoc;
