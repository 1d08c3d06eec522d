//! Contact form service for Courier
//!
//! Turns one form submission into two email deliveries: a mandatory
//! admin notification and a best-effort confirmation back to the
//! submitter, both routed through the courier-delivery fallback
//! engine. Ships the axum routes, templates, and an optional
//! background dispatch queue.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod queue;
pub mod service;
pub mod templates;
pub mod types;

// Re-export main types
pub use config::{ContactConfig, DispatchMode};
pub use errors::ContactError;
pub use handlers::{configure_routes, AppState, ContactApiDoc};
pub use queue::{run_worker, SubmissionJob, SubmissionQueue};
pub use service::{Deliverer, EngineDeliverer, SubmissionService};
pub use types::{ContactSubmission, SendMailRequestBody, SendMailResponse};
