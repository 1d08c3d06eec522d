//! Transactional email delivery for Courier
//!
//! This crate provides email delivery through multiple providers:
//! - Brevo
//! - Mailjet
//! - Resend
//!
//! Features:
//! - Ordered provider fallback with per-provider retry
//! - Deterministic delivery reports with a full attempt log
//! - Credential configuration from environment variables

pub mod credentials;
pub mod engine;
pub mod errors;
pub mod message;
pub mod providers;

// Re-export main types
pub use credentials::{CredentialSet, ProviderCredentials};
pub use engine::{
    AttemptOutcome, DeliveryAttempt, DeliveryConfig, DeliveryEngine, DeliveryOutcome,
    DeliveryReport, FailureReason,
};
pub use errors::DeliveryError;
pub use message::OutboundMessage;
pub use providers::{MailProvider, ProviderKind, SenderIdentity};
