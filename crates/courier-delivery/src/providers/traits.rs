//! Mail provider trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::errors::DeliveryError;
use crate::message::OutboundMessage;

/// Supported mail provider types, in fallback priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Brevo transactional email API (primary)
    Brevo,
    /// Mailjet transactional email API (secondary)
    Mailjet,
    /// Resend email API (generic fallback)
    Resend,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Brevo => write!(f, "brevo"),
            ProviderKind::Mailjet => write!(f, "mailjet"),
            ProviderKind::Resend => write!(f, "resend"),
        }
    }
}

impl ProviderKind {
    pub fn from_str(s: &str) -> Result<Self, DeliveryError> {
        match s.to_lowercase().as_str() {
            "brevo" | "sendinblue" => Ok(ProviderKind::Brevo),
            "mailjet" | "mj" => Ok(ProviderKind::Mailjet),
            "resend" => Ok(ProviderKind::Resend),
            _ => Err(DeliveryError::Configuration(format!(
                "Unknown provider type: {}",
                s
            ))),
        }
    }
}

/// Sender identity attached to outbound mail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderIdentity {
    /// Sender email address
    pub email: String,
    /// Sender display name (optional)
    pub name: Option<String>,
}

impl SenderIdentity {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

/// Response from a successful provider send
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Provider's message ID, when the provider returns one
    pub message_id: Option<String>,
}

/// Why a single send against one provider did not succeed.
///
/// These are expected outcomes inspected by the delivery loop, not
/// exceptions: a provider declining a message and a socket falling over
/// both advance the engine to the next attempt or provider.
#[derive(Error, Debug, Clone)]
pub enum SendFailure {
    /// The provider answered but declined the message (any non-2xx status)
    #[error("provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The provider could not be reached (connect, DNS, timeout)
    #[error("transport error: {0}")]
    Transport(String),
}

/// Mail provider abstraction over transactional email APIs
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Send a single message. Only an HTTP 2xx from the provider API
    /// counts as delivered.
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, SendFailure>;

    /// Get the provider type
    fn kind(&self) -> ProviderKind;
}
