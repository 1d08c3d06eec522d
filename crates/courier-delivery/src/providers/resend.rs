//! Resend email provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{MailProvider, ProviderKind, ProviderResponse, SendFailure, SenderIdentity};
use crate::message::OutboundMessage;

/// Resend email API provider (generic fallback)
pub struct ResendProvider {
    client: Client,
    api_key: String,
    sender: SenderIdentity,
}

impl ResendProvider {
    const ENDPOINT: &'static str = "https://api.resend.com/emails";

    pub fn new(client: Client, api_key: String, sender: SenderIdentity) -> Self {
        Self {
            client,
            api_key,
            sender,
        }
    }

    fn payload(&self, message: &OutboundMessage) -> ResendSendRequest {
        let from = match &self.sender.name {
            Some(name) => format!("{} <{}>", name, self.sender.email),
            None => self.sender.email.clone(),
        };

        ResendSendRequest {
            from,
            to: vec![message.to.clone()],
            cc: message.cc.clone(),
            bcc: message.bcc.clone(),
            reply_to: message.reply_to.clone(),
            subject: message.subject.clone(),
            html: message.html.clone(),
            text: message.text.clone(),
        }
    }
}

// Resend API request/response types
#[derive(Debug, Serialize)]
struct ResendSendRequest {
    from: String,
    to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendSendResponse {
    id: Option<String>,
}

#[async_trait]
impl MailProvider for ResendProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, SendFailure> {
        debug!("Sending email via Resend to: {}", message.to);

        let response = self
            .client
            .post(Self::ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| SendFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SendFailure::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .json::<ResendSendResponse>()
            .await
            .ok()
            .and_then(|r| r.id);

        debug!("Email accepted by Resend, message_id: {:?}", message_id);

        Ok(ProviderResponse { message_id })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Resend
    }
}
