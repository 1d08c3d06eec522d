//! Brevo transactional email provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{MailProvider, ProviderKind, ProviderResponse, SendFailure, SenderIdentity};
use crate::message::OutboundMessage;

/// Brevo transactional email provider
pub struct BrevoProvider {
    client: Client,
    api_key: String,
    sender: SenderIdentity,
}

impl BrevoProvider {
    const ENDPOINT: &'static str = "https://api.brevo.com/v3/smtp/email";

    pub fn new(client: Client, api_key: String, sender: SenderIdentity) -> Self {
        Self {
            client,
            api_key,
            sender,
        }
    }

    fn payload(&self, message: &OutboundMessage) -> BrevoSendRequest {
        BrevoSendRequest {
            sender: BrevoAddress {
                email: self.sender.email.clone(),
                name: self.sender.name.clone(),
            },
            to: vec![BrevoAddress {
                email: message.to.clone(),
                name: message.to_name.clone(),
            }],
            cc: message.cc.as_ref().map(|addrs| {
                addrs
                    .iter()
                    .map(|e| BrevoAddress {
                        email: e.clone(),
                        name: None,
                    })
                    .collect()
            }),
            bcc: message.bcc.as_ref().map(|addrs| {
                addrs
                    .iter()
                    .map(|e| BrevoAddress {
                        email: e.clone(),
                        name: None,
                    })
                    .collect()
            }),
            reply_to: message.reply_to.as_ref().map(|e| BrevoAddress {
                email: e.clone(),
                name: None,
            }),
            subject: message.subject.clone(),
            html_content: message.html.clone(),
            text_content: message.text.clone(),
        }
    }
}

// Brevo API request/response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendRequest {
    sender: BrevoAddress,
    to: Vec<BrevoAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<BrevoAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<BrevoAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<BrevoAddress>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<String>,
}

#[derive(Debug, Serialize)]
struct BrevoAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendResponse {
    message_id: Option<String>,
}

#[async_trait]
impl MailProvider for BrevoProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, SendFailure> {
        debug!("Sending email via Brevo to: {}", message.to);

        let response = self
            .client
            .post(Self::ENDPOINT)
            .header("api-key", &self.api_key)
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

        // The body is informational only; a 2xx already means accepted
        let message_id = response
            .json::<BrevoSendResponse>()
            .await
            .ok()
            .and_then(|r| r.message_id);

        debug!("Email accepted by Brevo, message_id: {:?}", message_id);

        Ok(ProviderResponse { message_id })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Brevo
    }
}
