//! Mailjet transactional email provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{MailProvider, ProviderKind, ProviderResponse, SendFailure, SenderIdentity};
use crate::message::OutboundMessage;

/// Mailjet v3.1 send API provider
pub struct MailjetProvider {
    client: Client,
    api_key: String,
    secret_key: String,
    sender: SenderIdentity,
}

impl MailjetProvider {
    const ENDPOINT: &'static str = "https://api.mailjet.com/v3.1/send";

    pub fn new(client: Client, api_key: String, secret_key: String, sender: SenderIdentity) -> Self {
        Self {
            client,
            api_key,
            secret_key,
            sender,
        }
    }

    fn payload(&self, message: &OutboundMessage) -> MailjetSendRequest {
        MailjetSendRequest {
            messages: vec![MailjetMessage {
                from: MailjetAddress {
                    email: self.sender.email.clone(),
                    name: self.sender.name.clone(),
                },
                to: vec![MailjetAddress {
                    email: message.to.clone(),
                    name: message.to_name.clone(),
                }],
                cc: message.cc.as_ref().map(|addrs| {
                    addrs
                        .iter()
                        .map(|e| MailjetAddress {
                            email: e.clone(),
                            name: None,
                        })
                        .collect()
                }),
                bcc: message.bcc.as_ref().map(|addrs| {
                    addrs
                        .iter()
                        .map(|e| MailjetAddress {
                            email: e.clone(),
                            name: None,
                        })
                        .collect()
                }),
                reply_to: message.reply_to.as_ref().map(|e| MailjetAddress {
                    email: e.clone(),
                    name: None,
                }),
                subject: message.subject.clone(),
                html_part: message.html.clone(),
                text_part: message.text.clone(),
            }],
        }
    }
}

// Mailjet API request/response types
#[derive(Debug, Serialize)]
struct MailjetSendRequest {
    #[serde(rename = "Messages")]
    messages: Vec<MailjetMessage>,
}

#[derive(Debug, Serialize)]
struct MailjetMessage {
    #[serde(rename = "From")]
    from: MailjetAddress,
    #[serde(rename = "To")]
    to: Vec<MailjetAddress>,
    #[serde(rename = "Cc", skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<MailjetAddress>>,
    #[serde(rename = "Bcc", skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<MailjetAddress>>,
    #[serde(rename = "ReplyTo", skip_serializing_if = "Option::is_none")]
    reply_to: Option<MailjetAddress>,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "HTMLPart", skip_serializing_if = "Option::is_none")]
    html_part: Option<String>,
    #[serde(rename = "TextPart", skip_serializing_if = "Option::is_none")]
    text_part: Option<String>,
}

#[derive(Debug, Serialize)]
struct MailjetAddress {
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MailjetSendResponse {
    #[serde(rename = "Messages", default)]
    messages: Vec<MailjetMessageResult>,
}

#[derive(Debug, Deserialize)]
struct MailjetMessageResult {
    #[serde(rename = "To", default)]
    to: Vec<MailjetRecipientResult>,
}

#[derive(Debug, Deserialize)]
struct MailjetRecipientResult {
    #[serde(rename = "MessageID")]
    message_id: Option<u64>,
}

#[async_trait]
impl MailProvider for MailjetProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, SendFailure> {
        debug!("Sending email via Mailjet to: {}", message.to);

        let response = self
            .client
            .post(Self::ENDPOINT)
            .basic_auth(&self.api_key, Some(&self.secret_key))
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
            .json::<MailjetSendResponse>()
            .await
            .ok()
            .and_then(|r| {
                r.messages
                    .first()
                    .and_then(|m| m.to.first())
                    .and_then(|t| t.message_id)
            })
            .map(|id| id.to_string());

        debug!("Email accepted by Mailjet, message_id: {:?}", message_id);

        Ok(ProviderResponse { message_id })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mailjet
    }
}
