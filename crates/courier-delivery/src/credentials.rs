//! Provider credential configuration
//!
//! Credentials are constructed explicitly (typically once at process
//! start from the environment) and immutable afterwards, so concurrent
//! deliveries share them without locking.

use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;
use crate::providers::{ProviderKind, SenderIdentity};

/// One named provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// Which provider API these credentials belong to
    pub kind: ProviderKind,
    /// API key (or public key for providers using key pairs)
    pub api_key: String,
    /// Secret key, for providers authenticating with a key pair (Mailjet)
    pub secret_key: Option<String>,
    /// Sender identity to use with this provider
    pub sender: SenderIdentity,
}

impl ProviderCredentials {
    /// An entry with a blank API key cannot authenticate and is skipped.
    pub fn is_usable(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.sender.email.trim().is_empty()
    }
}

/// Ordered sequence of provider credentials.
///
/// The order is the fallback priority order and is fixed at
/// construction; there is no runtime health tracking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialSet {
    entries: Vec<ProviderCredentials>,
}

impl CredentialSet {
    pub fn new(entries: Vec<ProviderCredentials>) -> Self {
        Self { entries }
    }

    /// Build the credential set from `COURIER_*` environment variables.
    ///
    /// Provider keys are optional (the engine reports an unconfigured
    /// failure per call when none are set), but a sender identity is
    /// required as soon as any provider key is present.
    pub fn from_env() -> Result<Self, DeliveryError> {
        let sender_email = env_trimmed("COURIER_SENDER_EMAIL");
        let sender_name = env_trimmed("COURIER_SENDER_NAME");

        let brevo_key = env_trimmed("COURIER_BREVO_API_KEY");
        let mailjet_key = env_trimmed("COURIER_MAILJET_API_KEY");
        let mailjet_secret = env_trimmed("COURIER_MAILJET_SECRET_KEY");
        let resend_key = env_trimmed("COURIER_RESEND_API_KEY");

        let any_key = brevo_key.is_some() || mailjet_key.is_some() || resend_key.is_some();

        let Some(sender_email) = sender_email else {
            if any_key {
                return Err(DeliveryError::Configuration(
                    "COURIER_SENDER_EMAIL is required when provider keys are configured"
                        .to_string(),
                ));
            }
            return Ok(Self::default());
        };

        let sender = SenderIdentity::new(sender_email, sender_name);

        let mut entries = Vec::new();
        if let Some(api_key) = brevo_key {
            entries.push(ProviderCredentials {
                kind: ProviderKind::Brevo,
                api_key,
                secret_key: None,
                sender: sender.clone(),
            });
        }
        if let Some(api_key) = mailjet_key {
            let Some(secret_key) = mailjet_secret else {
                return Err(DeliveryError::Configuration(
                    "COURIER_MAILJET_SECRET_KEY is required with COURIER_MAILJET_API_KEY"
                        .to_string(),
                ));
            };
            entries.push(ProviderCredentials {
                kind: ProviderKind::Mailjet,
                api_key,
                secret_key: Some(secret_key),
                sender: sender.clone(),
            });
        }
        if let Some(api_key) = resend_key {
            entries.push(ProviderCredentials {
                kind: ProviderKind::Resend,
                api_key,
                secret_key: None,
                sender: sender.clone(),
            });
        }

        Ok(Self { entries })
    }

    /// Usable entries in fallback priority order
    pub fn usable(&self) -> impl Iterator<Item = &ProviderCredentials> {
        self.entries.iter().filter(|c| c.is_usable())
    }

    /// Number of usable entries
    pub fn usable_len(&self) -> usize {
        self.usable().count()
    }

    /// All entries, usable or not
    pub fn entries(&self) -> &[ProviderCredentials] {
        &self.entries
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}
