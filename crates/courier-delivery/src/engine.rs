//! Provider fallback delivery engine
//!
//! Given a rendered message and an ordered credential set, the engine
//! tries each provider in priority order with a bounded in-call retry,
//! and returns one deterministic [`DeliveryReport`]. Expected provider
//! failures are attempt values inspected by the loop, never errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::credentials::CredentialSet;
use crate::errors::{bounded_text, DeliveryError};
use crate::message::OutboundMessage;
use crate::providers::{
    BrevoProvider, MailProvider, MailjetProvider, ProviderKind, ResendProvider, SendFailure,
};

/// Retry and timeout tunables for one engine instance
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Per-attempt network timeout
    pub request_timeout: Duration,
    /// Fixed number of attempts per provider before moving on
    pub max_attempts_per_provider: u32,
    /// Backoff between attempts on the same provider, scaled linearly
    /// by attempt number. No jitter, no exponential growth.
    pub backoff_base: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            max_attempts_per_provider: 2,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl DeliveryConfig {
    /// Read tunables from `COURIER_SEND_*` environment variables,
    /// falling back to defaults.
    pub fn from_env() -> Result<Self, DeliveryError> {
        let mut config = Self::default();

        if let Some(secs) = env_u64("COURIER_SEND_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = env_u64("COURIER_SEND_ATTEMPTS")? {
            if attempts == 0 {
                return Err(DeliveryError::Configuration(
                    "COURIER_SEND_ATTEMPTS must be at least 1".to_string(),
                ));
            }
            config.max_attempts_per_provider = attempts as u32;
        }
        if let Some(ms) = env_u64("COURIER_SEND_BACKOFF_MS")? {
            config.backoff_base = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn env_u64(key: &str) -> Result<Option<u64>, DeliveryError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DeliveryError::Configuration(format!("{} must be a number", key))),
        _ => Ok(None),
    }
}

/// Outcome of one network call to one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Delivered { message_id: Option<String> },
    Rejected { status: u16, body: String },
    TransportError { message: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Delivered { .. })
    }
}

/// Ephemeral record of one try, kept only for the result report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub provider: ProviderKind,
    /// 1-based attempt number within this provider
    pub attempt: u32,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Why a delivery failed terminally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Every usable provider was attempted without success
    Exhausted,
    /// No usable provider credentials were configured; no network call
    /// was made
    Unconfigured,
}

/// Overall delivery status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent { provider: ProviderKind },
    Failed { reason: FailureReason },
}

/// The engine's single return value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    /// Every attempt made, in order. On success the successful attempt
    /// is the last entry; on exhaustion each provider's final error is
    /// preserved here.
    pub attempts: Vec<DeliveryAttempt>,
}

impl DeliveryReport {
    fn unconfigured() -> Self {
        Self {
            outcome: DeliveryOutcome::Failed {
                reason: FailureReason::Unconfigured,
            },
            attempts: Vec::new(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Sent { .. })
    }

    /// The provider that delivered the message, if any
    pub fn sent_via(&self) -> Option<ProviderKind> {
        match self.outcome {
            DeliveryOutcome::Sent { provider } => Some(provider),
            DeliveryOutcome::Failed { .. } => None,
        }
    }

    /// The last (final) attempt recorded for the given provider
    pub fn final_attempt_for(&self, provider: ProviderKind) -> Option<&DeliveryAttempt> {
        self.attempts.iter().rev().find(|a| a.provider == provider)
    }

    /// One-line summary for logs and error messages
    pub fn summary(&self) -> String {
        match &self.outcome {
            DeliveryOutcome::Sent { provider } => format!("sent via {}", provider),
            DeliveryOutcome::Failed { reason } => {
                let attempts: Vec<String> = self
                    .attempts
                    .iter()
                    .map(|a| match &a.outcome {
                        AttemptOutcome::Delivered { .. } => {
                            format!("{}#{}: delivered", a.provider, a.attempt)
                        }
                        AttemptOutcome::Rejected { status, .. } => {
                            format!("{}#{}: rejected ({})", a.provider, a.attempt, status)
                        }
                        AttemptOutcome::TransportError { message } => {
                            format!("{}#{}: {}", a.provider, a.attempt, message)
                        }
                    })
                    .collect();
                match reason {
                    FailureReason::Unconfigured => "no provider configured".to_string(),
                    FailureReason::Exhausted => {
                        format!("all providers exhausted [{}]", attempts.join("; "))
                    }
                }
            }
        }
    }
}

/// The provider fallback delivery engine.
///
/// Holds only the shared HTTP client and tunables; all per-call state
/// lives on the stack, so concurrent deliveries are safe without
/// locking.
pub struct DeliveryEngine {
    client: reqwest::Client,
    config: DeliveryConfig,
}

impl DeliveryEngine {
    pub fn new(config: DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DeliveryError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Deliver one message through the credential set's providers in
    /// priority order.
    ///
    /// Validation and configuration problems surface synchronously,
    /// before any network call. Provider failures never do: they are
    /// absorbed into the report's attempt log.
    pub async fn deliver(
        &self,
        message: &OutboundMessage,
        credentials: &CredentialSet,
    ) -> Result<DeliveryReport, DeliveryError> {
        message.validate()?;

        let providers = self.build_providers(credentials);
        Ok(self.run(message, &providers).await)
    }

    /// Deliver through explicitly supplied providers.
    ///
    /// This is the seam the credential path goes through, and what
    /// tests use with scripted providers.
    pub async fn deliver_with(
        &self,
        message: &OutboundMessage,
        providers: &[Box<dyn MailProvider>],
    ) -> Result<DeliveryReport, DeliveryError> {
        message.validate()?;
        Ok(self.run(message, providers).await)
    }

    fn build_providers(&self, credentials: &CredentialSet) -> Vec<Box<dyn MailProvider>> {
        credentials
            .usable()
            .map(|creds| -> Box<dyn MailProvider> {
                match creds.kind {
                    ProviderKind::Brevo => Box::new(BrevoProvider::new(
                        self.client.clone(),
                        creds.api_key.clone(),
                        creds.sender.clone(),
                    )),
                    ProviderKind::Mailjet => Box::new(MailjetProvider::new(
                        self.client.clone(),
                        creds.api_key.clone(),
                        creds.secret_key.clone().unwrap_or_default(),
                        creds.sender.clone(),
                    )),
                    ProviderKind::Resend => Box::new(ResendProvider::new(
                        self.client.clone(),
                        creds.api_key.clone(),
                        creds.sender.clone(),
                    )),
                }
            })
            .collect()
    }

    async fn run(
        &self,
        message: &OutboundMessage,
        providers: &[Box<dyn MailProvider>],
    ) -> DeliveryReport {
        if providers.is_empty() {
            warn!("No usable mail provider configured, delivery skipped");
            return DeliveryReport::unconfigured();
        }

        let mut attempts = Vec::new();

        for provider in providers {
            for attempt in 1..=self.config.max_attempts_per_provider {
                if attempt > 1 {
                    tokio::time::sleep(self.config.backoff_base * (attempt - 1)).await;
                }

                debug!(
                    "Delivery attempt {}/{} via {} to {}",
                    attempt,
                    self.config.max_attempts_per_provider,
                    provider.kind(),
                    message.to
                );

                match provider.send(message).await {
                    Ok(response) => {
                        info!(
                            "Message delivered via {} on attempt {}, message_id: {:?}",
                            provider.kind(),
                            attempt,
                            response.message_id
                        );
                        attempts.push(DeliveryAttempt {
                            provider: provider.kind(),
                            attempt,
                            outcome: AttemptOutcome::Delivered {
                                message_id: response.message_id,
                            },
                        });
                        // First success wins; remaining providers are
                        // not attempted to avoid duplicate delivery
                        return DeliveryReport {
                            outcome: DeliveryOutcome::Sent {
                                provider: provider.kind(),
                            },
                            attempts,
                        };
                    }
                    Err(SendFailure::Rejected { status, body }) => {
                        warn!(
                            "Provider {} rejected message on attempt {} ({}): {}",
                            provider.kind(),
                            attempt,
                            status,
                            body
                        );
                        attempts.push(DeliveryAttempt {
                            provider: provider.kind(),
                            attempt,
                            outcome: AttemptOutcome::Rejected {
                                status,
                                body: bounded_text(&body),
                            },
                        });
                    }
                    Err(SendFailure::Transport(message_text)) => {
                        warn!(
                            "Transport error on attempt {} via {}: {}",
                            attempt,
                            provider.kind(),
                            message_text
                        );
                        attempts.push(DeliveryAttempt {
                            provider: provider.kind(),
                            attempt,
                            outcome: AttemptOutcome::TransportError {
                                message: bounded_text(&message_text),
                            },
                        });
                    }
                }
            }
        }

        error!(
            "All providers exhausted delivering to {}: {} attempts made",
            message.to,
            attempts.len()
        );

        DeliveryReport {
            outcome: DeliveryOutcome::Failed {
                reason: FailureReason::Exhausted,
            },
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockOutcome, MockProvider};

    fn message() -> OutboundMessage {
        OutboundMessage {
            to: "a@b.com".to_string(),
            to_name: None,
            cc: None,
            bcc: None,
            reply_to: None,
            subject: "Test".to_string(),
            html: Some("<p>hi</p>".to_string()),
            text: Some("hi".to_string()),
        }
    }

    fn engine(max_attempts: u32) -> DeliveryEngine {
        DeliveryEngine::new(DeliveryConfig {
            request_timeout: Duration::from_secs(1),
            max_attempts_per_provider: max_attempts,
            backoff_base: Duration::ZERO,
        })
        .unwrap()
    }

    fn boxed(providers: &[MockProvider]) -> Vec<Box<dyn MailProvider>> {
        providers
            .iter()
            .map(|p| -> Box<dyn MailProvider> { Box::new(p.clone()) })
            .collect()
    }

    #[tokio::test]
    async fn test_unconfigured_set_makes_no_calls() {
        let report = engine(2)
            .deliver(&message(), &CredentialSet::default())
            .await
            .unwrap();

        assert!(matches!(
            report.outcome,
            DeliveryOutcome::Failed {
                reason: FailureReason::Unconfigured
            }
        ));
        assert!(report.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_first_provider_success_short_circuits() {
        let primary = MockProvider::new(ProviderKind::Brevo);
        let secondary = MockProvider::new(ProviderKind::Mailjet);

        let report = engine(2)
            .deliver_with(&message(), &boxed(&[primary.clone(), secondary.clone()]))
            .await
            .unwrap();

        assert_eq!(report.sent_via(), Some(ProviderKind::Brevo));
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(primary.send_call_count(), 1);
        assert_eq!(secondary.send_call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_reaches_working_provider() {
        // One attempt per provider: the attempt log length equals the
        // number of providers tried, working provider inclusive
        let failing_one = MockProvider::new(ProviderKind::Brevo).with_rejection(500);
        let failing_two = MockProvider::new(ProviderKind::Mailjet).with_transport_failure();
        let working = MockProvider::new(ProviderKind::Resend);

        let report = engine(1)
            .deliver_with(
                &message(),
                &boxed(&[failing_one.clone(), failing_two.clone(), working.clone()]),
            )
            .await
            .unwrap();

        assert_eq!(report.sent_via(), Some(ProviderKind::Resend));
        assert_eq!(report.attempts.len(), 3);
        assert!(report.attempts[2].outcome.is_success());
        assert_eq!(failing_one.send_call_count(), 1);
        assert_eq!(failing_two.send_call_count(), 1);
        assert_eq!(working.send_call_count(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_preserves_final_error_per_provider() {
        let primary = MockProvider::new(ProviderKind::Brevo).with_rejection(503);
        let secondary = MockProvider::new(ProviderKind::Mailjet).with_transport_failure();

        let report = engine(2)
            .deliver_with(&message(), &boxed(&[primary.clone(), secondary.clone()]))
            .await
            .unwrap();

        assert!(matches!(
            report.outcome,
            DeliveryOutcome::Failed {
                reason: FailureReason::Exhausted
            }
        ));
        // Both attempts per provider are retained
        assert_eq!(report.attempts.len(), 4);
        assert_eq!(primary.send_call_count(), 2);
        assert_eq!(secondary.send_call_count(), 2);

        let brevo_final = report.final_attempt_for(ProviderKind::Brevo).unwrap();
        assert!(matches!(
            brevo_final.outcome,
            AttemptOutcome::Rejected { status: 503, .. }
        ));
        assert_eq!(brevo_final.attempt, 2);

        let mailjet_final = report.final_attempt_for(ProviderKind::Mailjet).unwrap();
        assert!(matches!(
            mailjet_final.outcome,
            AttemptOutcome::TransportError { .. }
        ));
    }

    #[tokio::test]
    async fn test_retries_then_next_provider_succeeds() {
        // Provider 1 returns 503 twice, provider 2 delivers
        let primary = MockProvider::new(ProviderKind::Brevo)
            .with_script(vec![MockOutcome::Reject(503), MockOutcome::Reject(503)]);
        let secondary = MockProvider::new(ProviderKind::Mailjet);

        let report = engine(2)
            .deliver_with(&message(), &boxed(&[primary.clone(), secondary.clone()]))
            .await
            .unwrap();

        assert_eq!(report.sent_via(), Some(ProviderKind::Mailjet));
        assert_eq!(report.attempts.len(), 3);
        assert_eq!(primary.send_call_count(), 2);
        assert_eq!(secondary.send_call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejection_capped_at_attempt_count() {
        // A 4xx is not distinguished from transient, but it is never
        // retried beyond the fixed per-provider attempt count
        let rejecting = MockProvider::new(ProviderKind::Brevo).with_rejection(400);

        let report = engine(2)
            .deliver_with(&message(), &boxed(&[rejecting.clone()]))
            .await
            .unwrap();

        assert!(!report.is_sent());
        assert_eq!(rejecting.send_call_count(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_success() {
        let provider = MockProvider::new(ProviderKind::Brevo);
        let engine = engine(2);

        let first = engine
            .deliver_with(&message(), &boxed(&[provider.clone()]))
            .await
            .unwrap();
        let second = engine
            .deliver_with(&message(), &boxed(&[provider.clone()]))
            .await
            .unwrap();

        assert!(first.is_sent());
        assert!(second.is_sent());
        // No dedup: each call sends independently
        assert_eq!(provider.send_call_count(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_failure() {
        let provider = MockProvider::new(ProviderKind::Brevo).with_rejection(500);
        let engine = engine(2);

        let first = engine
            .deliver_with(&message(), &boxed(&[provider.clone()]))
            .await
            .unwrap();
        let second = engine
            .deliver_with(&message(), &boxed(&[provider.clone()]))
            .await
            .unwrap();

        assert_eq!(first.attempts.len(), second.attempts.len());
        assert!(!first.is_sent());
        assert!(!second.is_sent());
    }

    #[tokio::test]
    async fn test_validation_error_is_synchronous() {
        let provider = MockProvider::new(ProviderKind::Brevo);
        let mut invalid = message();
        invalid.subject = String::new();

        let result = engine(2)
            .deliver_with(&invalid, &boxed(&[provider.clone()]))
            .await;

        assert!(matches!(result, Err(DeliveryError::Validation(_))));
        assert_eq!(provider.send_call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_provider_slice_is_unconfigured() {
        let report = engine(2).deliver_with(&message(), &[]).await.unwrap();

        assert!(matches!(
            report.outcome,
            DeliveryOutcome::Failed {
                reason: FailureReason::Unconfigured
            }
        ));
    }

    #[test]
    fn test_summary_formats() {
        let sent = DeliveryReport {
            outcome: DeliveryOutcome::Sent {
                provider: ProviderKind::Brevo,
            },
            attempts: Vec::new(),
        };
        assert_eq!(sent.summary(), "sent via brevo");

        let unconfigured = DeliveryReport::unconfigured();
        assert_eq!(unconfigured.summary(), "no provider configured");

        let exhausted = DeliveryReport {
            outcome: DeliveryOutcome::Failed {
                reason: FailureReason::Exhausted,
            },
            attempts: vec![DeliveryAttempt {
                provider: ProviderKind::Resend,
                attempt: 1,
                outcome: AttemptOutcome::Rejected {
                    status: 422,
                    body: "invalid".to_string(),
                },
            }],
        };
        assert!(exhausted.summary().contains("resend#1: rejected (422)"));
    }

    #[test]
    fn test_default_config() {
        let config = DeliveryConfig::default();
        assert_eq!(config.max_attempts_per_provider, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.backoff_base, Duration::from_millis(500));
    }

    #[test]
    fn test_attempt_serialization() {
        let attempt = DeliveryAttempt {
            provider: ProviderKind::Brevo,
            attempt: 1,
            outcome: AttemptOutcome::Rejected {
                status: 503,
                body: "busy".to_string(),
            },
        };

        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["provider"], "brevo");
        assert_eq!(json["attempt"], 1);
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["status"], 503);
    }
}
