//! Submission processing
//!
//! One submission produces two deliveries: the admin notification is
//! mandatory and decides the overall outcome; the submitter
//! confirmation is best-effort and only flips a response flag.

use std::sync::Arc;

use async_trait::async_trait;
use courier_delivery::{
    CredentialSet, DeliveryEngine, DeliveryError, DeliveryOutcome, DeliveryReport, FailureReason,
    OutboundMessage,
};
use tracing::{info, warn};

use crate::config::ContactConfig;
use crate::errors::ContactError;
use crate::templates;
use crate::types::ContactSubmission;

/// Delivery seam for the submission service
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReport, DeliveryError>;
}

/// Production deliverer: the fallback engine plus the credential set
/// loaded at startup
pub struct EngineDeliverer {
    engine: DeliveryEngine,
    credentials: CredentialSet,
}

impl EngineDeliverer {
    pub fn new(engine: DeliveryEngine, credentials: CredentialSet) -> Self {
        Self {
            engine,
            credentials,
        }
    }
}

#[async_trait]
impl Deliverer for EngineDeliverer {
    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReport, DeliveryError> {
        self.engine.deliver(message, &self.credentials).await
    }
}

/// Per-submission result beyond success itself
#[derive(Debug, Clone, Copy)]
pub struct SubmissionOutcome {
    pub client_email_sent: bool,
}

#[derive(Clone)]
pub struct SubmissionService {
    deliverer: Arc<dyn Deliverer>,
    config: ContactConfig,
}

impl SubmissionService {
    pub fn new(deliverer: Arc<dyn Deliverer>, config: ContactConfig) -> Self {
        Self { deliverer, config }
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    /// Process one validated submission.
    ///
    /// Returns `Ok` when the admin notification was delivered; the
    /// confirmation outcome is reported in the value, never as an
    /// error.
    pub async fn process(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionOutcome, ContactError> {
        let admin = templates::admin_message(submission, &self.config);
        let report = self
            .deliverer
            .deliver(&admin)
            .await
            .map_err(|e| ContactError::AdminDeliveryFailed(e.to_string()))?;

        match report.outcome {
            DeliveryOutcome::Sent { provider } => {
                info!(
                    "Admin notification for {} delivered via {}",
                    submission.email, provider
                );
            }
            DeliveryOutcome::Failed {
                reason: FailureReason::Unconfigured,
            } => return Err(ContactError::Unconfigured),
            DeliveryOutcome::Failed {
                reason: FailureReason::Exhausted,
            } => return Err(ContactError::AdminDeliveryFailed(report.summary())),
        }

        let client_email_sent = self.send_confirmation(submission).await;

        Ok(SubmissionOutcome { client_email_sent })
    }

    /// Best-effort confirmation; failures are logged and absorbed
    async fn send_confirmation(&self, submission: &ContactSubmission) -> bool {
        let confirmation = templates::confirmation_message(submission, &self.config);
        match self.deliverer.deliver(&confirmation).await {
            Ok(report) if report.is_sent() => true,
            Ok(report) => {
                warn!(
                    "Confirmation to {} not delivered: {}",
                    submission.email,
                    report.summary()
                );
                false
            }
            Err(e) => {
                warn!("Confirmation to {} not delivered: {}", submission.email, e);
                false
            }
        }
    }
}
