//! Background submission queue
//!
//! Background dispatch is fire-and-forget: the handler enqueues and
//! responds immediately, the worker drains the queue through the same
//! processing path, and outcomes exist only in the logs.

use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::ContactError;
use crate::service::SubmissionService;
use crate::types::ContactSubmission;

/// One queued submission with its tracking id
#[derive(Debug, Clone)]
pub struct SubmissionJob {
    pub id: Uuid,
    pub submission: ContactSubmission,
}

#[derive(Clone)]
pub struct SubmissionQueue {
    sender: mpsc::Sender<SubmissionJob>,
}

impl SubmissionQueue {
    pub fn create_channel(buffer_size: usize) -> (Self, mpsc::Receiver<SubmissionJob>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { sender }, receiver)
    }

    /// Enqueue a submission, returning its tracking id
    pub async fn enqueue(&self, submission: ContactSubmission) -> Result<Uuid, ContactError> {
        let job = SubmissionJob {
            id: Uuid::new_v4(),
            submission,
        };
        let id = job.id;
        info!("Queueing submission {} from {}", id, job.submission.email);
        self.sender.send(job).await.map_err(|_| {
            error!("Submission queue closed, dropping submission {}", id);
            ContactError::QueueClosed
        })?;
        Ok(id)
    }
}

/// Drain the queue until every sender is dropped.
///
/// Runs as a spawned task next to the server. A processing failure is
/// terminal for that submission; nothing is retried at this layer
/// since the delivery engine already did its fallback rounds.
pub async fn run_worker(service: SubmissionService, mut receiver: mpsc::Receiver<SubmissionJob>) {
    info!("Submission worker started");
    while let Some(job) = receiver.recv().await {
        match service.process(&job.submission).await {
            Ok(outcome) => {
                info!(
                    "Submission {} processed, confirmation sent: {}",
                    job.id, outcome.client_email_sent
                );
            }
            Err(e) => {
                error!("Submission {} failed: {}", job.id, e);
            }
        }
    }
    info!("Submission worker stopped, queue closed");
}
