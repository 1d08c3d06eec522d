//! Mock mail provider for testing

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::{MailProvider, ProviderKind, ProviderResponse, SendFailure};
use crate::message::OutboundMessage;

/// One scripted send outcome
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Deliver,
    Reject(u16),
    TransportFailure,
}

/// Mock mail provider with scripted outcomes and call counting.
///
/// Clones share the same counters and script, so a test can keep a
/// handle while the engine owns the boxed provider.
#[derive(Debug, Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    pub send_count: Arc<AtomicUsize>,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    fallback: MockOutcome,
}

impl MockProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            send_count: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: MockOutcome::Deliver,
        }
    }

    /// Every send is rejected with the given status
    pub fn with_rejection(mut self, status: u16) -> Self {
        self.fallback = MockOutcome::Reject(status);
        self
    }

    /// Every send fails at the transport level
    pub fn with_transport_failure(mut self) -> Self {
        self.fallback = MockOutcome::TransportFailure;
        self
    }

    /// Consume the given outcomes in order, then fall back to the
    /// configured default
    pub fn with_script(self, outcomes: Vec<MockOutcome>) -> Self {
        *self.script.lock().unwrap() = outcomes.into();
        self
    }

    pub fn send_call_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> MockOutcome {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl MailProvider for MockProvider {
    async fn send(&self, _message: &OutboundMessage) -> Result<ProviderResponse, SendFailure> {
        self.send_count.fetch_add(1, Ordering::SeqCst);

        match self.next_outcome() {
            MockOutcome::Deliver => Ok(ProviderResponse {
                message_id: Some(format!("mock-message-{}", uuid::Uuid::new_v4())),
            }),
            MockOutcome::Reject(status) => Err(SendFailure::Rejected {
                status,
                body: format!("mock rejection ({})", status),
            }),
            MockOutcome::TransportFailure => {
                Err(SendFailure::Transport("mock connection refused".to_string()))
            }
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OutboundMessage {
        OutboundMessage {
            to: "a@b.com".to_string(),
            to_name: None,
            cc: None,
            bcc: None,
            reply_to: None,
            subject: "Test".to_string(),
            html: Some("<p>hi</p>".to_string()),
            text: None,
        }
    }

    #[tokio::test]
    async fn test_mock_delivers_by_default() {
        let provider = MockProvider::new(ProviderKind::Brevo);

        let response = provider.send(&message()).await.unwrap();

        assert!(response
            .message_id
            .unwrap()
            .starts_with("mock-message-"));
        assert_eq!(provider.send_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_rejection() {
        let provider = MockProvider::new(ProviderKind::Mailjet).with_rejection(503);

        let result = provider.send(&message()).await;

        assert!(matches!(
            result,
            Err(SendFailure::Rejected { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_script_then_fallback() {
        let provider = MockProvider::new(ProviderKind::Brevo)
            .with_script(vec![MockOutcome::Reject(503), MockOutcome::TransportFailure]);

        assert!(matches!(
            provider.send(&message()).await,
            Err(SendFailure::Rejected { status: 503, .. })
        ));
        assert!(matches!(
            provider.send(&message()).await,
            Err(SendFailure::Transport(_))
        ));
        // Script exhausted, default fallback delivers
        assert!(provider.send(&message()).await.is_ok());
        assert_eq!(provider.send_call_count(), 3);
    }

    #[tokio::test]
    async fn test_clone_shares_counters() {
        let provider = MockProvider::new(ProviderKind::Resend);
        let handle = provider.clone();

        provider.send(&message()).await.unwrap();

        assert_eq!(handle.send_call_count(), 1);
    }
}
