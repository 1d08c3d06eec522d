//! Outbound message value object

use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;

/// Practical upper bound on a full email address, per RFC 5321 errata.
pub const MAX_ADDRESS_LENGTH: usize = 254;

/// A fully-rendered message handed to the delivery engine.
///
/// Constructed by the caller and never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient display name (optional)
    pub to_name: Option<String>,
    /// CC recipients
    pub cc: Option<Vec<String>>,
    /// BCC recipients
    pub bcc: Option<Vec<String>>,
    /// Reply-to address
    pub reply_to: Option<String>,
    /// Email subject
    pub subject: String,
    /// HTML body content
    pub html: Option<String>,
    /// Plain text body content
    pub text: Option<String>,
}

impl OutboundMessage {
    /// Check the engine's input contract: non-empty subject, at least one
    /// non-empty body, and a syntactically valid recipient address.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        if self.subject.trim().is_empty() {
            return Err(DeliveryError::Validation(
                "Subject must not be empty".to_string(),
            ));
        }

        let has_html = self.html.as_deref().is_some_and(|h| !h.trim().is_empty());
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_html && !has_text {
            return Err(DeliveryError::Validation(
                "Either html or text body is required".to_string(),
            ));
        }

        if !is_valid_address(&self.to) {
            return Err(DeliveryError::Validation(format!(
                "Invalid recipient address: {}",
                self.to
            )));
        }

        Ok(())
    }
}

/// Syntax-level address check: local-part@domain, domain contains a dot,
/// bounded total length. Deliverability is the provider's problem.
pub fn is_valid_address(address: &str) -> bool {
    if address.is_empty() || address.len() > MAX_ADDRESS_LENGTH {
        return false;
    }
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    true
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
            text: Some("hi".to_string()),
        }
    }

    #[test]
    fn test_valid_message() {
        assert!(message().validate().is_ok());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let mut msg = message();
        msg.subject = "   ".to_string();
        assert!(matches!(
            msg.validate(),
            Err(DeliveryError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_bodies_rejected() {
        let mut msg = message();
        msg.html = None;
        msg.text = Some("".to_string());
        assert!(msg.validate().is_err());
    }

    #[test]
    fn test_text_only_body_accepted() {
        let mut msg = message();
        msg.html = None;
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn test_address_syntax() {
        assert!(is_valid_address("a@b.com"));
        assert!(is_valid_address("first.last@mail.example.co.uk"));
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("no-at-sign"));
        assert!(!is_valid_address("@example.com"));
        assert!(!is_valid_address("user@"));
        assert!(!is_valid_address("user@localhost"));
        assert!(!is_valid_address("user@.com"));
        assert!(!is_valid_address("user@example.com."));
        assert!(!is_valid_address("two@signs@example.com"));
        assert!(!is_valid_address("spaced user@example.com"));
    }

    #[test]
    fn test_address_length_bound() {
        let local = "a".repeat(MAX_ADDRESS_LENGTH);
        let address = format!("{}@example.com", local);
        assert!(!is_valid_address(&address));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let mut msg = message();
        msg.to = "nobody@nowhere".to_string();
        assert!(msg.validate().is_err());
    }
}
