//! Contact form request and response types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ContactError;

/// Source label applied when the form does not send one
pub const DEFAULT_SOURCE: &str = "Website Enquiry";

/// Raw `/send-mail` request body.
///
/// Every field is optional at the wire level so that missing fields
/// produce the contact API's own 400 response instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendMailRequestBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
}

/// A validated, trimmed contact form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub source: String,
}

impl ContactSubmission {
    /// Validate and normalize a raw request body.
    ///
    /// Name, email and message are required after trimming; phone is
    /// optional; a blank or missing source falls back to
    /// [`DEFAULT_SOURCE`].
    pub fn from_request(body: SendMailRequestBody) -> Result<Self, ContactError> {
        let name = trimmed(body.name);
        let email = trimmed(body.email);
        let message = trimmed(body.message);

        let (Some(name), Some(email), Some(message)) = (name, email, message) else {
            return Err(ContactError::InvalidSubmission(
                "Missing required fields".to_string(),
            ));
        };

        if !courier_delivery::message::is_valid_address(&email) {
            return Err(ContactError::InvalidSubmission(
                "Invalid email address".to_string(),
            ));
        }

        Ok(Self {
            name,
            email,
            phone: trimmed(body.phone),
            message,
            source: trimmed(body.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
    }

    /// Phone number for display, with the original's fallback text
    pub fn phone_display(&self) -> &str {
        self.phone.as_deref().unwrap_or("Not provided")
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `/send-mail` response body, same shape for every status code
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMailResponse {
    pub success: bool,
    pub admin_email_sent: bool,
    pub client_email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendMailResponse {
    pub fn sent(client_email_sent: bool) -> Self {
        Self {
            success: true,
            admin_email_sent: true,
            client_email_sent,
            error: None,
        }
    }

    /// Background dispatch accepted; no delivery has happened yet and
    /// the client is not notified of the outcome.
    pub fn accepted() -> Self {
        Self {
            success: true,
            admin_email_sent: false,
            client_email_sent: false,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            admin_email_sent: false,
            client_email_sent: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(
        name: Option<&str>,
        email: Option<&str>,
        message: Option<&str>,
    ) -> SendMailRequestBody {
        SendMailRequestBody {
            name: name.map(String::from),
            email: email.map(String::from),
            phone: None,
            message: message.map(String::from),
            source: None,
        }
    }

    #[test]
    fn test_valid_submission_trims_fields() {
        let submission = ContactSubmission::from_request(SendMailRequestBody {
            name: Some("  Ada Lovelace ".to_string()),
            email: Some(" ada@example.com ".to_string()),
            phone: Some("  ".to_string()),
            message: Some(" Hello there ".to_string()),
            source: None,
        })
        .unwrap();

        assert_eq!(submission.name, "Ada Lovelace");
        assert_eq!(submission.email, "ada@example.com");
        assert_eq!(submission.phone, None);
        assert_eq!(submission.message, "Hello there");
        assert_eq!(submission.source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_missing_required_fields() {
        for body in [
            body(None, Some("a@b.com"), Some("hi")),
            body(Some("Ada"), None, Some("hi")),
            body(Some("Ada"), Some("a@b.com"), None),
            body(Some("   "), Some("a@b.com"), Some("hi")),
        ] {
            let result = ContactSubmission::from_request(body);
            assert!(matches!(result, Err(ContactError::InvalidSubmission(_))));
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = ContactSubmission::from_request(body(
            Some("Ada"),
            Some("not-an-address"),
            Some("hi"),
        ));
        assert!(matches!(result, Err(ContactError::InvalidSubmission(_))));
    }

    #[test]
    fn test_explicit_source_kept() {
        let mut raw = body(Some("Ada"), Some("a@b.com"), Some("hi"));
        raw.source = Some("Portfolio Submission".to_string());
        let submission = ContactSubmission::from_request(raw).unwrap();
        assert_eq!(submission.source, "Portfolio Submission");
    }

    #[test]
    fn test_phone_display_fallback() {
        let mut raw = body(Some("Ada"), Some("a@b.com"), Some("hi"));
        raw.phone = Some("+44 20 1234".to_string());
        let with_phone = ContactSubmission::from_request(raw).unwrap();
        assert_eq!(with_phone.phone_display(), "+44 20 1234");

        let without =
            ContactSubmission::from_request(body(Some("Ada"), Some("a@b.com"), Some("hi")))
                .unwrap();
        assert_eq!(without.phone_display(), "Not provided");
    }

    #[test]
    fn test_response_serialization_omits_null_error() {
        let ok = serde_json::to_value(SendMailResponse::sent(true)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["admin_email_sent"], true);
        assert_eq!(ok["client_email_sent"], true);
        assert!(ok.get("error").is_none());

        let failed = serde_json::to_value(SendMailResponse::failure("boom")).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["error"], "boom");
    }
}
