//! Contact service configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ContactError;

/// How `/send-mail` runs the delivery composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Deliver within the request; the response reflects the outcome
    #[default]
    Inline,
    /// Enqueue and respond immediately; outcomes are only logged
    Background,
}

impl FromStr for DispatchMode {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(DispatchMode::Inline),
            "background" => Ok(DispatchMode::Background),
            other => Err(ContactError::Configuration(format!(
                "invalid dispatch mode '{}', expected 'inline' or 'background'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchMode::Inline => write!(f, "inline"),
            DispatchMode::Background => write!(f, "background"),
        }
    }
}

/// Static configuration for the contact service
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Recipient of admin notifications
    pub admin_email: String,
    /// Display name used in subjects and confirmation bodies
    pub site_name: String,
    pub dispatch: DispatchMode,
}

impl ContactConfig {
    /// Read the contact configuration from `COURIER_*` environment
    /// variables. The admin recipient is mandatory; this is a startup
    /// failure, not a per-request one.
    pub fn from_env() -> Result<Self, ContactError> {
        let admin_email = env_trimmed("COURIER_ADMIN_EMAIL").ok_or_else(|| {
            ContactError::Configuration("COURIER_ADMIN_EMAIL is required".to_string())
        })?;

        if !courier_delivery::message::is_valid_address(&admin_email) {
            return Err(ContactError::Configuration(format!(
                "COURIER_ADMIN_EMAIL is not a valid address: {}",
                admin_email
            )));
        }

        let site_name =
            env_trimmed("COURIER_SITE_NAME").unwrap_or_else(|| "Courier".to_string());

        let dispatch = match env_trimmed("COURIER_DISPATCH") {
            Some(value) => value.parse()?,
            None => DispatchMode::default(),
        };

        Ok(Self {
            admin_email,
            site_name,
            dispatch,
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_mode_parsing() {
        assert_eq!(
            "inline".parse::<DispatchMode>().unwrap(),
            DispatchMode::Inline
        );
        assert_eq!(
            " Background ".parse::<DispatchMode>().unwrap(),
            DispatchMode::Background
        );
        assert!("threads".parse::<DispatchMode>().is_err());
    }

    #[test]
    fn test_dispatch_mode_default() {
        assert_eq!(DispatchMode::default(), DispatchMode::Inline);
    }

    #[test]
    fn test_dispatch_mode_display() {
        assert_eq!(DispatchMode::Inline.to_string(), "inline");
        assert_eq!(DispatchMode::Background.to_string(), "background");
    }
}
