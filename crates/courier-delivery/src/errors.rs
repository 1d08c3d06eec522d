//! Error types for the delivery engine

use thiserror::Error;

/// Upper bound on captured provider error text, in bytes.
///
/// Provider error bodies are free-form and occasionally enormous; attempt
/// records keep at most this much for diagnostics.
pub const MAX_ERROR_TEXT: usize = 512;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Truncate free-form provider text to [`MAX_ERROR_TEXT`] bytes on a char
/// boundary.
pub(crate) fn bounded_text(text: &str) -> String {
    if text.len() <= MAX_ERROR_TEXT {
        return text.to_string();
    }
    let mut end = MAX_ERROR_TEXT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
