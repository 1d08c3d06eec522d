//! Mail provider abstractions and implementations

mod brevo;
mod mailjet;
mod resend;
mod traits;

#[cfg(test)]
pub mod mock;

pub use brevo::BrevoProvider;
pub use mailjet::MailjetProvider;
pub use resend::ResendProvider;
pub use traits::*;

#[cfg(test)]
pub use mock::{MockOutcome, MockProvider};
