//! Outbound services used by route handlers.
//!
//! - `email` - transactional email relay over SMTP

pub mod email;

pub use email::{EmailError, Mailer, SmtpMailer};
