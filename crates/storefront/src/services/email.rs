//! Transactional email relay.
//!
//! The notification endpoint hands over a finished HTML body; no templates
//! are rendered here. [`Mailer`] is the seam tests replace.

use async_trait::async_trait;
use kirana_core::Email;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Mail relay credentials are not configured.
    #[error("Email delivery is not configured")]
    NotConfigured,

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Something that can deliver an HTML email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single-part HTML message.
    async fn send_html(&self, to: &Email, subject: &str, html: &str) -> Result<(), EmailError>;
}

/// SMTP mailer using STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or the sender address
    /// does not parse.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { transport, from })
    }
}

/// Build the HTML message.
fn build_message(
    from: Mailbox,
    to: &Email,
    subject: &str,
    html: &str,
) -> Result<Message, EmailError> {
    let to: Mailbox = to
        .as_str()
        .parse()
        .map_err(|_| EmailError::InvalidAddress(to.to_string()))?;

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html.to_string()),
        )?)
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, html), fields(to = %to))]
    async fn send_html(&self, to: &Email, subject: &str, html: &str) -> Result<(), EmailError> {
        let message = build_message(self.from.clone(), to, subject, html)?;
        self.transport.send(message).await?;

        tracing::info!(subject = %subject, "Email sent successfully");
        Ok(())
    }
}
