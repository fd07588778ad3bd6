//! # lms-mail
//!
//! Outbound email. With SMTP configured, messages go through an async
//! `lettre` transport; otherwise they are logged (without secrets) and
//! dropped so development setups work without a mail server.

pub mod error;
pub mod welcome;

pub use error::MailError;
pub use welcome::WelcomeEmail;

use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use lms_config::SmtpConfig;

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    Log,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smtp { from, .. } => f.debug_struct("Smtp").field("from", from).finish_non_exhaustive(),
            Self::Log => f.write_str("Log"),
        }
    }
}

impl Mailer {
    /// Build the mailer for `config`. An unconfigured SMTP section yields
    /// [`Mailer::Log`]. `secure` selects implicit TLS; otherwise STARTTLS is
    /// used.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the sender address or relay host is invalid.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        if !config.is_configured() {
            tracing::warn!("SMTP not configured; outgoing email will be logged only");
            return Ok(Self::Log);
        }

        let from = parse_mailbox(&config.from)?;
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        tracing::info!(host = %config.host, port = config.port, secure = config.secure, "SMTP mailer ready");
        Ok(Self::Smtp { transport, from })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Smtp { .. })
    }

    /// Send a plain-text email.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the recipient is invalid or delivery fails.
    pub async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        match self {
            Self::Log => {
                tracing::info!(to, subject, "email not sent (SMTP not configured)");
                Ok(())
            }
            Self::Smtp { transport, from } => {
                let message = Message::builder()
                    .from(from.clone())
                    .to(parse_mailbox(to)?)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body)?;
                transport.send(message).await?;
                tracing::info!(to, subject, "email sent");
                Ok(())
            }
        }
    }

    /// Send the welcome email for an admin-created account.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the email cannot be built or delivered.
    pub async fn send_welcome(&self, to: &str, email: &WelcomeEmail) -> Result<(), MailError> {
        self.send(to, &email.subject(), email.body()).await
    }
}
