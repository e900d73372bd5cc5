use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message as MailMessage, Tokio1Executor};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::notify::{Notifier, NotifyError};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends plain-text mail over SMTPS (implicit TLS, port 465).
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(cfg: &Config) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&cfg.email_from)?;
        let to = parse_mailbox(&cfg.email_to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                cfg.email_from.clone(),
                cfg.app_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { transport, from, to })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Builds the plain-text message. Split out so the headers can be checked
/// without a transport.
fn build_message(
    from: &Mailbox,
    to: &Mailbox,
    subject: &str,
    body: &str,
) -> Result<MailMessage, NotifyError> {
    MailMessage::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| NotifyError::Message(e.to_string()))
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&mut self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let msg = build_message(&self.from, &self.to, subject, body)?;
        self.transport
            .send(msg)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        info!("Email sent successfully: {}", subject);
        Ok(())
    }
}
