use async_trait::async_trait;
use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{AvailabilityNotice, Notifier};
use crate::config::MailConfig;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl EmailConfig {
    pub fn from_mail_config(config: &MailConfig) -> Result<Self> {
        let username = config
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Validation("Missing SMTP username".to_string()))?;
        let password = config
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Missing SMTP password".to_string()))?;

        Ok(EmailConfig {
            smtp_server: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
            username,
            password,
            from_name: config.from_name.clone(),
            use_tls: config.use_tls,
        })
    }
}

/// Sends plain-text notices over SMTP, one authenticated connection per message.
pub struct EmailNotifier {
    config: EmailConfig,
    sender: Mailbox,
}

impl EmailNotifier {
    /// Fails immediately when the sender address or credentials are unusable.
    pub fn new(config: EmailConfig) -> Result<Self> {
        let sender = Mailbox::new(Some(config.from_name.clone()), config.username.parse()?);
        Ok(EmailNotifier { config, sender })
    }

    pub fn from_mail_config(config: &MailConfig) -> Result<Self> {
        Self::new(EmailConfig::from_mail_config(config)?)
    }

    fn build_message(&self, recipient: &str, notice: &AvailabilityNotice) -> Result<Message> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, recipient.parse()?))
            .subject(notice.subject.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(notice.body.clone())?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let builder = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_server)
        };

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, recipient: &str, notice: &AvailabilityNotice) -> Result<()> {
        let email = self.build_message(recipient, notice)?;
        let mailer = self.transport()?;

        let response = mailer.send(email).await?;
        debug!(
            "SMTP accepted message for {} ({})",
            recipient,
            response.code()
        );
        Ok(())
    }
}
