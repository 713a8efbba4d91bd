use std::sync::Arc;

use axum::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::MailConfig;

/// Outbound mail transport. The domain layer treats it as fire-and-forget;
/// callers decide whether a send failure matters.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Picks the SMTP transport when a host is configured, otherwise the
/// log-only transport.
pub fn from_config(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.smtp_host {
        Some(host) => Ok(Arc::new(SmtpMailer::new(
            host,
            config.smtp_port,
            config.smtp_username.as_deref(),
            config.smtp_password.as_deref(),
            &config.from_address,
        )?)),
        None => {
            info!("SMTP not configured, outbound mail will be logged only");
            Ok(Arc::new(LogMailer))
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        from: &str,
    ) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?.port(port);
        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }
        let from: Mailbox = from.parse()?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Dev-mode transport: logs the message instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%to, %subject, "outbound mail (not sent)");
        info!("\n--- MAIL ---\nTo: {to}\nSubject: {subject}\n\n{body}\n------------");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let result = LogMailer.send("to@example.com", "Hello", "Body").await;
        assert!(result.is_ok());
    }

    #[test]
    fn smtp_mailer_rejects_invalid_from_address() {
        let result = SmtpMailer::new("smtp.example.com", 465, None, None, "not-an-address");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn smtp_mailer_rejects_invalid_recipient() {
        let mailer = SmtpMailer::new("smtp.example.com", 465, None, None, "from@example.com")
            .expect("valid config");
        let result = mailer.send("not-an-address", "Hello", "Body").await;
        assert!(result.is_err());
    }
}
