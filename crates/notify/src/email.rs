//! SMTP email notifier via `lettre` with STARTTLS.
//!
//! Without credentials the notifier stays constructible and every send is
//! skipped with an info log.

use lettre::message::header::ContentType;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use joby_core::config::SmtpConfig;

use crate::traits::{Notification, Notifier, NotifyError};

#[derive(Debug)]
struct Smtp {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Sends alert emails via SMTP.
#[derive(Debug)]
pub struct EmailNotifier {
    /// `None` when SMTP credentials are not configured.
    smtp: Option<Smtp>,
}

impl EmailNotifier {
    /// Build an `EmailNotifier` from SMTP configuration.
    ///
    /// The sender defaults to the login user when `from` is unset. Port 465
    /// uses implicit TLS; every other port uses STARTTLS.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let (Some(username), Some(password)) = (&config.username, &config.password) else {
            tracing::info!("SMTP credentials not set, alert emails will be skipped");
            return Ok(Self { smtp: None });
        };

        let from_addr = config.from.as_deref().unwrap_or(username.as_str());
        let from: Mailbox = from_addr
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
        }
        .map_err(|e| NotifyError::Config(e.to_string()))?
        .port(config.port)
        .credentials(Credentials::new(username.clone(), password.clone()));

        Ok(Self {
            smtp: Some(Smtp {
                transport: builder.build(),
                from,
            }),
        })
    }

    /// A notifier that never sends.
    pub fn disabled() -> Self {
        Self { smtp: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp.is_some()
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(smtp) = &self.smtp else {
            tracing::info!(
                recipient = %notification.recipient,
                "skipping email: SMTP not configured"
            );
            return Ok(());
        };

        let to: Mailbox = notification
            .recipient
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let email = Message::builder()
            .from(smtp.from.clone())
            .to(to)
            .subject(&notification.subject)
            .header(ContentType::TEXT_HTML)
            .body(notification.body.clone())
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        smtp.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            channel = "email",
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notification delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp(username: Option<&str>, password: Option<&str>) -> SmtpConfig {
        SmtpConfig {
            server: "smtp.example.com".to_string(),
            port: 587,
            username: username.map(String::from),
            password: password.map(String::from),
            from: None,
        }
    }

    #[test]
    fn missing_credentials_disable_sending() {
        let notifier = EmailNotifier::from_config(&smtp(Some("a@example.com"), None)).unwrap();
        assert!(!notifier.is_enabled());
        let notifier = EmailNotifier::from_config(&smtp(None, None)).unwrap();
        assert!(!notifier.is_enabled());
    }

    #[test]
    fn credentials_enable_sending() {
        let notifier =
            EmailNotifier::from_config(&smtp(Some("alerts@example.com"), Some("pw"))).unwrap();
        assert!(notifier.is_enabled());
        assert_eq!(notifier.channel_name(), "email");
    }

    #[test]
    fn implicit_tls_port() {
        let mut config = smtp(Some("alerts@example.com"), Some("pw"));
        config.port = 465;
        assert!(EmailNotifier::from_config(&config).unwrap().is_enabled());
    }

    #[test]
    fn invalid_sender_is_config_error() {
        let mut config = smtp(Some("not-an-address"), Some("pw"));
        config.from = None;
        let err = EmailNotifier::from_config(&config).unwrap_err().to_string();
        assert!(err.contains("Configuration error"), "got: {err}");
    }

    #[tokio::test]
    async fn disabled_send_is_a_noop() {
        let notifier = EmailNotifier::disabled();
        let note = Notification {
            recipient: "dana@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(notifier.send(&note).await.is_ok());
    }
}
