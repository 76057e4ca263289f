// src/services/notifier.rs

//! Email notification service.
//!
//! Sends a single plaintext message per restock over authenticated SMTP
//! with STARTTLS. Delivery failures are reported to the caller, which logs
//! and moves on; a missed email never blocks status persistence.

use async_trait::async_trait;
use chrono::Local;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{AppError, Result};
use crate::models::{EmailConfig, Item};

/// Outbound notification channel.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Send one notification about an item.
    async fn notify(&self, item: &Item, subject: &str, body: &str) -> Result<()>;
}

/// SMTP-backed notifier.
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn mailbox(address: &str) -> Result<Mailbox> {
        address
            .parse()
            .map_err(|e| AppError::smtp(format!("invalid address '{address}': {e}")))
    }
}

#[async_trait]
impl Notify for SmtpNotifier {
    async fn notify(&self, item: &Item, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(Self::mailbox(&self.config.sender_email)?)
            .to(Self::mailbox(&self.config.recipient_email)?)
            .subject(format!("Stock alert: {subject}"))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::smtp(format!("failed to build message: {e}")))?;

        let credentials = Credentials::new(
            self.config.sender_email.clone(),
            self.config.sender_password.clone(),
        );

        let mailer =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)
                .map_err(|e| AppError::smtp(format!("SMTP relay: {e}")))?
                .port(self.config.smtp_port)
                .credentials(credentials)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| AppError::smtp(format!("SMTP send: {e}")))?;

        log::info!("Notification sent for {}", item.name);
        Ok(())
    }
}

/// Compose the plaintext body for a restock alert.
pub fn restock_body(item: &Item, message: &str) -> String {
    format!(
        "{name} is back in stock!\n\
         \n\
         Item: {name}\n\
         URL: {url}\n\
         Status: {message}\n\
         Time: {time}\n\
         \n\
         Quick link: {url}\n",
        name = item.name,
        url = item.url,
        message = message,
        time = Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restock_body_mentions_item() {
        let item = Item {
            name: "Widget".to_string(),
            url: "https://example.com/widget".to_string(),
        };
        let body = restock_body(&item, "Product is in stock");

        assert!(body.contains("Widget is back in stock!"));
        assert!(body.contains("URL: https://example.com/widget"));
        assert!(body.contains("Status: Product is in stock"));
    }

    #[test]
    fn test_mailbox_rejects_garbage() {
        assert!(SmtpNotifier::mailbox("not an address").is_err());
        assert!(SmtpNotifier::mailbox("user@example.com").is_ok());
    }
}
