use std::fmt;

use async_trait::async_trait;
use nai_core::{ContactMessage, ContactNotifier, Error, Result};
use reqwest::Client;
use serde::Serialize;

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
pub const DEFAULT_SENDER: &str = "News AI <onboarding@resend.dev>";

#[derive(Clone)]
pub struct NotificationConfig {
    pub api_key: String,
    pub recipient: String,
    pub sender: String,
    pub endpoint: String,
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("api_key", &"[REDACTED]")
            .field("recipient", &self.recipient)
            .field("sender", &self.sender)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl NotificationConfig {
    /// Notifications are enabled only when both the key and the recipient
    /// are set.
    pub fn from_parts(api_key: Option<String>, recipient: Option<String>) -> Option<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty())?;
        let recipient = recipient.filter(|r| !r.trim().is_empty())?;
        Some(Self {
            api_key,
            recipient,
            sender: DEFAULT_SENDER.to_string(),
            endpoint: RESEND_ENDPOINT.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: String,
    text: String,
}

pub fn email_subject(contact: &ContactMessage) -> String {
    format!("New Contact: {}", contact.name)
}

pub fn email_body(contact: &ContactMessage) -> String {
    format!(
        "New contact form submission\n\nName: {}\nEmail: {}\nReceived: {}\n\nMessage:\n{}\n",
        contact.name,
        contact.email,
        contact.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        contact.message
    )
}

/// Sends contact messages through the Resend email API.
pub struct ResendNotifier {
    client: Client,
    config: NotificationConfig,
}

impl fmt::Debug for ResendNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendNotifier")
            .field("config", &self.config)
            .finish()
    }
}

impl ResendNotifier {
    pub fn new(config: NotificationConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ContactNotifier for ResendNotifier {
    async fn notify(&self, contact: &ContactMessage) -> Result<()> {
        let request = EmailRequest {
            from: &self.config.sender,
            to: [&self.config.recipient],
            reply_to: &contact.email,
            subject: email_subject(contact),
            text: email_body(contact),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("Email notification failed: {}", message),
            });
        }

        tracing::info!("📧 Contact notification sent for message {}", contact.id);
        Ok(())
    }
}
