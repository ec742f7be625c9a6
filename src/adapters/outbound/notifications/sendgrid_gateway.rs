use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    domain::{
        errors::{NotificationError, NotificationResult},
        models::{DeliveryAck, EmailMessage},
    },
    ports::notifications::NotificationGateway,
};

pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

/// Connection settings for the SendGrid v3 mail API
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub base_url: String,
    pub from_email: String,
    pub from_name: String,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl SendGridConfig {
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_SENDGRID_BASE_URL.to_string(),
            from_email: from_email.into(),
            from_name: from_name.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

/// Notification gateway backed by SendGrid's `/v3/mail/send` endpoint
#[derive(Debug, Clone)]
pub struct SendGridGateway {
    client: Client,
    config: SendGridConfig,
}

impl SendGridGateway {
    pub fn new(config: SendGridConfig) -> NotificationResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::Permanent {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.config.base_url.trim_end_matches('/'))
    }
}

/// Statuses worth retrying: timeouts, rate limits and server errors
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

#[async_trait]
impl NotificationGateway for SendGridGateway {
    async fn send(&self, message: &EmailMessage) -> NotificationResult<DeliveryAck> {
        let payload = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: &message.to_address,
                    name: &message.to_name,
                }],
            }],
            from: Address {
                email: &self.config.from_email,
                name: &self.config.from_name,
            },
            subject: &message.subject,
            content: vec![Content {
                content_type: "text/plain",
                value: &message.body,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Transient {
                message: format!("SendGrid request failed: {}", e),
            })?;

        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            let message_id = response
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            debug!(status, message_id = ?message_id, "SendGrid accepted message");
            return Ok(DeliveryAck { message_id });
        }

        let body = response.text().await.unwrap_or_default();
        let message = format!("SendGrid returned {}: {}", status, body);

        if is_retryable_status(status) {
            Err(NotificationError::Transient { message })
        } else {
            Err(NotificationError::Permanent { message })
        }
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}
