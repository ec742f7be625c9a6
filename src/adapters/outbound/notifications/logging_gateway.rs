use async_trait::async_trait;
use tracing::info;

use crate::{
    domain::{
        errors::NotificationResult,
        models::{DeliveryAck, EmailMessage},
    },
    ports::notifications::NotificationGateway,
};

/// Gateway that writes emails to the log instead of sending them.
///
/// Used when no email provider is configured.
#[derive(Debug, Clone, Default)]
pub struct LoggingGateway;

impl LoggingGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for LoggingGateway {
    async fn send(&self, message: &EmailMessage) -> NotificationResult<DeliveryAck> {
        info!(
            to = %message.to_address,
            subject = %message.subject,
            body = %message.body,
            "Email not sent, no provider configured"
        );
        Ok(DeliveryAck::default())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
