use crate::domain::{
    errors::NotificationResult,
    models::{DeliveryAck, EmailMessage},
};
use async_trait::async_trait;

/// Outbound port for an email provider.
///
/// Implementations report failures as `Transient` or `Permanent`; retry policy
/// belongs to the caller.
#[async_trait]
pub trait NotificationGateway: Send + Sync + 'static {
    /// Send one email
    async fn send(&self, message: &EmailMessage) -> NotificationResult<DeliveryAck>;

    /// Short provider name used in logs
    fn name(&self) -> &'static str;
}
