use bon::Builder;

use crate::domain::value_objects::PackageCode;

/// A single outbound email
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct EmailMessage {
    #[builder(into)]
    pub to_address: String,
    #[builder(into)]
    pub to_name: String,
    #[builder(into)]
    pub subject: String,
    #[builder(into)]
    pub body: String,
}

impl EmailMessage {
    /// The dispatch notice sent to the sender when a package is registered
    pub fn package_dispatched(
        code: &PackageCode,
        to_address: impl Into<String>,
        to_name: impl Into<String>,
    ) -> Self {
        EmailMessage::builder()
            .to_address(to_address)
            .to_name(to_name)
            .subject("Your package was dispatched.")
            .body(format!("Your package with code {} was dispatched.", code))
            .build()
    }
}

/// Provider acknowledgement of an accepted email
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryAck {
    pub message_id: Option<String>,
}
