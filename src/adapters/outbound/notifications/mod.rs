mod logging_gateway;
mod sendgrid_gateway;

pub use logging_gateway::LoggingGateway;
pub use sendgrid_gateway::{SendGridConfig, SendGridGateway, DEFAULT_SENDGRID_BASE_URL};
