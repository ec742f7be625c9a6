mod notification_gateway;

pub use notification_gateway::NotificationGateway;
