mod notification_dispatcher;
mod package_service_impl;
mod retry;

pub use notification_dispatcher::{deliver_with_retry, DispatchConfig, NotificationDispatcher};
pub use package_service_impl::PackageServiceImpl;
pub use retry::RetryConfig;
