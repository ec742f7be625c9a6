pub mod notifications;
pub mod repositories;
pub mod services;

// Re-export all port traits for convenience
pub use notifications::NotificationGateway;
pub use repositories::PackageRepository;
pub use services::PackageService;
