pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Models
    AddUpdateRequest,
    CreatePackageRequest,
    DeliveryAck,
    EmailMessage,
    // Errors
    NotificationError,
    Package,
    PackageError,
    PackageUpdate,
    ValidationError,
    // Value objects
    PackageCode,
    PackageTitle,
};

// Port types - interfaces for external systems
pub use ports::{NotificationGateway, PackageRepository, PackageService};

// Service implementations - business logic
pub use services::{DispatchConfig, NotificationDispatcher, PackageServiceImpl, RetryConfig};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppDependencies, AppError, AppServices, NotificationBackend,
    RepositoryBackend, create_in_memory_app, create_sqlite_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    notifications::{LoggingGateway, SendGridConfig, SendGridGateway},
    persistence::{InMemoryPackageRepository, SqlPackageRepository},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AppBuilder, AppServices, InMemoryPackageRepository, NotificationGateway, PackageCode,
        PackageRepository, PackageService, PackageServiceImpl, PackageTitle, SqlPackageRepository,
        create_in_memory_app, create_sqlite_app,
    };
}
