use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    adapters::outbound::{
        notifications::{LoggingGateway, SendGridConfig, SendGridGateway},
        persistence::{InMemoryPackageRepository, SqlPackageRepository},
    },
    ports::{notifications::NotificationGateway, repositories::PackageRepository},
    services::{DispatchConfig, NotificationDispatcher, PackageServiceImpl},
};

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub repository_backend: RepositoryBackend,
    pub notification_backend: NotificationBackend,
    pub dispatch: DispatchConfig,
}

/// Repository backend configuration
#[derive(Debug, Clone, Default)]
pub enum RepositoryBackend {
    #[default]
    InMemory,
    Sqlite { database_url: String },
}

/// Where dispatch emails go
#[derive(Debug, Clone, Default)]
pub enum NotificationBackend {
    /// Write messages to the log instead of sending them
    #[default]
    Log,
    SendGrid(SendGridConfig),
}

/// Application dependencies container
pub struct AppDependencies {
    pub repository: Arc<dyn PackageRepository>,
    pub gateway: Arc<dyn NotificationGateway>,
}

/// Application services container
pub struct AppServices {
    pub package_service: PackageServiceImpl,
    /// Completes once every service handle is dropped and queued emails are flushed
    pub notification_worker: JoinHandle<()>,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_notification_backend(mut self, backend: NotificationBackend) -> Self {
        self.config.notification_backend = backend;
        self
    }

    pub fn with_dispatch_config(mut self, dispatch: DispatchConfig) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Build the application services. Must run inside a Tokio runtime.
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;

        let (dispatcher, notification_worker) =
            NotificationDispatcher::spawn(deps.gateway, self.config.dispatch.clone());

        Ok(AppServices {
            package_service: PackageServiceImpl::new(deps.repository, dispatcher),
            notification_worker,
        })
    }

    /// Build just the outbound adapters
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        Ok(AppDependencies {
            repository: self.create_repository().await?,
            gateway: self.create_gateway()?,
        })
    }

    async fn create_repository(&self) -> Result<Arc<dyn PackageRepository>, AppError> {
        match &self.config.repository_backend {
            RepositoryBackend::InMemory => Ok(Arc::new(InMemoryPackageRepository::new())),
            RepositoryBackend::Sqlite { database_url } => {
                let repo = SqlPackageRepository::connect(database_url)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to {}: {}", database_url, e),
                    })?;
                repo.migrate().await.map_err(|e| AppError::RepositoryInit {
                    message: format!("Failed to run migrations: {}", e),
                })?;

                info!(database_url = %database_url, "SQLite package repository ready");
                Ok(Arc::new(repo))
            }
        }
    }

    fn create_gateway(&self) -> Result<Arc<dyn NotificationGateway>, AppError> {
        match &self.config.notification_backend {
            NotificationBackend::Log => Ok(Arc::new(LoggingGateway::new())),
            NotificationBackend::SendGrid(config) => {
                if config.api_key.trim().is_empty() {
                    return Err(AppError::Configuration {
                        message: "SendGrid API key must not be empty".to_string(),
                    });
                }
                let gateway =
                    SendGridGateway::new(config.clone()).map_err(|e| AppError::NotificationInit {
                        message: e.to_string(),
                    })?;
                Ok(Arc::new(gateway))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },

    #[error("Notification initialization error: {message}")]
    NotificationInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_repository_backend(RepositoryBackend::InMemory)
        .with_notification_backend(NotificationBackend::Log)
        .build()
        .await
}

/// Create a SQLite-backed application that logs notifications
pub async fn create_sqlite_app(database_url: impl Into<String>) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_repository_backend(RepositoryBackend::Sqlite {
            database_url: database_url.into(),
        })
        .with_notification_backend(NotificationBackend::Log)
        .build()
        .await
}
