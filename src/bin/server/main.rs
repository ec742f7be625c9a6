use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use package_tracker::{
    adapters::{
        inbound::http::router::{AppState, create_router},
        outbound::notifications::{DEFAULT_SENDGRID_BASE_URL, SendGridConfig},
    },
    app::{AppBuilder, AppConfig, AppServices, NotificationBackend, RepositoryBackend},
    services::{DispatchConfig, RetryConfig},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "package-tracker-server")]
#[command(about = "HTTP API for registering and tracking packages", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Repository backend type (memory or sqlite)
    #[arg(long, env = "REPOSITORY_BACKEND", default_value = "memory")]
    repository_backend: String,

    /// Database URL for the sqlite backend, e.g. sqlite://packages.db
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// SendGrid API key; dispatch emails are only logged when unset
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    sendgrid_api_key: Option<String>,

    /// SendGrid API base URL
    #[arg(long, env = "SENDGRID_BASE_URL", default_value = DEFAULT_SENDGRID_BASE_URL)]
    sendgrid_base_url: String,

    /// Sender address for dispatch emails
    #[arg(long, env = "SENDGRID_FROM_EMAIL", default_value = "noreply@package-tracker.local")]
    sendgrid_from_email: String,

    /// Sender display name for dispatch emails
    #[arg(long, env = "SENDGRID_FROM_NAME", default_value = "Package Tracker")]
    sendgrid_from_name: String,

    /// Emails that may wait in the notification queue
    #[arg(long, env = "NOTIFY_QUEUE_CAPACITY", default_value = "1024")]
    notify_queue_capacity: usize,

    /// Concurrent email deliveries
    #[arg(long, env = "NOTIFY_MAX_IN_FLIGHT", default_value = "8")]
    notify_max_in_flight: usize,

    /// Delivery attempts per email, including the first
    #[arg(long, env = "NOTIFY_MAX_ATTEMPTS", default_value = "5")]
    notify_max_attempts: u32,

    /// Timeout for a single delivery attempt, in seconds
    #[arg(long, env = "NOTIFY_TIMEOUT_SECS", default_value = "10")]
    notify_timeout_secs: u64,

    /// Time allowed for queued emails to flush on shutdown, in seconds
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value = "10")]
    shutdown_grace_secs: u64,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormat,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let repository_backend = match self.repository_backend.as_str() {
            "memory" => RepositoryBackend::InMemory,
            "sqlite" => {
                let database_url = self
                    .database_url
                    .clone()
                    .context("DATABASE_URL is required for sqlite backend")?;
                RepositoryBackend::Sqlite { database_url }
            }
            _ => anyhow::bail!("Unknown repository backend: {}", self.repository_backend),
        };

        let notification_backend = match &self.sendgrid_api_key {
            Some(api_key) => NotificationBackend::SendGrid(
                SendGridConfig::new(
                    api_key.clone(),
                    self.sendgrid_from_email.clone(),
                    self.sendgrid_from_name.clone(),
                )
                .with_base_url(self.sendgrid_base_url.clone())
                .with_timeout(Duration::from_secs(self.notify_timeout_secs)),
            ),
            None => NotificationBackend::Log,
        };

        let dispatch = DispatchConfig {
            queue_capacity: self.notify_queue_capacity,
            max_in_flight: self.notify_max_in_flight,
            send_timeout: Duration::from_secs(self.notify_timeout_secs),
            retry: RetryConfig {
                max_attempts: self.notify_max_attempts,
                ..RetryConfig::default()
            },
        };

        Ok(AppConfig {
            repository_backend,
            notification_backend,
            dispatch,
        })
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.log_level)
                .with_context(|| format!("Invalid log level: {}", self.log_level))?,
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        match self.log_format {
            LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?,
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting Package Tracker Server");
    info!("Repository backend: {}", cli.repository_backend);

    let config = cli.to_app_config()?;
    match &config.notification_backend {
        NotificationBackend::Log => info!("Notification backend: log"),
        NotificationBackend::SendGrid(sendgrid) => {
            info!(base_url = %sendgrid.base_url, "Notification backend: sendgrid")
        }
    }

    let AppServices {
        package_service,
        notification_worker,
    } = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    let state = AppState {
        package_service: Arc::new(package_service),
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router held the last service handle, so the worker now drains and exits
    let grace = Duration::from_secs(cli.shutdown_grace_secs);
    match tokio::time::timeout(grace, notification_worker).await {
        Ok(Ok(())) => info!("Notification queue drained"),
        Ok(Err(e)) => warn!(error = %e, "Notification worker failed"),
        Err(_) => warn!(
            grace_secs = cli.shutdown_grace_secs,
            "Notification queue not drained before shutdown"
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "package-tracker-server",
            "--port",
            "8080",
            "--repository-backend",
            "sqlite",
            "--database-url",
            "sqlite://packages.db",
            "--log-format",
            "json",
        ]);

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.repository_backend, "sqlite");
        assert_eq!(cli.database_url, Some("sqlite://packages.db".to_string()));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_memory_config() {
        let cli = Cli::parse_from(["package-tracker-server", "--repository-backend", "memory"]);

        let config = cli.to_app_config().unwrap();
        assert!(matches!(config.repository_backend, RepositoryBackend::InMemory));
    }

    #[test]
    fn test_sqlite_requires_database_url() {
        let mut cli = Cli::parse_from(["package-tracker-server", "--repository-backend", "sqlite"]);
        cli.database_url = None;

        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let cli = Cli::parse_from(["package-tracker-server", "--repository-backend", "postgres"]);

        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_sendgrid_config() {
        let cli = Cli::parse_from([
            "package-tracker-server",
            "--sendgrid-api-key",
            "SG.key",
            "--sendgrid-base-url",
            "http://localhost:9000",
            "--notify-max-attempts",
            "3",
            "--notify-timeout-secs",
            "2",
        ]);

        let config = cli.to_app_config().unwrap();
        match config.notification_backend {
            NotificationBackend::SendGrid(sendgrid) => {
                assert_eq!(sendgrid.api_key, "SG.key");
                assert_eq!(sendgrid.base_url, "http://localhost:9000");
            }
            NotificationBackend::Log => panic!("Expected SendGrid backend"),
        }
        assert_eq!(config.dispatch.retry.max_attempts, 3);
        assert_eq!(config.dispatch.send_timeout, Duration::from_secs(2));
    }
}
