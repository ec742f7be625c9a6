use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::{
    domain::{
        errors::{NotificationError, NotificationResult},
        models::{DeliveryAck, EmailMessage},
    },
    ports::notifications::NotificationGateway,
    services::retry::{ExponentialBackoff, RetryConfig},
};

/// Settings for the notification queue and its worker
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Messages that may wait in the queue before `enqueue` reports `QueueFull`
    pub queue_capacity: usize,
    /// Deliveries running concurrently
    pub max_in_flight: usize,
    /// Budget for a single gateway call
    pub send_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_in_flight: 8,
            send_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

/// Handle to the background notification queue.
///
/// Cloning is cheap. The worker exits after every handle has been dropped and
/// in-flight deliveries have finished.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<EmailMessage>,
}

impl NotificationDispatcher {
    /// Start the worker on the current Tokio runtime
    pub fn spawn(
        gateway: Arc<dyn NotificationGateway>,
        config: DispatchConfig,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let handle = tokio::spawn(run_worker(receiver, gateway, config));
        (Self { sender }, handle)
    }

    /// Queue a message without waiting
    pub fn enqueue(&self, message: EmailMessage) -> NotificationResult<()> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotificationError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => NotificationError::QueueClosed,
        })
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<EmailMessage>,
    gateway: Arc<dyn NotificationGateway>,
    config: DispatchConfig,
) {
    let limiter = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
    let mut in_flight = JoinSet::new();

    info!(gateway = gateway.name(), "Notification worker started");

    while let Some(message) = receiver.recv().await {
        let permit = match limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let gateway = gateway.clone();
        let send_timeout = config.send_timeout;
        let retry = config.retry.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            if let Err(e) =
                deliver_with_retry(gateway.as_ref(), &message, send_timeout, &retry).await
            {
                error!(
                    gateway = gateway.name(),
                    subject = %message.subject,
                    error = %e,
                    "Dropping notification"
                );
            }
        });

        // Reap finished deliveries so the set does not grow unbounded
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}

    info!("Notification worker stopped");
}

/// Send a message, retrying transient failures with exponential backoff.
///
/// Each gateway call is bounded by `send_timeout`; a timeout counts as transient.
pub async fn deliver_with_retry(
    gateway: &dyn NotificationGateway,
    message: &EmailMessage,
    send_timeout: Duration,
    retry: &RetryConfig,
) -> NotificationResult<DeliveryAck> {
    let mut backoff = ExponentialBackoff::new(retry);

    loop {
        let outcome = match tokio::time::timeout(send_timeout, gateway.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout(send_timeout)),
        };

        match outcome {
            Ok(ack) => {
                debug!(
                    gateway = gateway.name(),
                    message_id = ?ack.message_id,
                    attempts = backoff.attempt + 1,
                    "Notification delivered"
                );
                return Ok(ack);
            }
            Err(e) if e.is_transient() => {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(
                        gateway = gateway.name(),
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        attempt = backoff.attempt,
                        "Transient notification failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}
