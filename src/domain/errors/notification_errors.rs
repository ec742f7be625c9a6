use std::time::Duration;

/// Errors from sending or queueing a notification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotificationError {
    /// Failure that may succeed when retried (timeouts, rate limits, 5xx)
    #[error("Transient notification failure: {message}")]
    Transient { message: String },

    /// Failure that will not succeed on retry (bad request, rejected credentials)
    #[error("Permanent notification failure: {message}")]
    Permanent { message: String },

    /// Gateway call exceeded its time budget
    #[error("Notification gateway timed out after {0:?}")]
    Timeout(Duration),

    #[error("Notification queue is full")]
    QueueFull,

    #[error("Notification queue is closed")]
    QueueClosed,
}

impl NotificationError {
    /// Whether a retry could change the outcome
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NotificationError::Transient { .. } | NotificationError::Timeout(_)
        )
    }
}

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;
