//! Error types for the notification lifecycle manager.

use thiserror::Error;

/// Errors surfaced by notification lifecycle operations and the pending
/// queue persistence providers.
///
/// Platform absence is deliberately not represented here: a device without a
/// notification facility is an expected configuration, handled by the no-op
/// platform adapter rather than an error.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The manager was initialized a second time.
    #[error("Notification manager is already initialized.")]
    AlreadyInitialized,

    /// A lifecycle operation was invoked before initialization.
    #[error("Notification manager has not been initialized.")]
    NotInitialized,

    /// A structurally unusable notification record was passed to a
    /// scheduling operation.
    #[error("Invalid notification: {reason}")]
    InvalidNotification { reason: String },

    /// The pending queue could not be read from or written to durable
    /// storage.
    #[error("Pending queue persistence error during '{operation}'.")]
    QueuePersistence {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Catch-all for serialization and other unexpected internal failures.
    #[error("Internal notification error: {0}")]
    Internal(String),
}
