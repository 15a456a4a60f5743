//! Cross-platform local-notification scheduling.
//!
//! This crate provides a lifecycle manager for application-local
//! notifications: it queues, defers, persists, and reconciles notification
//! requests against an underlying OS-level notification facility,
//! normalizing divergent platform semantics (immediate-delivery vs.
//! deferred-queue platforms, badge-number conventions, channel models) into
//! one coherent lifecycle.
//!
//! The host application constructs one [`DefaultNotificationManager`] with
//! an [`OperatingMode`] and a [`PlatformAdapter`] implementation, calls
//! [`NotificationManager::initialize`] once, and then drives the manager
//! with per-frame [`NotificationManager::tick`] calls and
//! [`NotificationManager::application_focus_changed`] on focus transitions.

pub mod errors;
pub mod events;
pub mod manager;
pub mod persistence;
pub mod persistence_iface;
pub mod platform;
pub mod types;

// Re-export primary error type
pub use errors::NotificationError;

// Re-export the lifecycle manager surface
pub use manager::{DefaultNotificationManager, NotificationManager};

// Re-export event registry types
pub use events::{Signal, SubscriptionId};

// Re-export capability contracts and their bundled implementations
pub use persistence::{
    FilesystemPendingQueueProvider, InMemoryPendingQueueProvider, PersistedNotification,
};
pub use persistence_iface::PendingQueueProvider;
pub use platform::{NullPlatformAdapter, PlatformAdapter};

// Re-export the data model
pub use types::{
    ChannelImportance, NotificationChannel, NotificationRecord, OperatingMode, PendingEntry,
};
