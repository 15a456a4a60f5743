//! Pending-queue persistence providers.
//!
//! The queue is persisted as a pretty-printed TOML document containing one
//! `notifications` array. Only the durable field set is written: id, title,
//! body, subtitle, channel, badge number and delivery time. Optional values
//! are preserved as present or absent, never coerced to sentinel values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::NotificationError;
use crate::persistence_iface::PendingQueueProvider;
use crate::platform::PlatformAdapter;
use crate::types::{NotificationRecord, PendingEntry};

/// The durable projection of one pending notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<DateTime<Utc>>,
}

impl PersistedNotification {
    /// Projects a pending entry onto the durable field set.
    pub fn from_entry(entry: &PendingEntry) -> Self {
        let notification = &entry.notification;
        PersistedNotification {
            id: notification.id,
            title: notification.title.clone(),
            body: notification.body.clone(),
            subtitle: notification.subtitle.clone(),
            channel: notification.channel.clone(),
            badge_number: notification.badge_number,
            delivery_time: notification.delivery_time,
        }
    }

    /// Overlays the persisted fields onto a factory-fresh record.
    pub fn apply_to(&self, notification: &mut NotificationRecord) {
        notification.id = self.id;
        notification.title = self.title.clone();
        notification.body = self.body.clone();
        notification.subtitle = self.subtitle.clone();
        notification.channel = self.channel.clone();
        notification.badge_number = self.badge_number;
        notification.delivery_time = self.delivery_time;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedQueue {
    #[serde(default)]
    notifications: Vec<PersistedNotification>,
}

fn records_from_queue(
    queue: PersistedQueue,
    adapter: &dyn PlatformAdapter,
) -> Vec<NotificationRecord> {
    queue
        .notifications
        .iter()
        .map(|persisted| {
            let mut record = adapter.create_notification();
            persisted.apply_to(&mut record);
            record
        })
        .collect()
}

/// Stores the pending queue as a TOML file on the local filesystem.
pub struct FilesystemPendingQueueProvider {
    path: PathBuf,
}

impl FilesystemPendingQueueProvider {
    /// Creates a provider backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PendingQueueProvider for FilesystemPendingQueueProvider {
    fn save(&self, entries: &[PendingEntry]) -> Result<(), NotificationError> {
        let queue = PersistedQueue {
            notifications: entries.iter().map(PersistedNotification::from_entry).collect(),
        };
        let toml_string = toml::to_string_pretty(&queue).map_err(|e| {
            NotificationError::Internal(format!("Pending queue serialization failed: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| NotificationError::QueuePersistence {
                operation: "save".to_string(),
                source,
            })?;
        }
        fs::write(&self.path, toml_string).map_err(|source| {
            NotificationError::QueuePersistence {
                operation: "save".to_string(),
                source,
            }
        })?;
        info!(
            "Persisted {} pending notification(s) to {}",
            queue.notifications.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(
        &self,
        adapter: &dyn PlatformAdapter,
    ) -> Result<Option<Vec<NotificationRecord>>, NotificationError> {
        let toml_string = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No pending notification queue at {}; treating as no prior data",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(NotificationError::QueuePersistence {
                    operation: "load".to_string(),
                    source,
                })
            }
        };

        let queue: PersistedQueue = toml::from_str(&toml_string).map_err(|e| {
            NotificationError::Internal(format!("Pending queue deserialization failed: {}", e))
        })?;
        Ok(Some(records_from_queue(queue, adapter)))
    }
}

/// Keeps the serialized queue in memory.
///
/// Useful for tests and for hosts without durable storage. Distinguishes a
/// never-saved queue (`load` yields `None`) from a saved-but-empty one.
#[derive(Debug, Default)]
pub struct InMemoryPendingQueueProvider {
    stored: Mutex<Option<Vec<PersistedNotification>>>,
}

impl InMemoryPendingQueueProvider {
    /// Creates a provider with no stored queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently stored queue projection, if any.
    pub fn stored_queue(&self) -> Option<Vec<PersistedNotification>> {
        self.stored.lock().unwrap().clone()
    }
}

impl PendingQueueProvider for InMemoryPendingQueueProvider {
    fn save(&self, entries: &[PendingEntry]) -> Result<(), NotificationError> {
        let mut stored = self.stored.lock().unwrap();
        *stored = Some(entries.iter().map(PersistedNotification::from_entry).collect());
        Ok(())
    }

    fn load(
        &self,
        adapter: &dyn PlatformAdapter,
    ) -> Result<Option<Vec<NotificationRecord>>, NotificationError> {
        let stored = self.stored.lock().unwrap();
        Ok(stored.as_ref().map(|notifications| {
            records_from_queue(
                PersistedQueue {
                    notifications: notifications.clone(),
                },
                adapter,
            )
        }))
    }
}
