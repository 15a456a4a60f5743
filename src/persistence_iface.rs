//! Persistence capability contract for the pending notification queue.

use crate::errors::NotificationError;
use crate::platform::PlatformAdapter;
use crate::types::{NotificationRecord, PendingEntry};

/// Durable storage for the pending notification queue.
///
/// `save` has overwrite semantics: the stored queue is replaced wholesale on
/// every call. `load` reconstructs records through the platform adapter's
/// default-object factory and overlays the persisted fields, so records come
/// back carrying platform defaults for everything that is not persisted.
pub trait PendingQueueProvider: Send + Sync {
    /// Replaces the stored queue with `entries`.
    fn save(&self, entries: &[PendingEntry]) -> Result<(), NotificationError>;

    /// Loads the stored queue, or `Ok(None)` when no prior data exists.
    ///
    /// An empty-but-present stored queue loads as `Ok(Some(vec![]))`; `None`
    /// is reserved for "never saved".
    fn load(
        &self,
        adapter: &dyn PlatformAdapter,
    ) -> Result<Option<Vec<NotificationRecord>>, NotificationError>;
}
