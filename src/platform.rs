//! Platform adapter capability contract.
//!
//! This module defines the interface the lifecycle manager consumes to talk
//! to an OS-level notification facility, together with the no-op adapter
//! used when no facility is available on the device. Concrete per-platform
//! adapters are selected by the host application at construction time.

use crate::events::Signal;
use crate::types::{NotificationChannel, NotificationRecord};

/// Capability interface over an OS notification facility.
///
/// Two families of implementations exist in practice: immediate-delivery
/// platforms and deferred-queue platforms. The lifecycle manager treats
/// both uniformly through this contract.
///
/// Implementations must not fire [`PlatformAdapter::delivered_notifications`]
/// from within `schedule_notification` or the cancel operations; delivery is
/// an asynchronous OS signal, not a synchronous side effect of scheduling.
pub trait PlatformAdapter: Send + Sync {
    /// Creates a notification record populated with platform default
    /// field values.
    fn create_notification(&self) -> NotificationRecord;

    /// Registers channel definitions with the platform.
    ///
    /// Performed once, before first use. On platforms without a channel
    /// model this is a no-op; where the platform requires a default channel,
    /// the first definition becomes the default.
    fn register_channels(&self, channels: &[NotificationChannel]);

    /// Registers `notification` with the OS and marks it scheduled.
    fn schedule_notification(&self, notification: &mut NotificationRecord);

    /// Cancels a scheduled notification by id.
    ///
    /// A no-op if the id is unknown to the platform.
    fn cancel_notification(&self, notification_id: i32);

    /// Cancels every scheduled notification.
    fn cancel_all_scheduled_notifications(&self);

    /// Removes a displayed notification by id.
    ///
    /// Dismissal concerns displayed notifications only; scheduling state is
    /// unaffected.
    fn dismiss_notification(&self, notification_id: i32);

    /// Removes every displayed notification.
    fn dismiss_all_displayed_notifications(&self);

    /// Lifecycle hook invoked when the application gains focus.
    fn on_foreground(&self);

    /// Lifecycle hook invoked when the application loses focus.
    fn on_background(&self);

    /// Signal fired when the OS delivers a notification.
    fn delivered_notifications(&self) -> &Signal<NotificationRecord>;
}

/// Adapter for devices without a notification facility.
///
/// Every operation is a no-op, `create_notification` returns an empty
/// record, and the delivered signal never fires. A missing platform is an
/// expected runtime configuration, not an error.
#[derive(Debug, Default)]
pub struct NullPlatformAdapter {
    delivered: Signal<NotificationRecord>,
}

impl NullPlatformAdapter {
    /// Creates a new no-op adapter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformAdapter for NullPlatformAdapter {
    fn create_notification(&self) -> NotificationRecord {
        NotificationRecord::new()
    }

    fn register_channels(&self, _channels: &[NotificationChannel]) {}

    fn schedule_notification(&self, _notification: &mut NotificationRecord) {}

    fn cancel_notification(&self, _notification_id: i32) {}

    fn cancel_all_scheduled_notifications(&self) {}

    fn dismiss_notification(&self, _notification_id: i32) {}

    fn dismiss_all_displayed_notifications(&self) {}

    fn on_foreground(&self) {}

    fn on_background(&self) {}

    fn delivered_notifications(&self) -> &Signal<NotificationRecord> {
        &self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_adapter_creates_empty_records_and_never_schedules() {
        let adapter = NullPlatformAdapter::new();
        let mut record = adapter.create_notification();
        assert_eq!(record, NotificationRecord::new());

        adapter.schedule_notification(&mut record);
        assert!(!record.scheduled());
        assert_eq!(adapter.delivered_notifications().listener_count(), 0);
    }
}
