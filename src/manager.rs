//! Notification lifecycle management.
//!
//! This module provides the lifecycle manager: the component that decides,
//! given an operating mode and the application's foreground/background
//! transitions, which notifications are held in memory, which are handed to
//! the platform, which are expired, rescheduled, or persisted, and how badge
//! numbers are auto-assigned.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::errors::NotificationError;
use crate::events::{Signal, SubscriptionId};
use crate::persistence::FilesystemPendingQueueProvider;
use crate::persistence_iface::PendingQueueProvider;
use crate::platform::PlatformAdapter;
use crate::types::{NotificationChannel, NotificationRecord, OperatingMode, PendingEntry};

/// Entries closer than this to their delivery time are dropped on
/// backgrounding; the platform cannot schedule them meaningfully.
const MINIMUM_LEAD_TIME_SECONDS: i64 = 2;

/// Interface for the notification lifecycle manager.
///
/// One manager instance is constructed by the host application and driven
/// from a single-threaded cooperative context: a per-frame [`tick`], focus
/// transitions via [`application_focus_changed`], and the platform adapter's
/// delivery signal. Implementations serialize all access to the pending
/// collection, so the contract also holds for hosts that call in from real
/// threads.
///
/// [`tick`]: NotificationManager::tick
/// [`application_focus_changed`]: NotificationManager::application_focus_changed
pub trait NotificationManager: Send + Sync {
    /// Performs one-time setup: registers `channels` with the platform,
    /// installs the default persistence provider if none was supplied,
    /// subscribes to the platform's delivery signal, and runs an initial
    /// foregrounding pass.
    ///
    /// A second call fails with [`NotificationError::AlreadyInitialized`].
    fn initialize(&self, channels: &[NotificationChannel]) -> Result<(), NotificationError>;

    /// Creates a notification record with platform default field values.
    fn create_notification(&self) -> Result<NotificationRecord, NotificationError>;

    /// Submits a notification for delivery.
    ///
    /// Without [`OperatingMode::QUEUE`], or for a record with no delivery
    /// time, the record is handed to the platform immediately. Otherwise it
    /// is queued in memory until the next backgrounding pass, and an id is
    /// synthesized if the record has none. The returned entry is a value
    /// snapshot of the tracked state.
    fn schedule_notification(
        &self,
        notification: NotificationRecord,
    ) -> Result<PendingEntry, NotificationError>;

    /// Cancels a scheduled notification and stops tracking it.
    fn cancel_notification(&self, notification_id: i32) -> Result<(), NotificationError>;

    /// Cancels every scheduled notification and clears the pending
    /// collection.
    fn cancel_all_notifications(&self) -> Result<(), NotificationError>;

    /// Removes a displayed notification. Scheduling state is unaffected.
    fn dismiss_notification(&self, notification_id: i32) -> Result<(), NotificationError>;

    /// Removes every displayed notification. Scheduling state is
    /// unaffected.
    fn dismiss_all_notifications(&self) -> Result<(), NotificationError>;

    /// Marks or unmarks a tracked notification for restoration after a
    /// clear-on-foregrounding pass.
    ///
    /// Returns whether an entry with the given id is currently tracked.
    /// Meaningful only under [`OperatingMode::RESCHEDULE_AFTER_CLEARING`].
    fn set_reschedule(
        &self,
        notification_id: i32,
        reschedule: bool,
    ) -> Result<bool, NotificationError>;

    /// Reacts to an application focus transition.
    fn application_focus_changed(&self, has_focus: bool) -> Result<(), NotificationError>;

    /// Per-frame scan: under [`OperatingMode::QUEUE`], removes entries whose
    /// delivery time has passed and fires [`expired_events`] once for each.
    ///
    /// [`expired_events`]: NotificationManager::expired_events
    fn tick(&self) -> Result<(), NotificationError>;

    /// Snapshot of the pending collection.
    fn pending_notifications(&self) -> Vec<PendingEntry>;

    /// Signal fired when a tracked notification is delivered while the
    /// application is in the foreground.
    fn delivered_events(&self) -> &Signal<PendingEntry>;

    /// Signal fired when a queued notification's delivery time lapses.
    fn expired_events(&self) -> &Signal<PendingEntry>;

    /// The operating mode fixed at construction.
    fn operating_mode(&self) -> OperatingMode;

    /// Whether [`initialize`](NotificationManager::initialize) has run.
    fn is_initialized(&self) -> bool;

    /// Whether the application is currently considered foregrounded.
    fn in_foreground(&self) -> bool;
}

/// Default implementation of the notification lifecycle manager.
pub struct DefaultNotificationManager {
    mode: OperatingMode,
    auto_badging: bool,
    platform: Arc<dyn PlatformAdapter>,
    persistence: Mutex<Option<Arc<dyn PendingQueueProvider>>>,
    entries: Arc<Mutex<Vec<PendingEntry>>>,
    in_foreground: Arc<AtomicBool>,
    initialized: AtomicBool,
    delivered: Signal<PendingEntry>,
    expired: Signal<PendingEntry>,
    delivery_subscription: Mutex<Option<SubscriptionId>>,
}

impl DefaultNotificationManager {
    /// Creates a manager for the given mode and platform adapter.
    ///
    /// Auto-badging is enabled by default; persistence defaults to a
    /// [`FilesystemPendingQueueProvider`] under the platform data directory
    /// unless [`with_persistence`](Self::with_persistence) supplies one.
    pub fn new(mode: OperatingMode, platform: Arc<dyn PlatformAdapter>) -> Self {
        DefaultNotificationManager {
            mode,
            auto_badging: true,
            platform,
            persistence: Mutex::new(None),
            entries: Arc::new(Mutex::new(Vec::new())),
            in_foreground: Arc::new(AtomicBool::new(false)),
            initialized: AtomicBool::new(false),
            delivered: Signal::new(),
            expired: Signal::new(),
            delivery_subscription: Mutex::new(None),
        }
    }

    /// Supplies the persistence provider to use instead of the default.
    pub fn with_persistence(self, provider: Arc<dyn PendingQueueProvider>) -> Self {
        *self.persistence.lock().unwrap() = Some(provider);
        self
    }

    /// Enables or disables badge auto-assignment during backgrounding.
    pub fn with_auto_badging(mut self, auto_badging: bool) -> Self {
        self.auto_badging = auto_badging;
        self
    }

    fn ensure_initialized(&self) -> Result<(), NotificationError> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(NotificationError::NotInitialized)
        }
    }

    fn provider(&self) -> Option<Arc<dyn PendingQueueProvider>> {
        self.persistence.lock().unwrap().clone()
    }

    /// Appends `notification` to the pending collection, forwarding it to
    /// the platform first when the mode or the record calls for immediate
    /// delivery. Any existing entry with the same id is superseded.
    ///
    /// Callers hold the `entries` lock.
    fn enqueue_locked(
        &self,
        mut notification: NotificationRecord,
        entries: &mut Vec<PendingEntry>,
        reschedule: bool,
    ) -> PendingEntry {
        let time_based = notification.delivery_time.is_some();
        if !self.mode.contains(OperatingMode::QUEUE) || !time_based {
            self.platform.schedule_notification(&mut notification);
        } else if notification.id.is_none() {
            notification.id = Some(synthesize_notification_id());
        }

        if let Some(id) = notification.id {
            let before = entries.len();
            entries.retain(|entry| entry.notification.id != Some(id));
            if entries.len() != before {
                debug!("Superseded pending notification with id {}", id);
            }
        }

        let entry = PendingEntry {
            notification,
            reschedule,
        };
        entries.push(entry.clone());
        entry
    }

    fn run_foregrounding(&self) {
        self.in_foreground.store(true, Ordering::SeqCst);
        self.entries.lock().unwrap().clear();
        self.platform.on_foreground();

        let loaded = match self.provider() {
            Some(provider) => match provider.load(self.platform.as_ref()) {
                Ok(records) => records,
                Err(error) => {
                    warn!(
                        "Failed to load pending notification queue, treating as no prior data: {}",
                        error
                    );
                    None
                }
            },
            None => None,
        };

        if self.mode.contains(OperatingMode::CLEAR_ON_FOREGROUNDING) {
            self.platform.cancel_all_scheduled_notifications();
        }

        let Some(records) = loaded else {
            return;
        };
        let now = Utc::now();

        if self.mode.contains(OperatingMode::CLEAR_ON_FOREGROUNDING) {
            if self.mode.contains(OperatingMode::RESCHEDULE_AFTER_CLEARING) {
                let mut entries = self.entries.lock().unwrap();
                for record in records {
                    if record.delivery_time.map_or(false, |time| time > now) {
                        self.enqueue_locked(record, &mut entries, true);
                    }
                }
                debug!("Requeued {} notification(s) for rescheduling", entries.len());
            }
        } else {
            let mut entries = self.entries.lock().unwrap();
            for mut record in records {
                if record.delivery_time.map_or(false, |time| time > now) {
                    // Previously handed to the OS and never cancelled.
                    record.mark_scheduled();
                    entries.push(PendingEntry::new(record));
                }
            }
        }
    }

    fn run_backgrounding(&self) {
        self.in_foreground.store(false, Ordering::SeqCst);
        self.platform.on_background();

        let now = Utc::now();
        let to_persist = {
            let mut entries = self.entries.lock().unwrap();
            if self.mode.contains(OperatingMode::QUEUE) {
                let minimum_lead = Duration::seconds(MINIMUM_LEAD_TIME_SECONDS);
                let before = entries.len();
                entries.retain(|entry| {
                    entry.notification.scheduled()
                        || entry
                            .notification
                            .delivery_time
                            .map_or(true, |time| time - now >= minimum_lead)
                });
                if entries.len() != before {
                    debug!(
                        "Dropped {} notification(s) too close to their delivery time",
                        before - entries.len()
                    );
                }

                let badges_assigned = self.assign_badges_locked(&mut entries);

                for entry in entries
                    .iter_mut()
                    .filter(|entry| !entry.notification.scheduled())
                {
                    self.platform.schedule_notification(&mut entry.notification);
                }

                // Badge numbers are a scheduling-time artifact, not state.
                if badges_assigned {
                    for entry in entries
                        .iter_mut()
                        .filter(|entry| entry.notification.delivery_time.is_some())
                    {
                        entry.notification.badge_number = None;
                    }
                }
            }
            self.persistence_set_locked(&entries)
        };

        if let Some(provider) = self.provider() {
            if let Err(error) = provider.save(&to_persist) {
                warn!("Failed to persist pending notification queue: {}", error);
            }
        }
    }

    /// Assigns badges 1..N by ascending delivery time to unscheduled,
    /// time-bearing entries, provided no entry carries a badge already.
    /// Entries sharing a delivery time keep their relative order; entries
    /// without one sort last and are never badged.
    fn assign_badges_locked(&self, entries: &mut [PendingEntry]) -> bool {
        if !self.auto_badging {
            return false;
        }
        if entries
            .iter()
            .any(|entry| entry.notification.badge_number.is_some())
        {
            return false;
        }

        let mut order: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.notification.scheduled())
            .map(|(index, _)| index)
            .collect();
        order.sort_by_key(|&index| {
            entries[index]
                .notification
                .delivery_time
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        let mut next_badge = 1;
        for index in order {
            if entries[index].notification.delivery_time.is_some() {
                entries[index].notification.badge_number = Some(next_badge);
                next_badge += 1;
            }
        }
        next_badge > 1
    }

    fn persistence_set_locked(&self, entries: &[PendingEntry]) -> Vec<PendingEntry> {
        if self.mode.contains(OperatingMode::CLEAR_ON_FOREGROUNDING) {
            if self.mode.contains(OperatingMode::RESCHEDULE_AFTER_CLEARING) {
                entries
                    .iter()
                    .filter(|entry| {
                        entry.reschedule
                            && entry.notification.scheduled()
                            && entry.notification.delivery_time.is_some()
                    })
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            }
        } else {
            entries
                .iter()
                .filter(|entry| entry.notification.scheduled())
                .cloned()
                .collect()
        }
    }
}

impl NotificationManager for DefaultNotificationManager {
    fn initialize(&self, channels: &[NotificationChannel]) -> Result<(), NotificationError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(NotificationError::AlreadyInitialized);
        }

        self.platform.register_channels(channels);

        {
            let mut provider = self.persistence.lock().unwrap();
            if provider.is_none() {
                *provider = Some(Arc::new(FilesystemPendingQueueProvider::new(
                    default_queue_path(),
                )));
            }
        }

        let entries = Arc::clone(&self.entries);
        let in_foreground = Arc::clone(&self.in_foreground);
        let delivered = self.delivered.clone();
        let subscription = self.platform.delivered_notifications().subscribe(
            move |notification: &NotificationRecord| {
                if !in_foreground.load(Ordering::SeqCst) {
                    // Platforms may fire stray delivery signals while
                    // backgrounded; those are not reconciled.
                    debug!("Ignoring delivery signal received while backgrounded");
                    return;
                }
                let matched = {
                    let mut entries = entries.lock().unwrap();
                    notification.id.and_then(|id| {
                        entries
                            .iter()
                            .position(|entry| entry.notification.id == Some(id))
                            .map(|index| entries.remove(index))
                    })
                };
                if let Some(entry) = matched {
                    delivered.emit(&entry);
                }
            },
        );
        *self.delivery_subscription.lock().unwrap() = Some(subscription);

        info!("Notification manager initialized; mode {:?}", self.mode);
        self.run_foregrounding();
        Ok(())
    }

    fn create_notification(&self) -> Result<NotificationRecord, NotificationError> {
        self.ensure_initialized()?;
        Ok(self.platform.create_notification())
    }

    fn schedule_notification(
        &self,
        notification: NotificationRecord,
    ) -> Result<PendingEntry, NotificationError> {
        self.ensure_initialized()?;
        if notification.scheduled() {
            return Err(NotificationError::InvalidNotification {
                reason: "notification is already scheduled with the platform".to_string(),
            });
        }

        let mut entries = self.entries.lock().unwrap();
        let entry = self.enqueue_locked(notification, &mut entries, false);
        drop(entries);
        debug!(
            "Scheduled notification id {:?} (immediate: {})",
            entry.notification.id,
            entry.notification.scheduled()
        );
        Ok(entry)
    }

    fn cancel_notification(&self, notification_id: i32) -> Result<(), NotificationError> {
        self.ensure_initialized()?;
        self.platform.cancel_notification(notification_id);
        let mut entries = self.entries.lock().unwrap();
        if let Some(index) = entries
            .iter()
            .position(|entry| entry.notification.id == Some(notification_id))
        {
            entries.remove(index);
        }
        Ok(())
    }

    fn cancel_all_notifications(&self) -> Result<(), NotificationError> {
        self.ensure_initialized()?;
        self.platform.cancel_all_scheduled_notifications();
        self.entries.lock().unwrap().clear();
        Ok(())
    }

    fn dismiss_notification(&self, notification_id: i32) -> Result<(), NotificationError> {
        self.ensure_initialized()?;
        self.platform.dismiss_notification(notification_id);
        Ok(())
    }

    fn dismiss_all_notifications(&self) -> Result<(), NotificationError> {
        self.ensure_initialized()?;
        self.platform.dismiss_all_displayed_notifications();
        Ok(())
    }

    fn set_reschedule(
        &self,
        notification_id: i32,
        reschedule: bool,
    ) -> Result<bool, NotificationError> {
        self.ensure_initialized()?;
        let mut entries = self.entries.lock().unwrap();
        match entries
            .iter_mut()
            .find(|entry| entry.notification.id == Some(notification_id))
        {
            Some(entry) => {
                entry.reschedule = reschedule;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn application_focus_changed(&self, has_focus: bool) -> Result<(), NotificationError> {
        self.ensure_initialized()?;
        if has_focus {
            self.run_foregrounding();
        } else {
            self.run_backgrounding();
        }
        Ok(())
    }

    fn tick(&self) -> Result<(), NotificationError> {
        self.ensure_initialized()?;
        if !self.mode.contains(OperatingMode::QUEUE) {
            return Ok(());
        }

        let now = Utc::now();
        let mut lapsed = Vec::new();
        {
            let mut entries = self.entries.lock().unwrap();
            let mut index = 0;
            while index < entries.len() {
                if entries[index]
                    .notification
                    .delivery_time
                    .map_or(false, |time| time < now)
                {
                    lapsed.push(entries.remove(index));
                } else {
                    index += 1;
                }
            }
        }
        for entry in &lapsed {
            debug!("Notification id {:?} expired", entry.notification.id);
            self.expired.emit(entry);
        }
        Ok(())
    }

    fn pending_notifications(&self) -> Vec<PendingEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn delivered_events(&self) -> &Signal<PendingEntry> {
        &self.delivered
    }

    fn expired_events(&self) -> &Signal<PendingEntry> {
        &self.expired
    }

    fn operating_mode(&self) -> OperatingMode {
        self.mode
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn in_foreground(&self) -> bool {
        self.in_foreground.load(Ordering::SeqCst)
    }
}

impl Drop for DefaultNotificationManager {
    fn drop(&mut self) {
        if let Some(subscription) = self.delivery_subscription.lock().unwrap().take() {
            self.platform.delivered_notifications().unsubscribe(subscription);
        }
    }
}

/// Derives a notification id from the current high-resolution timestamp.
///
/// Rapid successive calls may collide; collisions are tolerated rather than
/// prevented, and a later entry with a colliding id supersedes the earlier
/// one. The result is always nonzero.
fn synthesize_notification_id() -> i32 {
    let mut hasher = DefaultHasher::new();
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros())
        .hash(&mut hasher);
    let id = (hasher.finish() & 0x7fff_ffff) as i32;
    if id == 0 {
        1
    } else {
        id
    }
}

fn default_queue_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("local-notifications")
        .join("pending_notifications.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryPendingQueueProvider;
    use std::sync::atomic::AtomicUsize;

    /// Recording platform adapter.
    #[derive(Default)]
    struct MockPlatformAdapter {
        delivered: Signal<NotificationRecord>,
        scheduled: Mutex<Vec<NotificationRecord>>,
        cancelled: Mutex<Vec<i32>>,
        cancel_all_calls: AtomicUsize,
        dismissed: Mutex<Vec<i32>>,
        dismiss_all_calls: AtomicUsize,
        registered_channels: Mutex<Vec<NotificationChannel>>,
        foreground_calls: AtomicUsize,
        background_calls: AtomicUsize,
    }

    impl MockPlatformAdapter {
        fn new() -> Self {
            Self::default()
        }

        fn deliver(&self, record: NotificationRecord) {
            self.delivered.emit(&record);
        }

        fn scheduled_records(&self) -> Vec<NotificationRecord> {
            self.scheduled.lock().unwrap().clone()
        }
    }

    impl PlatformAdapter for MockPlatformAdapter {
        fn create_notification(&self) -> NotificationRecord {
            let mut record = NotificationRecord::new();
            record.channel = Some("default".to_string());
            record
        }

        fn register_channels(&self, channels: &[NotificationChannel]) {
            self.registered_channels
                .lock()
                .unwrap()
                .extend_from_slice(channels);
        }

        fn schedule_notification(&self, notification: &mut NotificationRecord) {
            notification.mark_scheduled();
            self.scheduled.lock().unwrap().push(notification.clone());
        }

        fn cancel_notification(&self, notification_id: i32) {
            self.cancelled.lock().unwrap().push(notification_id);
        }

        fn cancel_all_scheduled_notifications(&self) {
            self.cancel_all_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn dismiss_notification(&self, notification_id: i32) {
            self.dismissed.lock().unwrap().push(notification_id);
        }

        fn dismiss_all_displayed_notifications(&self) {
            self.dismiss_all_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn on_foreground(&self) {
            self.foreground_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn on_background(&self) {
            self.background_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn delivered_notifications(&self) -> &Signal<NotificationRecord> {
            &self.delivered
        }
    }

    fn manager_with(
        mode: OperatingMode,
    ) -> (DefaultNotificationManager, Arc<MockPlatformAdapter>) {
        let adapter = Arc::new(MockPlatformAdapter::new());
        let manager = DefaultNotificationManager::new(mode, adapter.clone())
            .with_persistence(Arc::new(InMemoryPendingQueueProvider::new()));
        (manager, adapter)
    }

    fn time_based_record(seconds_ahead: i64) -> NotificationRecord {
        let mut record = NotificationRecord::new();
        record.title = Some("Reminder".to_string());
        record.delivery_time = Some(Utc::now() + Duration::seconds(seconds_ahead));
        record
    }

    #[test]
    fn operations_before_initialize_fail() {
        let (manager, _) = manager_with(OperatingMode::QUEUE);
        assert!(matches!(
            manager.create_notification(),
            Err(NotificationError::NotInitialized)
        ));
        assert!(matches!(
            manager.schedule_notification(NotificationRecord::new()),
            Err(NotificationError::NotInitialized)
        ));
        assert!(matches!(
            manager.cancel_notification(1),
            Err(NotificationError::NotInitialized)
        ));
        assert!(matches!(
            manager.application_focus_changed(false),
            Err(NotificationError::NotInitialized)
        ));
        assert!(matches!(manager.tick(), Err(NotificationError::NotInitialized)));
    }

    #[test]
    fn initialize_twice_fails() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        let channels = [NotificationChannel::new("default", "Default", "General")];
        manager.initialize(&channels).unwrap();
        assert!(matches!(
            manager.initialize(&channels),
            Err(NotificationError::AlreadyInitialized)
        ));
        assert_eq!(adapter.registered_channels.lock().unwrap().len(), 1);
        assert!(manager.is_initialized());
        assert!(manager.in_foreground());
    }

    #[test]
    fn no_queue_mode_schedules_immediately() {
        let (manager, adapter) = manager_with(OperatingMode::NO_QUEUE);
        manager.initialize(&[]).unwrap();

        let entry = manager.schedule_notification(time_based_record(600)).unwrap();
        assert!(entry.notification.scheduled());
        assert_eq!(adapter.scheduled_records().len(), 1);
        assert_eq!(manager.pending_notifications().len(), 1);
    }

    #[test]
    fn queue_mode_defers_time_based_records_and_synthesizes_ids() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let entry = manager.schedule_notification(time_based_record(600)).unwrap();
        assert!(!entry.notification.scheduled());
        let id = entry.notification.id.expect("id should be synthesized");
        assert_ne!(id, 0);
        assert!(adapter.scheduled_records().is_empty());
    }

    #[test]
    fn queue_mode_schedules_non_time_based_records_immediately() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let mut record = NotificationRecord::new();
        record.title = Some("No delivery time".to_string());
        let entry = manager.schedule_notification(record).unwrap();
        assert!(entry.notification.scheduled());
        assert_eq!(adapter.scheduled_records().len(), 1);
    }

    #[test]
    fn scheduling_an_already_scheduled_record_is_rejected() {
        let (manager, _) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let entry = manager
            .schedule_notification(NotificationRecord::new())
            .unwrap();
        assert!(matches!(
            manager.schedule_notification(entry.notification),
            Err(NotificationError::InvalidNotification { .. })
        ));
    }

    #[test]
    fn explicit_duplicate_id_supersedes_previous_entry() {
        let (manager, _) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let mut first = time_based_record(300);
        first.id = Some(42);
        let mut second = time_based_record(600);
        second.id = Some(42);

        manager.schedule_notification(first).unwrap();
        manager.schedule_notification(second.clone()).unwrap();

        let pending = manager.pending_notifications();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].notification.delivery_time, second.delivery_time);
    }

    #[test]
    fn cancel_removes_entry_and_notifies_platform() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let baseline = manager.pending_notifications().len();
        let entry = manager.schedule_notification(time_based_record(600)).unwrap();
        let id = entry.notification.id.unwrap();

        manager.cancel_notification(id).unwrap();
        assert_eq!(manager.pending_notifications().len(), baseline);
        assert_eq!(*adapter.cancelled.lock().unwrap(), vec![id]);

        // Cancelling an id nobody tracks is harmless.
        manager.cancel_notification(id).unwrap();
    }

    #[test]
    fn cancel_all_clears_collection() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        manager.schedule_notification(time_based_record(300)).unwrap();
        manager.schedule_notification(time_based_record(600)).unwrap();
        manager.cancel_all_notifications().unwrap();

        assert!(manager.pending_notifications().is_empty());
        assert_eq!(adapter.cancel_all_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dismiss_leaves_collection_untouched() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let entry = manager.schedule_notification(time_based_record(600)).unwrap();
        let id = entry.notification.id.unwrap();
        manager.dismiss_notification(id).unwrap();
        manager.dismiss_all_notifications().unwrap();

        assert_eq!(manager.pending_notifications().len(), 1);
        assert_eq!(*adapter.dismissed.lock().unwrap(), vec![id]);
        assert_eq!(adapter.dismiss_all_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delivery_in_foreground_fires_event_and_removes_entry() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let entry = manager.schedule_notification(time_based_record(600)).unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_inner = Arc::clone(&received);
        manager.delivered_events().subscribe(move |entry: &PendingEntry| {
            received_inner.lock().unwrap().push(entry.clone());
        });

        adapter.deliver(entry.notification.clone());

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].notification.id, entry.notification.id);
        assert!(manager.pending_notifications().is_empty());
    }

    #[test]
    fn delivery_while_backgrounded_is_ignored() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let entry = manager.schedule_notification(time_based_record(600)).unwrap();
        manager.application_focus_changed(false).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let fired_inner = Arc::clone(&fired);
        manager
            .delivered_events()
            .subscribe(move |_| fired_inner.store(true, Ordering::SeqCst));

        adapter.deliver(entry.notification.clone());
        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(manager.pending_notifications().len(), 1);
    }

    #[test]
    fn delivery_of_untracked_record_is_dropped_silently() {
        let (manager, adapter) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let fired_inner = Arc::clone(&fired);
        manager
            .delivered_events()
            .subscribe(move |_| fired_inner.store(true, Ordering::SeqCst));

        let mut stranger = time_based_record(600);
        stranger.id = Some(777);
        adapter.deliver(stranger);
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn tick_expires_past_due_entries_exactly_once() {
        let (manager, _) = manager_with(OperatingMode::QUEUE);
        manager.initialize(&[]).unwrap();

        let mut record = NotificationRecord::new();
        record.id = Some(9);
        record.delivery_time = Some(Utc::now() - Duration::seconds(1));
        {
            // Inject a past-due entry directly; the scheduling path would
            // not accept one this stale through backgrounding.
            let mut entries = manager.entries.lock().unwrap();
            entries.push(PendingEntry::new(record));
        }

        let expirations = Arc::new(AtomicUsize::new(0));
        let expirations_inner = Arc::clone(&expirations);
        manager
            .expired_events()
            .subscribe(move |_| {
                expirations_inner.fetch_add(1, Ordering::SeqCst);
            });

        manager.tick().unwrap();
        manager.tick().unwrap();
        manager.tick().unwrap();

        assert_eq!(expirations.load(Ordering::SeqCst), 1);
        assert!(manager.pending_notifications().is_empty());
    }

    #[test]
    fn tick_without_queue_mode_is_a_no_op() {
        let (manager, _) = manager_with(OperatingMode::NO_QUEUE);
        manager.initialize(&[]).unwrap();

        manager.schedule_notification(time_based_record(600)).unwrap();
        manager.tick().unwrap();
        assert_eq!(manager.pending_notifications().len(), 1);
    }

    #[test]
    fn synthesized_ids_are_nonzero() {
        for _ in 0..64 {
            assert_ne!(synthesize_notification_id(), 0);
        }
    }
}
