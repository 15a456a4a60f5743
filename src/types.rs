//! Core data types for local-notification scheduling.
//!
//! This module provides the notification record and pending-entry value
//! types, the operating-mode flag set, and the channel definitions used
//! during manager initialization.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Operating-mode flags controlling how the manager queues, clears and
    /// reschedules notifications across foreground/background transitions.
    ///
    /// `RESCHEDULE_AFTER_CLEARING` is meaningful only when
    /// `CLEAR_ON_FOREGROUNDING` is also set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperatingMode: u8 {
        /// Hold time-based notifications in memory instead of handing them
        /// to the OS immediately; they are scheduled on backgrounding.
        const QUEUE = 1 << 0;
        /// Cancel all OS-side schedules whenever the application returns to
        /// the foreground.
        const CLEAR_ON_FOREGROUNDING = 1 << 1;
        /// Restore cleared notifications that still have a future delivery
        /// time back into the queue on foregrounding.
        const RESCHEDULE_AFTER_CLEARING = 1 << 2;

        /// Queue and clear on foregrounding, without rescheduling.
        const QUEUE_AND_CLEAR = Self::QUEUE.bits() | Self::CLEAR_ON_FOREGROUNDING.bits();
        /// Queue, clear on foregrounding, and reschedule cleared
        /// notifications with future delivery times.
        const QUEUE_CLEAR_AND_RESCHEDULE = Self::QUEUE.bits()
            | Self::CLEAR_ON_FOREGROUNDING.bits()
            | Self::RESCHEDULE_AFTER_CLEARING.bits();
    }
}

impl OperatingMode {
    /// Every notification is handed to the OS as soon as it is scheduled.
    pub const NO_QUEUE: Self = Self::empty();
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::NO_QUEUE
    }
}

/// The content and delivery parameters of one local notification.
///
/// All display fields distinguish "unset" from "empty"; a badge number of
/// zero is different from no badge at all. The `scheduled` flag is
/// observable but not directly settable: it is raised by the platform
/// adapter when the record is handed to the OS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationRecord {
    /// Identity of the notification. Unset until assigned by the caller or
    /// synthesized by the manager when queuing a time-based record.
    pub id: Option<i32>,
    /// Title text.
    pub title: Option<String>,
    /// Body text.
    pub body: Option<String>,
    /// Subtitle text.
    pub subtitle: Option<String>,
    /// Logical grouping key; platform-specific meaning (an importance
    /// grouping on channel-model platforms).
    pub channel: Option<String>,
    /// Application icon badge count.
    pub badge_number: Option<i32>,
    /// Whether the OS should auto-dismiss the notification when tapped.
    pub should_auto_cancel: bool,
    /// When the notification should be delivered. Absence means delivery is
    /// not time-based and is left to the platform.
    pub delivery_time: Option<DateTime<Utc>>,
    /// Small display icon resource identifier.
    pub small_icon: Option<String>,
    /// Large display icon resource identifier.
    pub large_icon: Option<String>,
    scheduled: bool,
}

impl NotificationRecord {
    /// Creates an empty notification record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the platform adapter currently holds a live schedule for
    /// this record.
    pub fn scheduled(&self) -> bool {
        self.scheduled
    }

    /// Marks the record as registered with the OS notification facility.
    ///
    /// Called by platform adapters when the record is handed over; not
    /// intended for application code.
    pub fn mark_scheduled(&mut self) {
        self.scheduled = true;
    }
}

/// A notification tracked by the lifecycle manager, together with
/// manager-owned bookkeeping.
///
/// Entries handed out by manager operations and carried by events are value
/// snapshots; the live collection is owned exclusively by the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    /// The tracked notification.
    pub notification: NotificationRecord,
    /// Under the reschedule-after-clear policy, marks an entry that must be
    /// restored into the queue when it is serialized, cleared, and later
    /// reloaded with a future delivery time.
    pub reschedule: bool,
}

impl PendingEntry {
    /// Wraps a notification record in a new pending entry.
    pub fn new(notification: NotificationRecord) -> Self {
        Self {
            notification,
            reschedule: false,
        }
    }
}

/// Importance level of a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelImportance {
    /// The channel does not interrupt the user.
    None,
    /// Low-importance presentation.
    Low,
    /// Platform default presentation.
    #[default]
    Default,
    /// High-importance presentation.
    High,
}

impl fmt::Display for ChannelImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelImportance::None => write!(f, "None"),
            ChannelImportance::Low => write!(f, "Low"),
            ChannelImportance::Default => write!(f, "Default"),
            ChannelImportance::High => write!(f, "High"),
        }
    }
}

/// A notification channel definition registered with the platform adapter
/// during initialization.
///
/// Channels are a logical category with their own importance and visibility
/// settings; on platforms without a channel model they are ignored. The
/// first channel passed to the manager becomes the adapter's default channel
/// where the platform requires one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationChannel {
    /// Channel identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// User-facing description.
    pub description: String,
    /// Importance of notifications posted to this channel.
    #[serde(default)]
    pub importance: ChannelImportance,
    /// Vibration pattern in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration_pattern: Option<Vec<i64>>,
    /// Whether notifications on this channel contribute to the icon badge.
    #[serde(default)]
    pub shows_badge: bool,
    /// Whether the notification light is used.
    #[serde(default)]
    pub shows_lights: bool,
    /// Whether notifications are posted with high priority.
    #[serde(default)]
    pub high_priority: bool,
    /// Whether notifications are shown on the lock screen.
    #[serde(default)]
    pub visible_on_lock_screen: bool,
}

impl NotificationChannel {
    /// Creates a new channel with default importance and flags.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        NotificationChannel {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            importance: ChannelImportance::Default,
            vibration_pattern: None,
            shows_badge: false,
            shows_lights: false,
            high_priority: false,
            visible_on_lock_screen: false,
        }
    }

    /// Sets the channel importance.
    pub fn with_importance(mut self, importance: ChannelImportance) -> Self {
        self.importance = importance;
        self
    }

    /// Sets the vibration pattern in milliseconds.
    pub fn with_vibration_pattern(mut self, pattern: Vec<i64>) -> Self {
        self.vibration_pattern = Some(pattern);
        self
    }

    /// Sets whether notifications on this channel contribute to the badge.
    pub fn with_badge(mut self, shows_badge: bool) -> Self {
        self.shows_badge = shows_badge;
        self
    }

    /// Sets whether the notification light is used.
    pub fn with_lights(mut self, shows_lights: bool) -> Self {
        self.shows_lights = shows_lights;
        self
    }

    /// Sets whether notifications are posted with high priority.
    pub fn with_high_priority(mut self, high_priority: bool) -> Self {
        self.high_priority = high_priority;
        self
    }

    /// Sets whether notifications are shown on the lock screen.
    pub fn with_lock_screen_visibility(mut self, visible: bool) -> Self {
        self.visible_on_lock_screen = visible;
        self
    }
}
