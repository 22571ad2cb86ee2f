//! Transient user notifications
//!
//! Every mutation outcome produces exactly one notification. Where the
//! notification ends up (a toast area, a terminal, a test log) is decided by
//! the [`Notifier`] handed to the controller.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// A notification message
#[derive(Debug, Clone)]
pub struct Notification {
    /// The message to display
    pub message: String,
    /// The severity level of the notification
    pub level: NotificationLevel,
    /// When the notification was created
    pub timestamp: Instant,
}

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl Notification {
    pub fn new(message: String, level: NotificationLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), NotificationLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), NotificationLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), NotificationLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), NotificationLevel::Success)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// In-memory notification history.
///
/// Cloning shares the underlying log.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.entries.lock().last().cloned()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return everything logged so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.lock().push(notification);
    }
}
