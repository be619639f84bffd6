//! User-facing alerts, newest first.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Oldest notifications are evicted past this many entries.
pub const DEFAULT_NOTIFICATION_CAP: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// What a caller supplies; id, timestamp and read flag are synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    cap: usize,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_cap(DEFAULT_NOTIFICATION_CAP)
    }
}

impl NotificationQueue {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap: cap.max(1),
        }
    }

    pub fn add(&mut self, new: NewNotification) -> &Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: new.kind,
            title: new.title,
            message: new.message,
            timestamp: Utc::now(),
            read: false,
        };
        self.entries.insert(0, notification);
        self.entries.truncate(self.cap);
        &self.entries[0]
    }

    /// Marks the matching entry read. Returns false when no entry matched.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the request wrapper sends success and error alerts.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: NewNotification);
}

/// Shared handle over a [`NotificationQueue`].
#[derive(Default)]
pub struct NotificationCenter {
    queue: Mutex<NotificationQueue>,
}

impl NotificationCenter {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            queue: Mutex::new(NotificationQueue::with_cap(cap)),
        }
    }

    pub fn add(&self, new: NewNotification) -> Notification {
        self.queue.lock().add(new).clone()
    }

    pub fn mark_read(&self, id: &str) -> bool {
        self.queue.lock().mark_read(id)
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue.lock().entries().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.queue.lock().unread_count()
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: NewNotification) {
        self.add(notification);
    }
}
