use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::models::{Notification, NotificationKind};

const RECENT_CAPACITY: usize = 50;
const CHANNEL_CAPACITY: usize = 64;

/// Fan-out of transient notifications to live subscribers plus a short backlog.
pub struct NotificationCenter {
    sender: broadcast::Sender<Notification>,
    recent: Mutex<VecDeque<Notification>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY)),
        }
    }

    pub fn notify(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        let notification = Notification::new(kind, title, message);
        tracing::debug!(
            "Notification [{}] {}: {}",
            notification.event_name(),
            notification.title,
            notification.message
        );

        {
            let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
            recent.push_front(notification.clone());
            recent.truncate(RECENT_CAPACITY);
        }

        // No subscribers is fine.
        let _ = self.sender.send(notification.clone());
        notification
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Newest first.
    pub fn recent(&self) -> Vec<Notification> {
        let recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.iter().cloned().collect()
    }
}
