//! Broadcast channel for user-facing notifications.

use avatar_core::Notification;
use tokio::sync::broadcast;

/// Capacity of the notification channel. Slow subscribers lose the oldest toasts.
const CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`Notification`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive notifications sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Send a notification. Having no subscribers is not an error.
    pub fn send(&self, notification: Notification) {
        if notification.is_error() {
            tracing::debug!("Notify (error): {notification}");
        } else {
            tracing::debug!("Notify: {notification}");
        }
        let _ = self.tx.send(notification);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
