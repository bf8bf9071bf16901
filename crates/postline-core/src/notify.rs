// ── User-visible notifications ──
//
// One-shot, fire-and-forget alerts emitted on every applied fetch
// failure. The controller never waits on display.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::state::ErrorKind;

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

/// A single alert for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: ErrorKind,
    pub title: String,
    pub detail: String,
}

impl Notification {
    /// The alert shown for a failed fetch of the given kind.
    pub fn for_failure(kind: ErrorKind) -> Self {
        let (title, detail) = match kind {
            ErrorKind::Offline => (
                "You're offline".to_owned(),
                "Check your connection, then refresh to try again.".to_owned(),
            ),
            ErrorKind::ServerError(code) => (
                "Server error".to_owned(),
                format!("The server responded with status {code}. Refresh to try again."),
            ),
            ErrorKind::NetworkError => (
                "Network error".to_owned(),
                "Records could not be loaded. Refresh to try again.".to_owned(),
            ),
        };
        Self {
            kind,
            title,
            detail,
        }
    }
}

/// Receives notifications. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Fans notifications out to any number of `broadcast` subscribers.
///
/// Notifications sent while nobody is subscribed are dropped.
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}
