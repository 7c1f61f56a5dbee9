use tokio::sync::mpsc;

use crate::domain::entities::Notification;
use crate::domain::ports::notifier::{NotificationError, Notifier};

/// Hands notifications to an in-process consumer (terminal printer or dashboard).
#[derive(Clone)]
pub struct UiQueueNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl UiQueueNotifier {
    #[must_use]
    pub const fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    /// A notifier and the receiving end of its queue.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Notifier for UiQueueNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| NotificationError::ChannelUnavailable("ui queue closed".to_string()))
    }
}
