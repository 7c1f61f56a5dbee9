use thiserror::Error;

use crate::domain::entities::Notification;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
    #[error("notification channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("missing credentials for {0}")]
    MissingCredentials(String),
}

pub trait Notifier: Send + Sync {
    /// Deliver a triggered-alert notification.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if the notification fails to send
    /// or the channel is unavailable.
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;
}
