use std::time::Duration;

use serde_json::{json, Value};

use crate::domain::entities::Notification;
use crate::domain::ports::notifier::{NotificationError, Notifier};

use super::send_blocking;

pub const PUSHBULLET_ENDPOINT: &str = "https://api.pushbullet.com/v2/pushes";

/// Pushbullet "note" pushes authenticated with an access token header.
pub struct PushbulletNotifier {
    access_token: String,
    endpoint: String,
    client: reqwest::Client,
}

impl PushbulletNotifier {
    /// # Errors
    ///
    /// Returns `NotificationError::MissingCredentials` if the token is blank,
    /// or `ChannelUnavailable` if the HTTP client cannot be built.
    pub fn new(access_token: &str) -> Result<Self, NotificationError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(NotificationError::MissingCredentials(
                "pushbullet".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                NotificationError::ChannelUnavailable(format!("cannot build HTTP client: {e}"))
            })?;

        Ok(Self {
            access_token: access_token.to_string(),
            endpoint: PUSHBULLET_ENDPOINT.to_string(),
            client,
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn payload(notification: &Notification) -> Value {
        json!({
            "type": "note",
            "title": &notification.title,
            "body": &notification.message,
        })
    }
}

impl Notifier for PushbulletNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Access-Token", &self.access_token)
            .json(&Self::payload(notification));
        send_blocking(request, "pushbullet")
    }
}
