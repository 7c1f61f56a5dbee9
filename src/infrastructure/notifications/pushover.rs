use std::time::Duration;

use crate::domain::entities::Notification;
use crate::domain::ports::notifier::{NotificationError, Notifier};

use super::send_blocking;

pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Pushover message API: form-encoded POST with app token and user key.
pub struct PushoverNotifier {
    user_key: String,
    api_token: String,
    endpoint: String,
    client: reqwest::Client,
}

impl PushoverNotifier {
    /// # Errors
    ///
    /// Returns `NotificationError::MissingCredentials` if either credential is
    /// blank, or `ChannelUnavailable` if the HTTP client cannot be built.
    pub fn new(user_key: &str, api_token: &str) -> Result<Self, NotificationError> {
        let (user_key, api_token) = (user_key.trim(), api_token.trim());
        if user_key.is_empty() || api_token.is_empty() {
            return Err(NotificationError::MissingCredentials("pushover".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                NotificationError::ChannelUnavailable(format!("cannot build HTTP client: {e}"))
            })?;

        Ok(Self {
            user_key: user_key.to_string(),
            api_token: api_token.to_string(),
            endpoint: PUSHOVER_ENDPOINT.to_string(),
            client,
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn form<'a>(&'a self, notification: &'a Notification) -> [(&'static str, &'a str); 4] {
        [
            ("token", self.api_token.as_str()),
            ("user", self.user_key.as_str()),
            ("title", notification.title.as_str()),
            ("message", notification.message.as_str()),
        ]
    }
}

impl Notifier for PushoverNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        let request = self
            .client
            .post(&self.endpoint)
            .form(&self.form(notification));
        send_blocking(request, "pushover")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::entities::Stock;
    use crate::domain::value_objects::AlertKind;

    fn make_notification() -> Notification {
        let stock = Stock {
            id: 1,
            ticker: "NVDA".to_string(),
            name: None,
            shares: 1.0,
            average_cost: 1.0,
            currency: "USD".to_string(),
        };
        Notification::for_trigger(&stock, AlertKind::DropFromHigh, 95.0, 100.0)
    }

    #[test]
    fn blank_credentials_are_rejected() {
        assert!(matches!(
            PushoverNotifier::new("", "token"),
            Err(NotificationError::MissingCredentials(_))
        ));
        assert!(matches!(
            PushoverNotifier::new("user", "   "),
            Err(NotificationError::MissingCredentials(_))
        ));
    }

    #[test]
    fn form_carries_credentials_and_text() {
        let notifier = PushoverNotifier::new("u-key", "a-token").expect("notifier");
        let notification = make_notification();
        let form = notifier.form(&notification);

        assert_eq!(form[0], ("token", "a-token"));
        assert_eq!(form[1], ("user", "u-key"));
        assert_eq!(form[2], ("title", "Stock Alert: NVDA"));
        assert_eq!(
            form[3],
            ("message", "NVDA has dropped to $95.00 from a recent high of $100.00.")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_endpoint_fails_to_send() {
        let notifier = PushoverNotifier::new("u", "t")
            .expect("notifier")
            .with_endpoint("http://127.0.0.1:9/1/messages.json");
        assert!(matches!(
            notifier.notify(&make_notification()),
            Err(NotificationError::SendFailed(_))
        ));
    }
}
