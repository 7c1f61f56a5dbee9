pub mod composite;
pub mod desktop;
pub mod pushbullet;
pub mod pushover;
pub mod ui_queue;

pub use composite::CompositeNotifier;
pub use desktop::DesktopNotifier;
pub use pushbullet::PushbulletNotifier;
pub use pushover::PushoverNotifier;
pub use ui_queue::UiQueueNotifier;

use crate::application::config::{NotificationConfig, PushService};
use crate::domain::ports::notifier::{NotificationError, Notifier};

/// Send an HTTP request from synchronous notifier code running on a
/// multi-threaded Tokio runtime.
fn send_blocking(request: reqwest::RequestBuilder, channel: &str) -> Result<(), NotificationError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|_| {
        NotificationError::ChannelUnavailable(format!("{channel}: no async runtime"))
    })?;

    let result = tokio::task::block_in_place(|| handle.block_on(request.send()));

    match result {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => Err(NotificationError::SendFailed(format!(
            "{channel} returned HTTP {}",
            resp.status()
        ))),
        Err(e) => Err(NotificationError::SendFailed(format!("{channel}: {e}"))),
    }
}

/// The configured push channel, if any.
///
/// # Errors
///
/// Returns `NotificationError::MissingCredentials` when a service is selected
/// but its credentials are incomplete.
pub fn push_notifier(
    config: &NotificationConfig,
) -> Result<Option<Box<dyn Notifier>>, NotificationError> {
    let credential = |value: &Option<String>| value.as_deref().unwrap_or_default().to_string();

    match config.push_service {
        PushService::None => Ok(None),
        PushService::Pushover => {
            let notifier = PushoverNotifier::new(
                &credential(&config.pushover_user_key),
                &credential(&config.pushover_api_token),
            )?;
            Ok(Some(Box::new(notifier)))
        }
        PushService::Pushbullet => {
            let notifier = PushbulletNotifier::new(&credential(&config.pushbullet_access_token))?;
            Ok(Some(Box::new(notifier)))
        }
    }
}

/// All channels for this process: the UI queue always, desktop when enabled,
/// and the push service when its credentials are complete.
#[must_use]
pub fn build_notifier(config: &NotificationConfig, ui: UiQueueNotifier) -> CompositeNotifier {
    let mut composite = CompositeNotifier::new(vec![Box::new(ui)]);

    if config.desktop {
        composite.push(Box::new(DesktopNotifier::new()));
    }

    match push_notifier(config) {
        Ok(Some(push)) => composite.push(push),
        Ok(None) => {}
        Err(e) => tracing::warn!("Push notifications disabled: {e}"),
    }

    composite
}
