use notify_rust::{Timeout, Urgency};

use crate::domain::entities::Notification;
use crate::domain::ports::notifier::{NotificationError, Notifier};
use crate::domain::value_objects::AlertKind;

const MAX_BODY_CHARS: usize = 250;
const MAX_SUMMARY_CHARS: usize = 100;

/// Desktop popup through the platform notification server.
pub struct DesktopNotifier;

impl DesktopNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        let summary = truncate(&escape_markup(&notification.title), MAX_SUMMARY_CHARS);
        let body = truncate(&escape_markup(&notification.message), MAX_BODY_CHARS);

        notify_rust::Notification::new()
            .appname("stockwatch")
            .summary(&summary)
            .body(&body)
            .urgency(kind_to_urgency(notification.kind))
            .timeout(Timeout::Milliseconds(10_000))
            .show()
            .map_err(|_| {
                NotificationError::ChannelUnavailable(
                    "desktop notification server unreachable".to_string(),
                )
            })?;

        Ok(())
    }
}

// Losses are louder than gains.
#[must_use]
const fn kind_to_urgency(kind: AlertKind) -> Urgency {
    match kind {
        AlertKind::DropFromHigh | AlertKind::FallBelow => Urgency::Critical,
        AlertKind::RiseFromLow | AlertKind::RiseAbove => Urgency::Normal,
    }
}

// Truncates on Unicode scalar values (not grapheme clusters; ZWJ sequences may split).
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_owned()
    } else {
        let mut result: String = s.chars().take(max_chars - 1).collect();
        result.push('\u{2026}');
        result
    }
}

fn escape_markup(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
