pub mod alert_kind;
pub mod currency;
pub mod tracking;

pub use alert_kind::{AlertKind, UnknownAlertKind};
pub use currency::{currency_symbol, format_money, DEFAULT_CURRENCY};
pub use tracking::{Tracking, TrackingState, UnknownTrackingState};
