//! Pure alert state machines: rule, tracking and price in, transition out. No I/O.

pub mod absolute;
pub mod relative;

use crate::domain::entities::AlertRule;
use crate::domain::value_objects::Tracking;

/// What the caller must persist (and possibly announce) after one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Nothing changes.
    Hold,
    /// Store new tracking without notifying. Covers initialization.
    Track(Tracking),
    /// A relative alert fired against `reference` and restarts with `tracking`.
    Rearm { reference: f64, tracking: Tracking },
    /// An absolute alert fired against `target` and must be deactivated.
    Retire { target: f64 },
}

impl Transition {
    #[must_use]
    pub const fn is_trigger(&self) -> bool {
        matches!(self, Self::Rearm { .. } | Self::Retire { .. })
    }
}

/// Advances an alert by one observed price.
#[must_use]
pub fn evaluate(rule: &AlertRule, tracking: Option<Tracking>, price: f64) -> Transition {
    match *rule {
        AlertRule::DropFromHigh { threshold_percent } => {
            relative::evaluate_drop(threshold_percent, tracking, price)
        }
        AlertRule::RiseFromLow { threshold_percent } => {
            relative::evaluate_rise(threshold_percent, tracking, price)
        }
        AlertRule::RiseAbove { target_price } => absolute::evaluate_above(target_price, price),
        AlertRule::FallBelow { target_price } => absolute::evaluate_below(target_price, price),
    }
}
