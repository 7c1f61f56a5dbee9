use crate::domain::value_objects::{AlertKind, Tracking, TrackingState};

use super::Transition;

/// Price at or below which a drop alert fires.
#[must_use]
pub fn drop_trigger_price(benchmark: f64, threshold_percent: f64) -> f64 {
    benchmark * (100.0 - threshold_percent) / 100.0
}

/// Price at or above which a rise alert fires.
#[must_use]
pub fn rise_trigger_price(benchmark: f64, threshold_percent: f64) -> f64 {
    benchmark * (100.0 + threshold_percent) / 100.0
}

// Compared without dividing so that 100 * (1 - 5%) lands exactly on 95.
fn has_dropped(price: f64, benchmark: f64, threshold_percent: f64) -> bool {
    price * 100.0 <= benchmark * (100.0 - threshold_percent)
}

fn has_risen(price: f64, benchmark: f64, threshold_percent: f64) -> bool {
    price * 100.0 >= benchmark * (100.0 + threshold_percent)
}

/// Peak tracking: follow new highs, then wait for a fall of `threshold_percent`
/// from the last one.
#[must_use]
pub fn evaluate_drop(threshold_percent: f64, tracking: Option<Tracking>, price: f64) -> Transition {
    let peak = |p| Transition::Track(Tracking::new(TrackingState::WatchingForPeak, p));

    let Some(Tracking { state, benchmark }) =
        tracking.filter(|t| t.state.belongs_to(AlertKind::DropFromHigh))
    else {
        return peak(price);
    };

    match state {
        TrackingState::WatchingForDrop => {
            if has_dropped(price, benchmark, threshold_percent) {
                Transition::Rearm {
                    reference: benchmark,
                    tracking: Tracking::new(TrackingState::WatchingForPeak, price),
                }
            } else if price > benchmark {
                peak(price)
            } else {
                Transition::Hold
            }
        }
        _ => {
            if price > benchmark {
                peak(price)
            } else if price < benchmark {
                Transition::Track(Tracking::new(TrackingState::WatchingForDrop, benchmark))
            } else {
                Transition::Hold
            }
        }
    }
}

/// Trough tracking: follow new lows, then wait for a rise of `threshold_percent`
/// from the last one.
#[must_use]
pub fn evaluate_rise(threshold_percent: f64, tracking: Option<Tracking>, price: f64) -> Transition {
    let trough = |p| Transition::Track(Tracking::new(TrackingState::WatchingForTrough, p));

    let Some(Tracking { state, benchmark }) =
        tracking.filter(|t| t.state.belongs_to(AlertKind::RiseFromLow))
    else {
        return trough(price);
    };

    match state {
        TrackingState::WatchingForRise => {
            if has_risen(price, benchmark, threshold_percent) {
                Transition::Rearm {
                    reference: benchmark,
                    tracking: Tracking::new(TrackingState::WatchingForTrough, price),
                }
            } else if price < benchmark {
                trough(price)
            } else {
                Transition::Hold
            }
        }
        _ => {
            if price < benchmark {
                trough(price)
            } else if price > benchmark {
                Transition::Track(Tracking::new(TrackingState::WatchingForRise, benchmark))
            } else {
                Transition::Hold
            }
        }
    }
}
