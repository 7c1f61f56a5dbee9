use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::alert_kind::AlertKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown alert state: {0}")]
pub struct UnknownTrackingState(pub String);

/// Phase of a relative alert's peak/trough tracking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    WatchingForPeak,
    WatchingForDrop,
    WatchingForTrough,
    WatchingForRise,
}

impl TrackingState {
    pub const ALL: [Self; 4] = [
        Self::WatchingForPeak,
        Self::WatchingForDrop,
        Self::WatchingForTrough,
        Self::WatchingForRise,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WatchingForPeak => "watching_for_peak",
            Self::WatchingForDrop => "watching_for_drop",
            Self::WatchingForTrough => "watching_for_trough",
            Self::WatchingForRise => "watching_for_rise",
        }
    }

    /// Whether this phase is part of the given alert kind's state machine.
    #[must_use]
    pub const fn belongs_to(self, kind: AlertKind) -> bool {
        match kind {
            AlertKind::DropFromHigh => {
                matches!(self, Self::WatchingForPeak | Self::WatchingForDrop)
            }
            AlertKind::RiseFromLow => {
                matches!(self, Self::WatchingForTrough | Self::WatchingForRise)
            }
            AlertKind::RiseAbove | AlertKind::FallBelow => false,
        }
    }
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingState {
    type Err = UnknownTrackingState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownTrackingState(s.to_string()))
    }
}

/// Benchmark price and phase of a relative alert. Stored together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub state: TrackingState,
    pub benchmark: f64,
}

impl Tracking {
    #[must_use]
    pub const fn new(state: TrackingState, benchmark: f64) -> Self {
        Self { state, benchmark }
    }
}
