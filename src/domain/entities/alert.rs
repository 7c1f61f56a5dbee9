use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{
    AlertKind, Tracking, TrackingState, UnknownAlertKind, UnknownTrackingState,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownAlertKind),
    #[error(transparent)]
    UnknownState(#[from] UnknownTrackingState),
    #[error("{kind} alert has no threshold percent")]
    MissingThreshold { kind: AlertKind },
    #[error("{kind} alert has no target price")]
    MissingTarget { kind: AlertKind },
    #[error("threshold must be a finite, positive percentage (got {0})")]
    InvalidThreshold(f64),
    #[error("drop threshold must be below 100% (got {0})")]
    ThresholdTooLarge(f64),
    #[error("target price must be a finite, positive number (got {0})")]
    InvalidTarget(f64),
    #[error("benchmark price and state must be set together")]
    PartialTracking,
    #[error("state {state} does not belong to a {kind} alert")]
    StateMismatch { kind: AlertKind, state: TrackingState },
    #[error("benchmark price must be a finite, positive number (got {0})")]
    InvalidBenchmark(f64),
}

/// What an alert watches for, with the parameter that kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertRule {
    DropFromHigh { threshold_percent: f64 },
    RiseFromLow { threshold_percent: f64 },
    RiseAbove { target_price: f64 },
    FallBelow { target_price: f64 },
}

impl AlertRule {
    #[must_use]
    pub const fn kind(&self) -> AlertKind {
        match self {
            Self::DropFromHigh { .. } => AlertKind::DropFromHigh,
            Self::RiseFromLow { .. } => AlertKind::RiseFromLow,
            Self::RiseAbove { .. } => AlertKind::RiseAbove,
            Self::FallBelow { .. } => AlertKind::FallBelow,
        }
    }

    #[must_use]
    pub const fn threshold_percent(&self) -> Option<f64> {
        match self {
            Self::DropFromHigh { threshold_percent } | Self::RiseFromLow { threshold_percent } => {
                Some(*threshold_percent)
            }
            Self::RiseAbove { .. } | Self::FallBelow { .. } => None,
        }
    }

    #[must_use]
    pub const fn target_price(&self) -> Option<f64> {
        match self {
            Self::RiseAbove { target_price } | Self::FallBelow { target_price } => {
                Some(*target_price)
            }
            Self::DropFromHigh { .. } | Self::RiseFromLow { .. } => None,
        }
    }

    /// Builds a rule from a kind and whichever parameter it requires.
    ///
    /// # Errors
    ///
    /// Returns `AlertError` if the required parameter is missing or out of range.
    pub fn from_parts(
        kind: AlertKind,
        threshold_percent: Option<f64>,
        target_price: Option<f64>,
    ) -> Result<Self, AlertError> {
        let rule = match kind {
            AlertKind::DropFromHigh => Self::DropFromHigh {
                threshold_percent: threshold_percent.ok_or(AlertError::MissingThreshold { kind })?,
            },
            AlertKind::RiseFromLow => Self::RiseFromLow {
                threshold_percent: threshold_percent.ok_or(AlertError::MissingThreshold { kind })?,
            },
            AlertKind::RiseAbove => Self::RiseAbove {
                target_price: target_price.ok_or(AlertError::MissingTarget { kind })?,
            },
            AlertKind::FallBelow => Self::FallBelow {
                target_price: target_price.ok_or(AlertError::MissingTarget { kind })?,
            },
        };
        rule.validate()?;
        Ok(rule)
    }

    /// # Errors
    ///
    /// Returns `AlertError` if the threshold or target is out of range.
    pub fn validate(&self) -> Result<(), AlertError> {
        match *self {
            Self::DropFromHigh { threshold_percent } => {
                check_threshold(threshold_percent)?;
                if threshold_percent >= 100.0 {
                    return Err(AlertError::ThresholdTooLarge(threshold_percent));
                }
                Ok(())
            }
            Self::RiseFromLow { threshold_percent } => check_threshold(threshold_percent),
            Self::RiseAbove { target_price } | Self::FallBelow { target_price } => {
                if target_price.is_finite() && target_price > 0.0 {
                    Ok(())
                } else {
                    Err(AlertError::InvalidTarget(target_price))
                }
            }
        }
    }
}

fn check_threshold(threshold: f64) -> Result<(), AlertError> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(())
    } else {
        Err(AlertError::InvalidThreshold(threshold))
    }
}

/// An alert row exactly as stored: every column nullable, nothing validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    pub stock_id: i64,
    pub kind: String,
    pub threshold_percent: Option<f64>,
    pub target_price: Option<f64>,
    pub active: bool,
    pub benchmark: Option<f64>,
    pub state: Option<String>,
}

/// A validated alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: i64,
    pub stock_id: i64,
    pub rule: AlertRule,
    pub active: bool,
    pub tracking: Option<Tracking>,
}

impl Alert {
    #[must_use]
    pub const fn kind(&self) -> AlertKind {
        self.rule.kind()
    }
}

impl TryFrom<AlertRecord> for Alert {
    type Error = AlertError;

    fn try_from(record: AlertRecord) -> Result<Self, Self::Error> {
        let kind: AlertKind = record.kind.parse()?;
        let rule = AlertRule::from_parts(kind, record.threshold_percent, record.target_price)?;

        let tracking = match (record.state.as_deref(), record.benchmark) {
            (None, None) => None,
            (Some(state), Some(benchmark)) => {
                let state: TrackingState = state.parse()?;
                if !state.belongs_to(kind) {
                    return Err(AlertError::StateMismatch { kind, state });
                }
                if !benchmark.is_finite() || benchmark <= 0.0 {
                    return Err(AlertError::InvalidBenchmark(benchmark));
                }
                Some(Tracking::new(state, benchmark))
            }
            _ => return Err(AlertError::PartialTracking),
        };

        Ok(Self {
            id: record.id,
            stock_id: record.stock_id,
            rule,
            active: record.active,
            tracking,
        })
    }
}

impl From<&Alert> for AlertRecord {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id,
            stock_id: alert.stock_id,
            kind: alert.kind().as_str().to_string(),
            threshold_percent: alert.rule.threshold_percent(),
            target_price: alert.rule.target_price(),
            active: alert.active,
            benchmark: alert.tracking.map(|t| t.benchmark),
            state: alert.tracking.map(|t| t.state.as_str().to_string()),
        }
    }
}

/// A validated request to create (or replace) the alert of one kind on a stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewAlert {
    pub stock_id: i64,
    pub rule: AlertRule,
}

impl NewAlert {
    /// # Errors
    ///
    /// Returns `AlertError` if the rule's parameter is out of range.
    pub fn new(stock_id: i64, rule: AlertRule) -> Result<Self, AlertError> {
        rule.validate()?;
        Ok(Self { stock_id, rule })
    }
}
