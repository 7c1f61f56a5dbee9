use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown alert kind: {0}")]
pub struct UnknownAlertKind(pub String);

/// The four alert families a stock can be watched with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Percentage drop from the most recent peak.
    DropFromHigh,
    /// Percentage rise from the most recent trough.
    RiseFromLow,
    /// Price at or above a fixed target.
    RiseAbove,
    /// Price at or below a fixed target.
    FallBelow,
}

impl AlertKind {
    pub const ALL: [Self; 4] = [
        Self::DropFromHigh,
        Self::RiseFromLow,
        Self::RiseAbove,
        Self::FallBelow,
    ];

    /// Tag used in the database and in JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DropFromHigh => "drop_from_high",
            Self::RiseFromLow => "rise_from_low",
            Self::RiseAbove => "rise_above",
            Self::FallBelow => "fall_below",
        }
    }

    /// Human-readable label for tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DropFromHigh => "Drop from recent high",
            Self::RiseFromLow => "Rise from recent low",
            Self::RiseAbove => "Rise above target",
            Self::FallBelow => "Fall below target",
        }
    }

    /// Relative kinds track a benchmark; absolute kinds compare against a target.
    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::DropFromHigh | Self::RiseFromLow)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = UnknownAlertKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownAlertKind(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for kind in AlertKind::ALL {
            assert_eq!(kind.as_str().parse::<AlertKind>(), Ok(kind));
        }
    }

    #[test]
    fn from_str_accepts_kebab_case_and_whitespace() {
        assert_eq!(
            " drop-from-high ".parse::<AlertKind>(),
            Ok(AlertKind::DropFromHigh)
        );
        assert_eq!("FALL_BELOW".parse::<AlertKind>(), Ok(AlertKind::FallBelow));
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "sideways".parse::<AlertKind>().expect_err("should fail");
        assert_eq!(err.to_string(), "unknown alert kind: sideways");
    }

    #[test]
    fn relative_kinds() {
        assert!(AlertKind::DropFromHigh.is_relative());
        assert!(AlertKind::RiseFromLow.is_relative());
        assert!(!AlertKind::RiseAbove.is_relative());
        assert!(!AlertKind::FallBelow.is_relative());
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&AlertKind::RiseFromLow).expect("serialize");
        assert_eq!(json, "\"rise_from_low\"");
    }
}
