use std::fmt;

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePanel {
    #[default]
    Holdings,
    Feed,
}

impl ActivePanel {
    /// Switch to the other panel.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Holdings => Self::Feed,
            Self::Feed => Self::Holdings,
        }
    }
}

impl fmt::Display for ActivePanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Holdings => write!(f, "Holdings"),
            Self::Feed => write!(f, "Alerts"),
        }
    }
}

/// Column used for sorting the holdings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Ticker,
    Value,
    ProfitLoss,
}

impl SortColumn {
    /// Cycle to the next sort column.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Ticker => Self::Value,
            Self::Value => Self::ProfitLoss,
            Self::ProfitLoss => Self::Ticker,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticker => write!(f, "Ticker"),
            Self::Value => write!(f, "Value"),
            Self::ProfitLoss => write!(f, "P/L %"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Toggle the sort direction.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "↑"),
            Self::Desc => write!(f, "↓"),
        }
    }
}
