use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::domain::value_objects::AlertKind;

/// stockwatch: portfolio tracker with price alerts
///
/// Watches the prices of your holdings and notifies you when a stock drops
/// from a recent high, rises from a recent low, or crosses a target price.
#[derive(Parser, Debug)]
#[command(name = "stockwatch")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate alerts on a schedule until Ctrl+C
    #[command(alias = "d")]
    Daemon,

    /// Run a single evaluation cycle
    #[command(alias = "c")]
    Check {
        /// Evaluate one ticker at a given price instead of fetching quotes (TICKER=PRICE)
        #[arg(long, value_name = "TICKER=PRICE")]
        inject: Option<String>,
    },

    /// Manage portfolio stocks
    #[command(subcommand)]
    Stock(StockCommand),

    /// Manage price alerts
    #[command(subcommand)]
    Alert(AlertCommand),

    /// Show holdings with current value and profit/loss
    #[command(alias = "p")]
    Portfolio {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Launch the interactive dashboard
    #[command(alias = "w")]
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// Add a stock, or update it if the ticker is already tracked
    Add(StockAddArgs),
    /// List tracked stocks
    #[command(alias = "ls")]
    List,
    /// Remove a stock and its alerts
    #[command(alias = "rm")]
    Remove {
        /// Stock ID (see `stock list`)
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct StockAddArgs {
    /// Ticker symbol, e.g. AAPL or 005930.KS
    pub ticker: String,

    /// Number of shares held
    #[arg(long, default_value_t = 0.0)]
    pub shares: f64,

    /// Average purchase price per share
    #[arg(long, default_value_t = 0.0)]
    pub cost: f64,

    /// ISO currency code (default USD)
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AlertCommand {
    /// Create an alert, replacing any alert of the same kind on that stock
    Add(AlertAddArgs),
    /// List all alerts
    #[command(alias = "ls")]
    List,
    /// Re-arm an alert
    Enable {
        /// Alert ID (see `alert list`)
        id: i64,
    },
    /// Pause an alert
    Disable {
        /// Alert ID (see `alert list`)
        id: i64,
    },
    /// Delete an alert
    #[command(alias = "rm")]
    Delete {
        /// Alert ID (see `alert list`)
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct AlertAddArgs {
    /// Ticker of a tracked stock
    pub ticker: String,

    /// Alert kind
    #[arg(short, long, value_enum)]
    pub kind: KindArg,

    /// Percentage move for drop-from-high / rise-from-low
    #[arg(short, long, conflicts_with = "target")]
    pub threshold: Option<f64>,

    /// Target price for rise-above / fall-below
    #[arg(long)]
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    DropFromHigh,
    RiseFromLow,
    RiseAbove,
    FallBelow,
}

impl From<KindArg> for AlertKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::DropFromHigh => Self::DropFromHigh,
            KindArg::RiseFromLow => Self::RiseFromLow,
            KindArg::RiseAbove => Self::RiseAbove,
            KindArg::FallBelow => Self::FallBelow,
        }
    }
}
