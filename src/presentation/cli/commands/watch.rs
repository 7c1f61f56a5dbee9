use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, oneshot, watch};

use crate::application::services::{run_scheduler, watch_portfolio, AlertEvaluator};
use crate::domain::entities::Notification;
use crate::domain::ports::{PriceSource, StockStore};
use crate::presentation::tui::app::{run_tui, DashboardFeeds};

/// Where the dashboard gets its holdings from.
pub struct PortfolioFeed {
    pub stocks: Arc<dyn StockStore>,
    pub prices: Arc<dyn PriceSource>,
    pub refresh: Duration,
}

/// Run the dashboard on a blocking thread while the scheduler and the
/// portfolio refresher run on the runtime. Returns when the user quits.
///
/// # Errors
///
/// Returns an error if the dashboard fails or its thread panics.
pub async fn run_watch(
    evaluator: &AlertEvaluator<'_>,
    interval: Duration,
    portfolio: PortfolioFeed,
    notifications: mpsc::UnboundedReceiver<Notification>,
) -> anyhow::Result<()> {
    let (portfolio_tx, portfolio_rx) = watch::channel(None);
    let (cycles_tx, cycles_rx) = watch::channel(None);
    let (done_tx, done_rx) = oneshot::channel::<()>();

    let refresher = tokio::spawn(watch_portfolio(
        portfolio.stocks,
        portfolio.prices,
        portfolio.refresh,
        portfolio_tx,
    ));

    let feeds = DashboardFeeds {
        portfolio: portfolio_rx,
        cycles: cycles_rx,
        notifications,
    };
    let dashboard = tokio::task::spawn_blocking(move || {
        let result = run_tui(feeds);
        let _ = done_tx.send(());
        result
    });

    // The dashboard has no injection input; a closed channel disables that branch.
    let (_, injections) = mpsc::channel(1);
    run_scheduler(
        evaluator,
        interval,
        injections,
        async {
            let _ = done_rx.await;
        },
        |report| {
            cycles_tx.send_replace(Some(*report));
        },
    )
    .await?;

    refresher.abort();
    dashboard.await.context("Dashboard thread panicked")?
}
