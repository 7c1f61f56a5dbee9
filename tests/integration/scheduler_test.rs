#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use stockwatch::application::services::{run_scheduler, AlertEvaluator, CycleReport};
use stockwatch::domain::entities::{AlertRule, NewAlert, NewStock, PriceInjection, PriceQuote};
use stockwatch::domain::ports::{AlertStore, PriceError, PriceSource, StockStore};
use stockwatch::infrastructure::notifications::UiQueueNotifier;
use stockwatch::infrastructure::persistence::InMemoryStore;
use tokio::sync::{mpsc, oneshot};

/// Quotes every ticker at a fixed price and counts fetches.
struct CountingPrices {
    price: f64,
    calls: AtomicUsize,
}

impl CountingPrices {
    const fn new(price: f64) -> Self {
        Self {
            price,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PriceSource for CountingPrices {
    async fn get_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, PriceQuote>, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(tickers
            .iter()
            .map(|t| (t.clone(), PriceQuote::new(t.clone(), self.price)))
            .collect())
    }
}

fn seed(store: &InMemoryStore) -> (i64, i64) {
    let a = store
        .add_stock(&NewStock::new("AAA", 1.0, 1.0, None).expect("stock"))
        .expect("add");
    let b = store
        .add_stock(&NewStock::new("BBB", 1.0, 1.0, None).expect("stock"))
        .expect("add");
    let injected = store
        .add_alert(&NewAlert::new(a, AlertRule::RiseAbove { target_price: 100.0 }).expect("alert"))
        .expect("alert");
    let other = store
        .add_alert(
            &NewAlert::new(
                b,
                AlertRule::DropFromHigh {
                    threshold_percent: 5.0,
                },
            )
            .expect("alert"),
        )
        .expect("alert");
    (injected, other)
}

#[tokio::test]
async fn injection_preempts_the_interval_sleep() {
    let store = InMemoryStore::new();
    let (injected, other) = seed(&store);
    let prices = CountingPrices::new(50.0);
    let (notifier, mut feed) = UiQueueNotifier::channel();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let (inject_tx, inject_rx) = mpsc::channel(4);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut reports: Vec<CycleReport> = Vec::new();

    let scheduler = run_scheduler(
        &evaluator,
        Duration::from_secs(3600),
        inject_rx,
        async {
            let _ = stop_rx.await;
        },
        |report| reports.push(*report),
    );

    let driver = async {
        // Let the immediate first tick run before injecting.
        tokio::time::sleep(Duration::from_millis(50)).await;
        inject_tx
            .send(PriceInjection::new("AAA", 120.0).expect("injection"))
            .await
            .expect("send");
        let notification = tokio::time::timeout(Duration::from_secs(5), feed.recv())
            .await
            .expect("injected evaluation well before the next tick")
            .expect("notification");
        stop_tx.send(()).expect("stop");
        notification
    };

    let (result, notification) = tokio::join!(scheduler, driver);
    result.expect("scheduler");

    assert_eq!(notification.ticker, "AAA");
    assert_eq!(prices.calls.load(Ordering::SeqCst), 1);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].evaluated, 1);
    assert_eq!(reports[1].triggered, 1);

    assert!(!store.get_alert(injected).expect("get").expect("exists").active);
    // Only the first tick touched the other ticker's alert.
    let other = store.get_alert(other).expect("get").expect("exists");
    assert_eq!(other.state.as_deref(), Some("watching_for_peak"));
    assert_eq!(other.benchmark, Some(50.0));
}

#[tokio::test]
async fn closed_injection_channel_keeps_ticking() {
    let store = InMemoryStore::new();
    seed(&store);
    let prices = CountingPrices::new(50.0);
    let (notifier, _feed) = UiQueueNotifier::channel();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let (inject_tx, inject_rx) = mpsc::channel::<PriceInjection>(1);
    drop(inject_tx);

    let mut cycles = 0;
    run_scheduler(
        &evaluator,
        Duration::from_millis(20),
        inject_rx,
        tokio::time::sleep(Duration::from_millis(150)),
        |_| cycles += 1,
    )
    .await
    .expect("scheduler");

    assert!(cycles >= 3, "only {cycles} cycle(s) ran");
    assert_eq!(prices.calls.load(Ordering::SeqCst), cycles);
}

#[tokio::test]
async fn shutdown_before_first_tick_runs_nothing() {
    let store = InMemoryStore::new();
    seed(&store);
    let prices = CountingPrices::new(50.0);
    let (notifier, _feed) = UiQueueNotifier::channel();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);
    let (_inject_tx, inject_rx) = mpsc::channel::<PriceInjection>(1);

    run_scheduler(
        &evaluator,
        Duration::from_secs(60),
        inject_rx,
        std::future::ready(()),
        |_| panic!("no cycle expected"),
    )
    .await
    .expect("scheduler");

    assert_eq!(prices.calls.load(Ordering::SeqCst), 0);
}
