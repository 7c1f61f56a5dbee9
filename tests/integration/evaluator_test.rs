#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use stockwatch::application::config::{NotificationConfig, PushService};
use stockwatch::application::services::AlertEvaluator;
use stockwatch::domain::entities::{
    AlertRecord, AlertRule, NewAlert, NewStock, Notification, PriceInjection, PriceQuote,
};
use stockwatch::domain::ports::{
    AlertStore, NotificationError, Notifier, PriceError, PriceSource, StockStore,
};
use stockwatch::domain::value_objects::{Tracking, TrackingState};
use stockwatch::infrastructure::notifications::{build_notifier, UiQueueNotifier};
use stockwatch::infrastructure::persistence::{InMemoryStore, SqliteStore};

/// Price source whose quotes are set between cycles.
#[derive(Default)]
struct ScriptedPrices {
    quotes: Mutex<HashMap<String, f64>>,
}

impl ScriptedPrices {
    fn set(&self, ticker: &str, price: f64) {
        self.quotes
            .lock()
            .expect("lock")
            .insert(ticker.to_string(), price);
    }

    fn remove(&self, ticker: &str) {
        self.quotes.lock().expect("lock").remove(ticker);
    }
}

#[async_trait]
impl PriceSource for ScriptedPrices {
    async fn get_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, PriceQuote>, PriceError> {
        let quotes = self.quotes.lock().expect("lock");
        Ok(tickers
            .iter()
            .filter_map(|t| quotes.get(t).map(|p| (t.clone(), PriceQuote::new(t.clone(), *p))))
            .collect())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("lock")
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.sent.lock().expect("lock").push(notification.clone());
        Ok(())
    }
}

fn add_stock(store: &dyn StockStore, ticker: &str) -> i64 {
    store
        .add_stock(&NewStock::new(ticker, 10.0, 50.0, None).expect("stock"))
        .expect("add stock")
}

fn add_alert(store: &dyn AlertStore, stock_id: i64, rule: AlertRule) -> i64 {
    store
        .add_alert(&NewAlert::new(stock_id, rule).expect("alert"))
        .expect("add alert")
}

fn tracking(store: &dyn AlertStore, id: i64) -> (Option<String>, Option<f64>) {
    let record = store.get_alert(id).expect("get").expect("exists");
    (record.state, record.benchmark)
}

#[tokio::test]
async fn drop_from_high_fires_exactly_once_after_peak_and_fall() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let stock_id = add_stock(&store, "NVDA");
    let id = add_alert(
        &store,
        stock_id,
        AlertRule::DropFromHigh {
            threshold_percent: 5.0,
        },
    );

    let mut triggered = 0;
    for price in [100.0, 110.0, 108.0, 104.5, 104.0, 104.2] {
        prices.set("NVDA", price);
        triggered += evaluator.run_once().await.expect("cycle").triggered;
    }

    assert_eq!(triggered, 1);
    assert_eq!(
        notifier.messages(),
        ["NVDA has dropped to $104.50 from a recent high of $110.00."]
    );
    let (state, benchmark) = tracking(&store, id);
    assert_eq!(state.as_deref(), Some("watching_for_drop"));
    assert_eq!(benchmark, Some(104.5));
}

#[tokio::test]
async fn relative_alert_never_fires_on_first_price() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let stock_id = add_stock(&store, "AMD");
    let id = add_alert(
        &store,
        stock_id,
        AlertRule::RiseFromLow {
            threshold_percent: 1.0,
        },
    );

    prices.set("AMD", 150.0);
    let report = evaluator.run_once().await.expect("cycle");

    assert_eq!(report.initialized, 1);
    assert_eq!(report.triggered, 0);
    assert!(notifier.messages().is_empty());
    assert_eq!(
        tracking(&store, id),
        (Some("watching_for_trough".to_string()), Some(150.0))
    );
}

#[test]
fn drop_threshold_boundary() {
    for (price, fires) in [(95.01, false), (95.0, true)] {
        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::default();
        let prices = ScriptedPrices::default();
        let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

        let stock_id = add_stock(&store, "IBM");
        let id = add_alert(
            &store,
            stock_id,
            AlertRule::DropFromHigh {
                threshold_percent: 5.0,
            },
        );
        store
            .set_alert_state(id, Some(&Tracking::new(TrackingState::WatchingForDrop, 100.0)))
            .expect("seed state");

        let report = evaluator
            .evaluate_with_prices(&HashMap::from([("IBM".to_string(), price)]))
            .expect("evaluate");
        assert_eq!(report.triggered == 1, fires, "price {price}");
    }
}

#[tokio::test]
async fn absolute_alerts_fire_once_then_deactivate() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let stock_id = add_stock(&store, "KO");
    let above = add_alert(&store, stock_id, AlertRule::RiseAbove { target_price: 60.0 });
    let below = add_alert(&store, stock_id, AlertRule::FallBelow { target_price: 40.0 });

    for price in [61.0, 65.0, 39.0, 30.0] {
        prices.set("KO", price);
        evaluator.run_once().await.expect("cycle");
    }

    assert_eq!(
        notifier.messages(),
        [
            "KO has risen above your target of $60.00 and is now at $61.00.",
            "KO has fallen below your target of $40.00 and is now at $39.00.",
        ]
    );
    assert!(!store.get_alert(above).expect("get").expect("exists").active);
    assert!(!store.get_alert(below).expect("get").expect("exists").active);
    assert!(store.get_active_alerts().expect("active").is_empty());
}

#[tokio::test]
async fn missing_price_leaves_state_unchanged() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let stock_id = add_stock(&store, "XOM");
    let id = add_alert(
        &store,
        stock_id,
        AlertRule::DropFromHigh {
            threshold_percent: 3.0,
        },
    );

    prices.set("XOM", 100.0);
    evaluator.run_once().await.expect("init");
    let before = tracking(&store, id);

    prices.remove("XOM");
    let report = evaluator.run_once().await.expect("cycle");

    assert_eq!(report.skipped, 1);
    assert_eq!(tracking(&store, id), before);
}

#[tokio::test]
async fn alerts_on_different_tickers_are_independent() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let a = add_stock(&store, "AAA");
    let b = add_stock(&store, "BBB");
    let drop = add_alert(
        &store,
        a,
        AlertRule::DropFromHigh {
            threshold_percent: 10.0,
        },
    );
    let rise = add_alert(
        &store,
        b,
        AlertRule::RiseFromLow {
            threshold_percent: 10.0,
        },
    );

    prices.set("AAA", 100.0);
    prices.set("BBB", 100.0);
    evaluator.run_once().await.expect("init");

    prices.set("AAA", 50.0);
    evaluator.run_once().await.expect("cycle");

    assert_eq!(
        tracking(&store, drop),
        (Some("watching_for_drop".to_string()), Some(100.0))
    );
    assert_eq!(
        tracking(&store, rise),
        (Some("watching_for_trough".to_string()), Some(100.0))
    );
}

#[tokio::test]
async fn malformed_record_does_not_block_others() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let stock_id = add_stock(&store, "T");
    store
        .insert_record(AlertRecord {
            id: 0,
            stock_id,
            kind: "drop_from_high".to_string(),
            threshold_percent: None,
            target_price: None,
            active: true,
            benchmark: None,
            state: None,
        })
        .expect("insert malformed");
    add_alert(&store, stock_id, AlertRule::FallBelow { target_price: 20.0 });

    prices.set("T", 19.0);
    let report = evaluator.run_once().await.expect("cycle");

    assert_eq!(report.failed, 1);
    assert_eq!(report.triggered, 1);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_push_credentials_still_reach_ui_queue() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let config = NotificationConfig {
        desktop: false,
        push_service: PushService::Pushover,
        ..NotificationConfig::default()
    };
    let (ui_queue, mut feed) = UiQueueNotifier::channel();
    let notifier = build_notifier(&config, ui_queue);
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let stock_id = add_stock(&store, "GE");
    add_alert(&store, stock_id, AlertRule::RiseAbove { target_price: 100.0 });

    prices.set("GE", 101.0);
    evaluator.run_once().await.expect("cycle");

    let delivered = feed.try_recv().expect("ui queue notification");
    assert_eq!(delivered.title, "Stock Alert: GE");
}

#[tokio::test]
async fn injection_touches_only_its_ticker() {
    let store = InMemoryStore::new();
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();
    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);

    let a = add_stock(&store, "AAA");
    let b = add_stock(&store, "BBB");
    let injected = add_alert(&store, a, AlertRule::FallBelow { target_price: 10.0 });
    let other = add_alert(
        &store,
        b,
        AlertRule::DropFromHigh {
            threshold_percent: 5.0,
        },
    );

    let report = evaluator
        .run_injected(&PriceInjection::new("aaa", 9.0).expect("injection"))
        .await
        .expect("injected");

    assert_eq!(report.evaluated, 1);
    assert!(!store.get_alert(injected).expect("get").expect("exists").active);
    assert_eq!(tracking(&store, other), (None, None));
}

#[tokio::test]
async fn state_survives_store_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("portfolio.db");
    let path = path.to_str().expect("utf-8 path");
    let prices = ScriptedPrices::default();
    let notifier = RecordingNotifier::default();

    let id = {
        let store = SqliteStore::new(path).expect("open");
        let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);
        let stock_id = add_stock(&store, "SHOP");
        let id = add_alert(
            &store,
            stock_id,
            AlertRule::DropFromHigh {
                threshold_percent: 10.0,
            },
        );
        for price in [100.0, 95.0] {
            prices.set("SHOP", price);
            evaluator.run_once().await.expect("cycle");
        }
        id
    };

    let store = SqliteStore::new(path).expect("reopen");
    assert_eq!(
        tracking(&store, id),
        (Some("watching_for_drop".to_string()), Some(100.0))
    );

    let evaluator = AlertEvaluator::new(&prices, &store, &store, &notifier);
    prices.set("SHOP", 90.0);
    let report = evaluator.run_once().await.expect("cycle after restart");

    assert_eq!(report.initialized, 0);
    assert_eq!(report.triggered, 1);
    assert_eq!(notifier.messages().len(), 1);
}
