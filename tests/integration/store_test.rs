#![allow(clippy::expect_used)]

use stockwatch::domain::entities::{Alert, AlertRule, NewAlert, NewStock};
use stockwatch::domain::ports::{AlertStore, StockStore, StoreError};
use stockwatch::domain::value_objects::{AlertKind, Tracking, TrackingState};
use stockwatch::infrastructure::persistence::{InMemoryStore, SqliteStore};

trait Store: StockStore + AlertStore {}
impl<T: StockStore + AlertStore> Store for T {}

fn stores() -> Vec<(&'static str, Box<dyn Store>)> {
    vec![
        ("in-memory", Box::new(InMemoryStore::new())),
        (
            "sqlite",
            Box::new(SqliteStore::open_in_memory().expect("sqlite in memory")),
        ),
    ]
}

fn new_stock(ticker: &str) -> NewStock {
    NewStock::new(ticker, 3.0, 12.5, Some("CAD")).expect("stock")
}

#[test]
fn stock_lifecycle_behaves_the_same() {
    for (name, store) in stores() {
        let id = store.add_stock(&new_stock("shop.to")).expect("add");
        assert_eq!(store.add_stock(&new_stock("SHOP.TO")).expect("re-add"), id, "{name}");

        store.update_stock_name(id, "Shopify Inc.").expect("name");
        let stock = store.find_stock("shop.to").expect("find").expect("exists");
        assert_eq!(stock.display_name(), "Shopify Inc.", "{name}");
        assert_eq!(stock.currency, "CAD", "{name}");

        store.delete_stock(id).expect("delete");
        assert!(store.get_stock(id).expect("get").is_none(), "{name}");
        assert!(
            matches!(store.delete_stock(id), Err(StoreError::NotFound(_))),
            "{name}"
        );
    }
}

#[test]
fn one_alert_per_kind_and_stock() {
    for (name, store) in stores() {
        let stock_id = store.add_stock(&new_stock("RY")).expect("add");
        let first = store
            .add_alert(
                &NewAlert::new(
                    stock_id,
                    AlertRule::DropFromHigh {
                        threshold_percent: 4.0,
                    },
                )
                .expect("alert"),
            )
            .expect("add alert");
        store
            .set_alert_state(first, Some(&Tracking::new(TrackingState::WatchingForDrop, 80.0)))
            .expect("state");

        let replaced = store
            .add_alert(
                &NewAlert::new(
                    stock_id,
                    AlertRule::DropFromHigh {
                        threshold_percent: 6.0,
                    },
                )
                .expect("alert"),
            )
            .expect("replace alert");
        store
            .add_alert(
                &NewAlert::new(stock_id, AlertRule::RiseAbove { target_price: 99.0 }).expect("alert"),
            )
            .expect("second kind");

        assert_eq!(replaced, first, "{name}");
        let alerts = store.list_alerts().expect("list");
        assert_eq!(alerts.len(), 2, "{name}");

        let alert = Alert::try_from(store.get_alert(first).expect("get").expect("exists"))
            .expect("valid alert");
        assert_eq!(alert.rule.threshold_percent(), Some(6.0), "{name}");
        assert_eq!(alert.tracking, None, "{name}");
    }
}

#[test]
fn deactivated_alerts_are_not_active() {
    for (name, store) in stores() {
        let stock_id = store.add_stock(&new_stock("BNS")).expect("add");
        let id = store
            .add_alert(
                &NewAlert::new(stock_id, AlertRule::FallBelow { target_price: 50.0 }).expect("alert"),
            )
            .expect("add alert");

        store.set_alert_active(id, false).expect("disable");
        assert!(store.get_active_alerts().expect("active").is_empty(), "{name}");
        assert_eq!(store.list_alerts().expect("all").len(), 1, "{name}");

        store.set_alert_active(id, true).expect("enable");
        assert_eq!(store.get_active_alerts().expect("active").len(), 1, "{name}");
    }
}

#[test]
fn removing_a_stock_removes_its_alerts() {
    for (name, store) in stores() {
        let keep = store.add_stock(&new_stock("TD")).expect("add");
        let gone = store.add_stock(&new_stock("CM")).expect("add");
        for stock_id in [keep, gone] {
            store
                .add_alert(
                    &NewAlert::new(
                        stock_id,
                        AlertRule::RiseFromLow {
                            threshold_percent: 2.0,
                        },
                    )
                    .expect("alert"),
                )
                .expect("add alert");
        }

        store.delete_stock(gone).expect("delete");
        let remaining = store.list_alerts().expect("list");
        assert_eq!(remaining.len(), 1, "{name}");
        assert_eq!(remaining[0].stock_id, keep, "{name}");
    }
}

#[test]
fn legacy_database_is_upgraded_on_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("legacy.db");
    {
        let conn = rusqlite::Connection::open(&path).expect("legacy db");
        conn.execute_batch(
            "CREATE TABLE stocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL UNIQUE,
                shares REAL,
                purchase_price REAL
            );
            CREATE TABLE alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stock_id INTEGER,
                alert_type TEXT,
                threshold_percent REAL,
                is_active INTEGER DEFAULT 1,
                last_benchmark_price REAL,
                current_state TEXT
            );
            INSERT INTO stocks (ticker, shares, purchase_price) VALUES ('AAPL', 5, 150);
            INSERT INTO alerts (stock_id, alert_type, threshold_percent, is_active,
                                last_benchmark_price, current_state)
                VALUES (1, 'Price Drops From Recent High', 8, 1, 190.0, 'watching_for_drop');",
        )
        .expect("legacy schema");
    }

    let store = SqliteStore::new(path.to_str().expect("utf-8 path")).expect("open legacy");

    let stock = store.find_stock("AAPL").expect("find").expect("exists");
    assert_eq!(stock.currency, "USD");
    assert_eq!(stock.name, None);

    let records = store.get_active_alerts().expect("active");
    assert_eq!(records.len(), 1);
    let alert = Alert::try_from(records[0].clone()).expect("legacy alert parses");
    assert_eq!(alert.kind(), AlertKind::DropFromHigh);
    assert_eq!(
        alert.tracking,
        Some(Tracking::new(TrackingState::WatchingForDrop, 190.0))
    );
}
