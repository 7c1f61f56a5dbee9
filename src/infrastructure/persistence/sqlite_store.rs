use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::entities::{AlertRecord, NewAlert, NewStock, Stock};
use crate::domain::ports::store::{AlertStore, StockStore, StoreError};
use crate::domain::value_objects::Tracking;

use super::migrations;

const STOCK_COLUMNS: &str = "id, ticker, full_name, COALESCE(shares, 0), \
     COALESCE(purchase_price, 0), COALESCE(currency, 'USD')";

const ALERT_COLUMNS: &str = "id, stock_id, alert_type, threshold_percent, target_price, \
     COALESCE(is_active, 1), last_benchmark_price, current_state";

/// SQLite-backed persistent store for stocks and alerts.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new `SQLite` store at the given path.
    ///
    /// Expands `~`, creates parent directories, opens connection,
    /// sets WAL mode and pragmas, and initializes schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the database cannot be opened or initialized.
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let expanded = shellexpand::tilde(path);
        let db_path = PathBuf::from(expanded.as_ref());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        let conn =
            Connection::open(&db_path).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Self::configure(conn)
    }

    /// Private in-memory database with the full schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        migrations::initialize_schema(&conn).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))
    }

    fn query_alerts(&self, filter: &str) -> Result<Vec<AlertRecord>, StoreError> {
        let conn = self.read()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ALERT_COLUMNS} FROM alerts {filter} ORDER BY stock_id, id"
            ))
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        let alerts = stmt
            .query_map([], parse_alert_row)
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        drop(stmt);
        drop(conn);
        Ok(alerts)
    }
}

fn parse_stock_row(row: &rusqlite::Row<'_>) -> Result<Stock, rusqlite::Error> {
    Ok(Stock {
        id: row.get(0)?,
        ticker: row.get(1)?,
        name: row.get(2)?,
        shares: row.get(3)?,
        average_cost: row.get(4)?,
        currency: row.get(5)?,
    })
}

fn parse_alert_row(row: &rusqlite::Row<'_>) -> Result<AlertRecord, rusqlite::Error> {
    let active: i64 = row.get(5)?;
    Ok(AlertRecord {
        id: row.get(0)?,
        stock_id: row.get(1)?,
        kind: row.get(2)?,
        threshold_percent: row.get(3)?,
        target_price: row.get(4)?,
        active: active != 0,
        benchmark: row.get(6)?,
        state: row.get(7)?,
    })
}

fn expect_one(changed: usize, what: &str, id: i64) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::NotFound(format!("{what} {id}")))
    } else {
        Ok(())
    }
}

impl StockStore for SqliteStore {
    fn add_stock(&self, stock: &NewStock) -> Result<i64, StoreError> {
        let conn = self.write()?;
        let id = conn
            .query_row(
                "INSERT INTO stocks (ticker, shares, purchase_price, currency) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(ticker) DO UPDATE SET \
                     shares = excluded.shares, \
                     purchase_price = excluded.purchase_price, \
                     currency = excluded.currency \
                 RETURNING id",
                params![stock.ticker, stock.shares, stock.average_cost, stock.currency],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        Ok(id)
    }

    fn get_stock(&self, id: i64) -> Result<Option<Stock>, StoreError> {
        let conn = self.read()?;
        let stock = conn
            .query_row(
                &format!("SELECT {STOCK_COLUMNS} FROM stocks WHERE id = ?1"),
                params![id],
                parse_stock_row,
            )
            .optional()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        drop(conn);
        Ok(stock)
    }

    fn find_stock(&self, ticker: &str) -> Result<Option<Stock>, StoreError> {
        let conn = self.read()?;
        let stock = conn
            .query_row(
                &format!("SELECT {STOCK_COLUMNS} FROM stocks WHERE ticker = ?1"),
                params![ticker.trim().to_uppercase()],
                parse_stock_row,
            )
            .optional()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        drop(conn);
        Ok(stock)
    }

    fn list_stocks(&self) -> Result<Vec<Stock>, StoreError> {
        let conn = self.read()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {STOCK_COLUMNS} FROM stocks ORDER BY ticker"))
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        let stocks = stmt
            .query_map([], parse_stock_row)
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        drop(stmt);
        drop(conn);
        Ok(stocks)
    }

    fn update_stock_name(&self, id: i64, name: &str) -> Result<(), StoreError> {
        let conn = self.write()?;
        let changed = conn
            .execute(
                "UPDATE stocks SET full_name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        expect_one(changed, "stock", id)
    }

    fn delete_stock(&self, id: i64) -> Result<(), StoreError> {
        let mut conn = self.write()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        // Legacy tables have no ON DELETE CASCADE.
        tx.execute("DELETE FROM alerts WHERE stock_id = ?1", params![id])
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let changed = tx
            .execute("DELETE FROM stocks WHERE id = ?1", params![id])
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        tx.commit()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        expect_one(changed, "stock", id)
    }
}

impl AlertStore for SqliteStore {
    fn add_alert(&self, alert: &NewAlert) -> Result<i64, StoreError> {
        let conn = self.write()?;
        let id = conn
            .query_row(
                "INSERT INTO alerts (stock_id, alert_type, threshold_percent, target_price, is_active) \
                 VALUES (?1, ?2, ?3, ?4, 1) \
                 ON CONFLICT(stock_id, alert_type) DO UPDATE SET \
                     threshold_percent = excluded.threshold_percent, \
                     target_price = excluded.target_price, \
                     is_active = 1, \
                     last_benchmark_price = NULL, \
                     current_state = NULL \
                 RETURNING id",
                params![
                    alert.stock_id,
                    alert.rule.kind().as_str(),
                    alert.rule.threshold_percent(),
                    alert.rule.target_price(),
                ],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        Ok(id)
    }

    fn get_alert(&self, id: i64) -> Result<Option<AlertRecord>, StoreError> {
        let conn = self.read()?;
        let alert = conn
            .query_row(
                &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?1"),
                params![id],
                parse_alert_row,
            )
            .optional()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        drop(conn);
        Ok(alert)
    }

    fn list_alerts(&self) -> Result<Vec<AlertRecord>, StoreError> {
        self.query_alerts("")
    }

    fn get_active_alerts(&self) -> Result<Vec<AlertRecord>, StoreError> {
        self.query_alerts("WHERE COALESCE(is_active, 1) != 0")
    }

    fn set_alert_state(&self, id: i64, tracking: Option<&Tracking>) -> Result<(), StoreError> {
        let conn = self.write()?;
        let changed = conn
            .execute(
                "UPDATE alerts SET current_state = ?1, last_benchmark_price = ?2 WHERE id = ?3",
                params![
                    tracking.map(|t| t.state.as_str()),
                    tracking.map(|t| t.benchmark),
                    id
                ],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        expect_one(changed, "alert", id)
    }

    fn set_alert_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        let conn = self.write()?;
        let changed = conn
            .execute(
                "UPDATE alerts SET is_active = ?1 WHERE id = ?2",
                params![active, id],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        expect_one(changed, "alert", id)
    }

    fn delete_alert(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write()?;
        let changed = conn
            .execute("DELETE FROM alerts WHERE id = ?1", params![id])
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        drop(conn);
        expect_one(changed, "alert", id)
    }
}
