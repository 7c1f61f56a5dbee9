use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::domain::entities::{AlertRecord, NewAlert, NewStock, Stock};
use crate::domain::ports::store::{AlertStore, StockStore, StoreError};
use crate::domain::value_objects::Tracking;

/// In-memory store for testing purposes.
pub struct InMemoryStore {
    stocks: Mutex<Vec<Stock>>,
    alerts: Mutex<Vec<AlertRecord>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stocks: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a raw alert row as-is, bypassing validation. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the lock is poisoned.
    pub fn insert_record(&self, mut record: AlertRecord) -> Result<i64, StoreError> {
        let id = self.next_id();
        record.id = id;
        self.alerts
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .push(record);
        Ok(id)
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn update_alert(
        &self,
        id: i64,
        apply: impl FnOnce(&mut AlertRecord),
    ) -> Result<(), StoreError> {
        let mut alerts = self
            .alerts
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        let record = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("alert {id}")))?;
        apply(record);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StockStore for InMemoryStore {
    fn add_stock(&self, stock: &NewStock) -> Result<i64, StoreError> {
        let mut stocks = self
            .stocks
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;

        if let Some(existing) = stocks.iter_mut().find(|s| s.ticker == stock.ticker) {
            existing.shares = stock.shares;
            existing.average_cost = stock.average_cost;
            existing.currency.clone_from(&stock.currency);
            return Ok(existing.id);
        }

        let id = self.next_id();
        stocks.push(Stock {
            id,
            ticker: stock.ticker.clone(),
            name: None,
            shares: stock.shares,
            average_cost: stock.average_cost,
            currency: stock.currency.clone(),
        });
        Ok(id)
    }

    fn get_stock(&self, id: i64) -> Result<Option<Stock>, StoreError> {
        Ok(self
            .stocks
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    fn find_stock(&self, ticker: &str) -> Result<Option<Stock>, StoreError> {
        let ticker = ticker.trim().to_uppercase();
        Ok(self
            .stocks
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .iter()
            .find(|s| s.ticker == ticker)
            .cloned())
    }

    fn list_stocks(&self) -> Result<Vec<Stock>, StoreError> {
        let mut stocks = self
            .stocks
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .clone();
        stocks.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(stocks)
    }

    fn update_stock_name(&self, id: i64, name: &str) -> Result<(), StoreError> {
        let mut stocks = self
            .stocks
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        let stock = stocks
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("stock {id}")))?;
        stock.name = Some(name.to_string());
        Ok(())
    }

    fn delete_stock(&self, id: i64) -> Result<(), StoreError> {
        let mut stocks = self
            .stocks
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        let before = stocks.len();
        stocks.retain(|s| s.id != id);
        if stocks.len() == before {
            return Err(StoreError::NotFound(format!("stock {id}")));
        }
        drop(stocks);

        self.alerts
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .retain(|a| a.stock_id != id);
        Ok(())
    }
}

impl AlertStore for InMemoryStore {
    fn add_alert(&self, alert: &NewAlert) -> Result<i64, StoreError> {
        let stock_exists = self
            .stocks
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .iter()
            .any(|s| s.id == alert.stock_id);
        if !stock_exists {
            return Err(StoreError::WriteFailed(format!(
                "stock {} does not exist",
                alert.stock_id
            )));
        }

        let kind = alert.rule.kind().as_str();
        let mut alerts = self
            .alerts
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;

        if let Some(existing) = alerts
            .iter_mut()
            .find(|a| a.stock_id == alert.stock_id && a.kind == kind)
        {
            existing.threshold_percent = alert.rule.threshold_percent();
            existing.target_price = alert.rule.target_price();
            existing.active = true;
            existing.benchmark = None;
            existing.state = None;
            return Ok(existing.id);
        }

        let id = self.next_id();
        alerts.push(AlertRecord {
            id,
            stock_id: alert.stock_id,
            kind: kind.to_string(),
            threshold_percent: alert.rule.threshold_percent(),
            target_price: alert.rule.target_price(),
            active: true,
            benchmark: None,
            state: None,
        });
        Ok(id)
    }

    fn get_alert(&self, id: i64) -> Result<Option<AlertRecord>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    fn list_alerts(&self) -> Result<Vec<AlertRecord>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .clone())
    }

    fn get_active_alerts(&self) -> Result<Vec<AlertRecord>, StoreError> {
        Ok(self
            .alerts
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .iter()
            .filter(|a| a.active)
            .cloned()
            .collect())
    }

    fn set_alert_state(&self, id: i64, tracking: Option<&Tracking>) -> Result<(), StoreError> {
        self.update_alert(id, |record| {
            record.benchmark = tracking.map(|t| t.benchmark);
            record.state = tracking.map(|t| t.state.as_str().to_string());
        })
    }

    fn set_alert_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        self.update_alert(id, |record| record.active = active)
    }

    fn delete_alert(&self, id: i64) -> Result<(), StoreError> {
        let mut alerts = self
            .alerts
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        if alerts.len() == before {
            return Err(StoreError::NotFound(format!("alert {id}")));
        }
        Ok(())
    }
}
