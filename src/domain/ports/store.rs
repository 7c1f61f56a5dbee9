use thiserror::Error;

use crate::domain::entities::{AlertRecord, NewAlert, NewStock, Stock};
use crate::domain::value_objects::Tracking;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
    #[error("entry not found: {0}")]
    NotFound(String),
}

pub trait StockStore: Send + Sync {
    /// Insert a holding, or update shares, cost and currency of an existing
    /// ticker in place. Returns the stock's id, which is stable across updates.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write operation fails.
    fn add_stock(&self, stock: &NewStock) -> Result<i64, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn get_stock(&self, id: i64) -> Result<Option<Stock>, StoreError>;

    /// Look a stock up by ticker (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn find_stock(&self, ticker: &str) -> Result<Option<Stock>, StoreError>;

    /// All holdings ordered by ticker.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn list_stocks(&self) -> Result<Vec<Stock>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no stock has this id.
    fn update_stock_name(&self, id: i64, name: &str) -> Result<(), StoreError>;

    /// Delete a stock together with its alerts.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no stock has this id.
    fn delete_stock(&self, id: i64) -> Result<(), StoreError>;
}

pub trait AlertStore: Send + Sync {
    /// Create the alert of this kind for the stock, or replace the existing
    /// one: its parameter is overwritten, tracking cleared and the alert
    /// re-activated. Returns the alert's id, which is stable across replacements.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write operation fails.
    fn add_alert(&self, alert: &NewAlert) -> Result<i64, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn get_alert(&self, id: i64) -> Result<Option<AlertRecord>, StoreError>;

    /// Every alert, active or not, as stored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn list_alerts(&self) -> Result<Vec<AlertRecord>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError` if the read operation fails.
    fn get_active_alerts(&self) -> Result<Vec<AlertRecord>, StoreError>;

    /// Write (or clear) benchmark and state in one statement.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no alert has this id.
    fn set_alert_state(&self, id: i64, tracking: Option<&Tracking>) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no alert has this id.
    fn set_alert_active(&self, id: i64, active: bool) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no alert has this id.
    fn delete_alert(&self, id: i64) -> Result<(), StoreError>;
}
