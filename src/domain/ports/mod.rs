pub mod notifier;
pub mod price_source;
pub mod store;

pub use notifier::{NotificationError, Notifier};
pub use price_source::{PriceError, PriceSource};
pub use store::{AlertStore, StockStore, StoreError};
