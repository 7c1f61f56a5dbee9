pub mod alert;
pub mod notification;
pub mod quote;
pub mod stock;

pub use alert::{Alert, AlertError, AlertRecord, AlertRule, NewAlert};
pub use notification::Notification;
pub use quote::{InjectionError, PriceInjection, PriceQuote};
pub use stock::{NewStock, Stock, StockError};
