pub mod alert;
pub mod check;
pub mod daemon;
pub mod portfolio;
pub mod stock;
pub mod watch;
