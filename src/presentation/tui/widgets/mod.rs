pub mod feed;
pub mod holdings;
