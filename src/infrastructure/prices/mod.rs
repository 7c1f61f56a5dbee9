pub mod yahoo;

pub use yahoo::YahooPriceSource;
