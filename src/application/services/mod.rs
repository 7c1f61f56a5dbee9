pub mod evaluator;
pub mod portfolio;
pub mod scheduler;

pub use evaluator::{AlertEvaluator, CycleReport};
pub use portfolio::{load_portfolio, summarize, watch_portfolio, Holding, PortfolioSummary, Totals};
pub use scheduler::run_scheduler;
