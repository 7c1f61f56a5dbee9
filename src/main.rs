use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use stockwatch::application::config::AppConfig;
use stockwatch::application::services::AlertEvaluator;
use stockwatch::domain::ports::{PriceSource, StockStore};
use stockwatch::infrastructure::notifications::{build_notifier, UiQueueNotifier};
use stockwatch::infrastructure::persistence::SqliteStore;
use stockwatch::infrastructure::prices::YahooPriceSource;
use stockwatch::presentation::cli::app::{Cli, Commands};
use stockwatch::presentation::cli::commands::alert::run_alert;
use stockwatch::presentation::cli::commands::check::run_check;
use stockwatch::presentation::cli::commands::daemon::run_daemon;
use stockwatch::presentation::cli::commands::portfolio::run_portfolio;
use stockwatch::presentation::cli::commands::stock::run_stock;
use stockwatch::presentation::cli::commands::watch::{run_watch, PortfolioFeed};

fn print_banner(config: &AppConfig) {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  STOCKWATCH: portfolio alerts".bold().cyan());
    println!(
        "  {} every {}s. Type `inject TICKER PRICE` to test.",
        "Checking".dimmed(),
        config.general.interval().as_secs()
    );
    println!("{}", "━".repeat(40).cyan());
}

fn setup_tracing(verbose: bool, dashboard: bool) {
    // Log lines would corrupt the dashboard's alternate screen.
    let filter = if dashboard {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<SqliteStore>> {
    let store = SqliteStore::new(&config.database.path)
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose, matches!(cli.command, Some(Commands::Watch)));

    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };

    // Manual DI: main.rs is the only place that knows concrete types
    let store = open_store(&config)?;
    let prices = Arc::new(YahooPriceSource::new(&config.prices)?);
    let (ui_queue, feed) = UiQueueNotifier::channel();
    let notifier = build_notifier(&config.notifications, ui_queue);
    let evaluator = AlertEvaluator::new(
        prices.as_ref(),
        store.as_ref(),
        store.as_ref(),
        &notifier,
    );

    match cli.command {
        Some(Commands::Daemon) | None => {
            print_banner(&config);
            run_daemon(&evaluator, config.general.interval(), feed).await?;
        }
        Some(Commands::Check { inject }) => {
            let mut feed = feed;
            run_check(&evaluator, inject.as_deref(), &mut feed).await?;
        }
        Some(Commands::Stock(command)) => run_stock(command, store.as_ref())?,
        Some(Commands::Alert(command)) => run_alert(command, store.as_ref(), store.as_ref())?,
        Some(Commands::Portfolio { json }) => {
            run_portfolio(store.as_ref(), prices.as_ref(), json).await?;
        }
        Some(Commands::Watch) => {
            let portfolio = PortfolioFeed {
                stocks: Arc::clone(&store) as Arc<dyn StockStore>,
                prices: Arc::clone(&prices) as Arc<dyn PriceSource>,
                refresh: config.dashboard.refresh(),
            };
            run_watch(&evaluator, config.general.interval(), portfolio, feed).await?;
        }
    }

    Ok(())
}
