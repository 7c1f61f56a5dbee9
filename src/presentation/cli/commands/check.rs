use anyhow::Context;
use tokio::sync::mpsc;

use crate::application::services::{AlertEvaluator, CycleReport};
use crate::domain::entities::{Notification, PriceInjection};
use crate::presentation::cli::formatters::notification_fmt::{
    format_cycle_report, format_notification, print_no_triggers,
};

/// Run one evaluation (a full cycle, or one injected price) and print what fired.
///
/// # Errors
///
/// Returns an error if the injection cannot be parsed or the evaluation fails.
pub async fn run_check(
    evaluator: &AlertEvaluator<'_>,
    inject: Option<&str>,
    feed: &mut mpsc::UnboundedReceiver<Notification>,
) -> anyhow::Result<CycleReport> {
    let report = match inject {
        Some(raw) => {
            let injection: PriceInjection = raw
                .parse()
                .with_context(|| format!("Invalid injection '{raw}'"))?;
            evaluator.run_injected(&injection).await?
        }
        None => evaluator.run_once().await?,
    };

    let mut printed = 0;
    while let Ok(notification) = feed.try_recv() {
        println!("{}", format_notification(&notification));
        printed += 1;
    }
    if printed == 0 {
        print_no_triggers();
    }
    println!("{}", format_cycle_report(&report));

    Ok(report)
}
