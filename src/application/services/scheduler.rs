use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::evaluator::{AlertEvaluator, CycleReport};
use crate::domain::entities::PriceInjection;

/// Drive the evaluator: a full cycle on every tick, an injected evaluation as
/// soon as one arrives, until `shutdown` resolves.
///
/// The first tick fires immediately. A closed injection channel only disables
/// injections; ticks keep running. Failed cycles are logged and retried on the
/// next tick.
///
/// # Errors
///
/// Currently infallible; the `Result` leaves room for fatal scheduler errors.
pub async fn run_scheduler<S, F>(
    evaluator: &AlertEvaluator<'_>,
    interval: Duration,
    mut injections: mpsc::Receiver<PriceInjection>,
    shutdown: S,
    mut on_cycle: F,
) -> anyhow::Result<()>
where
    S: Future<Output = ()>,
    F: FnMut(&CycleReport),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);
    let mut injections_open = true;

    tracing::info!("Scheduler started (every {}s)", interval.as_secs());

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Scheduler stopping");
                break;
            }
            received = injections.recv(), if injections_open => {
                let Some(injection) = received else {
                    tracing::debug!("Injection channel closed");
                    injections_open = false;
                    continue;
                };
                match evaluator.run_injected(&injection).await {
                    Ok(report) => on_cycle(&report),
                    Err(e) => tracing::warn!("Injected evaluation failed: {e:#}"),
                }
            }
            _ = ticker.tick() => {
                match evaluator.run_once().await {
                    Ok(report) => on_cycle(&report),
                    Err(e) => tracing::error!("Evaluation cycle failed: {e:#}"),
                }
            }
        }
    }

    Ok(())
}
