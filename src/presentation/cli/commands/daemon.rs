use std::future::Future;
use std::io::{self, BufRead};
use std::time::Duration;

use colored::Colorize;
use tokio::sync::mpsc;

use crate::application::services::{run_scheduler, AlertEvaluator};
use crate::domain::entities::{InjectionError, Notification, PriceInjection};
use crate::presentation::cli::formatters::notification_fmt::format_notification;

const INJECTION_QUEUE: usize = 16;

/// Run the scheduler until Ctrl+C, printing notifications as they arrive.
///
/// Lines of the form `inject TICKER PRICE` on stdin trigger an immediate
/// evaluation of that ticker at that price.
///
/// # Errors
///
/// Returns an error if the scheduler fails fatally.
pub async fn run_daemon(
    evaluator: &AlertEvaluator<'_>,
    interval: Duration,
    feed: mpsc::UnboundedReceiver<Notification>,
) -> anyhow::Result<()> {
    let printer = tokio::spawn(print_notifications(feed));

    let (tx, rx) = mpsc::channel(INJECTION_QUEUE);
    spawn_stdin_reader(tx);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {e}");
        }
    };

    let triggered = serve(evaluator, interval, rx, shutdown).await?;

    printer.abort();
    println!("\n{triggered} alert(s) triggered this session. Stopping stockwatch...");
    Ok(())
}

/// Scheduler loop with a running count of triggered alerts.
async fn serve<S>(
    evaluator: &AlertEvaluator<'_>,
    interval: Duration,
    injections: mpsc::Receiver<PriceInjection>,
    shutdown: S,
) -> anyhow::Result<usize>
where
    S: Future<Output = ()>,
{
    let mut triggered = 0;
    run_scheduler(evaluator, interval, injections, shutdown, |report| {
        triggered += report.triggered;
    })
    .await?;
    Ok(triggered)
}

async fn print_notifications(mut feed: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = feed.recv().await {
        println!("{}", format_notification(&notification));
    }
}

/// Parse one stdin line. `None` for lines that are not injection commands.
fn parse_command(line: &str) -> Option<Result<PriceInjection, InjectionError>> {
    let rest = line.trim().strip_prefix("inject")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim().parse())
}

// A plain thread: a blocking stdin read would otherwise hold up runtime shutdown.
fn spawn_stdin_reader(tx: mpsc::Sender<PriceInjection>) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(Ok(injection)) => {
                    println!("{} {injection}", "Injecting".cyan());
                    if tx.blocking_send(injection).is_err() {
                        break;
                    }
                }
                Some(Err(e)) => eprintln!("{} {e}", "Invalid injection:".yellow()),
                None if line.trim().is_empty() => {}
                None => eprintln!("Unknown command. Usage: inject TICKER PRICE"),
            }
        }
    });
}
