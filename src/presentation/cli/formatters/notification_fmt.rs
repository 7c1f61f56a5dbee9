use colored::Colorize;

use crate::application::services::CycleReport;
use crate::domain::entities::Notification;
use crate::domain::value_objects::AlertKind;

/// Strips ANSI/OSC escape sequences from a string to prevent terminal injection.
fn sanitize_terminal(input: &str) -> String {
    input.chars().filter(|c| *c != '\x1b').collect()
}

fn kind_badge(kind: AlertKind) -> String {
    let label = format!(" {} ", kind.label());
    match kind {
        AlertKind::DropFromHigh | AlertKind::FallBelow => {
            format!("{}", label.on_red().white().bold())
        }
        AlertKind::RiseFromLow | AlertKind::RiseAbove => {
            format!("{}", label.on_green().black().bold())
        }
    }
}

/// One notification as printed by the daemon and `check`.
#[must_use]
pub fn format_notification(notification: &Notification) -> String {
    let time = notification
        .triggered_at
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S")
        .to_string();
    format!(
        "{} {} {}\n  {}",
        time.dimmed(),
        kind_badge(notification.kind),
        sanitize_terminal(&notification.title).bold(),
        sanitize_terminal(&notification.message)
    )
}

#[must_use]
pub fn format_cycle_report(report: &CycleReport) -> String {
    let line = format!(
        "{} alert(s) evaluated, {} triggered, {} initialized, {} skipped, {} failed ({} quote(s))",
        report.evaluated,
        report.triggered,
        report.initialized,
        report.skipped,
        report.failed,
        report.quotes
    );
    if report.failed > 0 {
        line.yellow().to_string()
    } else {
        line.dimmed().to_string()
    }
}

pub fn print_no_triggers() {
    println!("{}", "No alerts triggered".green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Stock;
    use colored::control;

    fn disable_colors() {
        control::set_override(false);
    }

    fn make_notification(kind: AlertKind) -> Notification {
        let stock = Stock {
            id: 1,
            ticker: "AAPL".to_string(),
            name: Some("Apple Inc.".to_string()),
            shares: 1.0,
            average_cost: 1.0,
            currency: "USD".to_string(),
        };
        Notification::for_trigger(&stock, kind, 150.0, 160.0)
    }

    #[test]
    fn notification_has_title_and_message() {
        disable_colors();
        let output = format_notification(&make_notification(AlertKind::FallBelow));
        assert!(output.contains("Fall below target"));
        assert!(output.contains("Stock Alert: AAPL"));
        assert!(output.contains(
            "AAPL has fallen below your target of $160.00 and is now at $150.00."
        ));
    }

    #[test]
    fn escape_sequences_are_stripped() {
        disable_colors();
        let mut notification = make_notification(AlertKind::RiseAbove);
        notification.message = "\x1b]0;pwned\x07 moved".to_string();
        let output = format_notification(&notification);
        assert!(!output.contains('\x1b'));
        assert!(output.contains("moved"));
    }

    #[test]
    fn cycle_report_lists_counts() {
        disable_colors();
        let report = CycleReport {
            evaluated: 4,
            initialized: 1,
            triggered: 2,
            skipped: 1,
            failed: 0,
            quotes: 3,
        };
        assert_eq!(
            format_cycle_report(&report),
            "4 alert(s) evaluated, 2 triggered, 1 initialized, 1 skipped, 0 failed (3 quote(s))"
        );
    }
}
