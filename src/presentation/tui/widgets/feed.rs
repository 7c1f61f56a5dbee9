use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::domain::entities::Notification;
use crate::domain::value_objects::AlertKind;

const fn kind_color(kind: AlertKind) -> Color {
    match kind {
        AlertKind::DropFromHigh | AlertKind::FallBelow => Color::Red,
        AlertKind::RiseFromLow | AlertKind::RiseAbove => Color::Green,
    }
}

/// Render triggered notifications, newest first.
pub fn render_feed(
    frame: &mut Frame,
    notifications: &[Notification],
    list_state: &mut ListState,
    is_focused: bool,
    area: Rect,
) {
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title("Alerts")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let highlight_style = if is_focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let items: Vec<ListItem<'_>> = if notifications.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No alerts triggered yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        notifications
            .iter()
            .map(|n| {
                let line1 = Line::from(vec![Span::styled(
                    format!("{} [{}]", n.title, n.kind.label()),
                    Style::default()
                        .fg(kind_color(n.kind))
                        .add_modifier(Modifier::BOLD),
                )]);
                let time = n
                    .triggered_at
                    .with_timezone(&chrono::Local)
                    .format("%H:%M:%S");
                let line2 = Line::from(vec![Span::styled(
                    format!("  {time} {}", n.message),
                    Style::default().add_modifier(Modifier::DIM),
                )]);
                ListItem::new(vec![line1, line2])
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}
