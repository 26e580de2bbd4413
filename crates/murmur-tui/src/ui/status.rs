//! Status bar
//!
//! Displays connection state, server, theme and the last status message.

use murmur_app::{ConnectionState, View};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Palette;

/// Render the status bar.
pub fn render(frame: &mut Frame, view: &View<'_>, palette: Palette, area: Rect) {
    let app = view.app;
    let connection_status = match app.connection_state() {
        ConnectionState::Idle => Span::styled("Not joined", Style::default().fg(Color::Gray)),
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Online => Span::styled(
            "Online",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        ConnectionState::Offline => {
            Span::styled("Reconnecting...", Style::default().fg(Color::Red))
        },
    };

    let who = view.identity.map_or_else(String::new, |identity| format!(" as {identity}"));
    let mut spans = vec![
        Span::raw(" "),
        connection_status,
        Span::raw(format!("{who} | {} | {} theme", app.server(), app.theme())),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::raw(format!(" | {message}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(palette.status), area);
}
