//! Join screen, shown until a display name is chosen.

use murmur_app::View;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme::Palette;

/// Render the welcome text above the name prompt.
pub fn render(frame: &mut Frame, view: &View<'_>, palette: Palette, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Welcome to murmur", palette.sender)),
        Line::from(""),
        Line::from(format!("Room: {}", view.app.server())),
        Line::from(""),
        Line::from(Span::styled("Type a display name below and press Enter.", palette.muted)),
        Line::from(Span::styled("/theme switches colours, Esc quits.", palette.muted)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Join "))
        .style(palette.base)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
