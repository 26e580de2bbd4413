//! Input line
//!
//! Displays the composer with cursor.

use murmur_app::InputState;
use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
};

use super::theme::Palette;

const PROMPT_WIDTH: u16 = 3; // "> " plus border
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the input line under `title`.
pub fn render(frame: &mut Frame, input: &InputState, title: &str, palette: Palette, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title);

    let paragraph =
        Paragraph::new(format!("> {}", input.buffer())).style(palette.base).block(block);
    frame.render_widget(paragraph, area);

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
    let cursor_offset = cursor.min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
