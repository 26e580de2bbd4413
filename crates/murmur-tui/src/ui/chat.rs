//! Chat area
//!
//! Displays the transcript, newest at the bottom, and who is typing.

use murmur_app::View;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::theme::Palette;

const BORDER_SIZE: u16 = 2;

/// Sender name the reference room uses for join notices.
const SERVER_SENDER: &str = "Server";

/// Render the chat area.
pub fn render(frame: &mut Frame, view: &View<'_>, palette: Palette, area: Rect) {
    let mut block = Block::default().borders(Borders::ALL).title(" Chat ").style(palette.base);
    if let Some(line) = typing_line(view) {
        block = block.title_bottom(Line::from(Span::styled(line, palette.notice)));
    }

    let transcript = view.session.transcript();
    let items: Vec<ListItem> = if transcript.is_empty() {
        vec![ListItem::new(Line::from(Span::styled("No messages yet", palette.muted)))]
    } else {
        transcript
            .iter()
            .map(|message| {
                let sender_style = if view.is_own(message) {
                    palette.own
                } else if message.sender() == SERVER_SENDER {
                    palette.notice
                } else {
                    palette.sender
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{}] ", message.timestamp()), palette.muted),
                    Span::styled(message.sender().to_string(), sender_style),
                    Span::raw(": "),
                    Span::raw(message.text().to_owned()),
                ]))
            })
            .collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

/// "alice is typing", excluding ourselves.
fn typing_line(view: &View<'_>) -> Option<String> {
    let others: Vec<&str> = view
        .session
        .typing()
        .iter()
        .filter(|name| view.identity != Some(*name))
        .map(|name| name.as_str())
        .collect();

    match others.as_slice() {
        [] => None,
        [one] => Some(format!(" {one} is typing... ")),
        many => Some(format!(" {} are typing... ", many.join(", "))),
    }
}
