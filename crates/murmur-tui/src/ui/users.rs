//! Users sidebar
//!
//! Displays the roster with a marker next to anyone typing.

use murmur_app::View;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::theme::Palette;

const TYPING_MARKER: &str = " ✎";
const SELF_SUFFIX: &str = " (you)";

/// Render the users sidebar.
pub fn render(frame: &mut Frame, view: &View<'_>, palette: Palette, area: Rect) {
    let roster = view.session.roster();
    let typing = view.session.typing();

    let items: Vec<ListItem> = roster
        .iter()
        .map(|member| {
            let own = view.identity == Some(member);
            let style = if own { palette.own } else { palette.sender };
            let suffix = if own { SELF_SUFFIX } else { "" };
            let marker = if typing.contains(member.as_str()) { TYPING_MARKER } else { "" };

            ListItem::new(Line::from(vec![
                Span::styled(member.to_string(), style),
                Span::styled(suffix, palette.muted),
                Span::styled(marker, palette.notice),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Online ({}) ", roster.len()))
        .style(palette.base);

    frame.render_widget(List::new(items).block(block), area);
}
