//! Colour palettes for the light and dark themes.

use murmur_app::Theme;
use ratatui::style::{Color, Modifier, Style};

/// Styles used across the widgets.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub base: Style,
    pub muted: Style,
    pub sender: Style,
    pub own: Style,
    pub notice: Style,
    pub status: Style,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                base: Style::default().fg(Color::Black).bg(Color::White),
                muted: Style::default().fg(Color::Gray).bg(Color::White),
                sender: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                own: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                notice: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                status: Style::default().bg(Color::Gray).fg(Color::Black),
            },
            Theme::Dark => Self {
                base: Style::default().fg(Color::White).bg(Color::Black),
                muted: Style::default().fg(Color::DarkGray).bg(Color::Black),
                sender: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                own: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                notice: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                status: Style::default().bg(Color::DarkGray).fg(Color::White),
            },
        }
    }
}
