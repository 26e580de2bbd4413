//! UI rendering
//!
//! Rendering functions that turn a [`View`] into terminal output using
//! ratatui widgets. Nothing here performs I/O or mutates state.

mod chat;
mod input;
mod join;
mod status;
mod theme;
mod users;

use murmur_app::View;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use self::theme::Palette;

/// Render the entire UI.
///
/// Without an identity only the join screen is shown; the room view needs a
/// session.
pub fn render(frame: &mut Frame, view: &View<'_>) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let palette = Palette::for_theme(view.app.theme());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    let prompt = if view.identity.is_some() {
        render_main_area(frame, view, palette, *main_area);
        " Message "
    } else {
        join::render(frame, view, palette, *main_area);
        " Display name "
    };
    input::render(frame, view.app.input(), prompt, palette, *input_area);
    status::render(frame, view, palette, *status_area);
}

/// Render the main area (chat + users sidebar).
fn render_main_area(frame: &mut Frame, view: &View<'_>, palette: Palette, area: Rect) {
    const USER_SIDEBAR_WIDTH: u16 = 22;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(CHAT_AREA_MIN_WIDTH), Constraint::Length(USER_SIDEBAR_WIDTH)])
        .split(area);

    let [chat_area, users_area] = chunks.as_ref() else {
        return;
    };

    chat::render(frame, view, palette, *chat_area);
    users::render(frame, view, palette, *users_area);
}

#[cfg(test)]
mod tests {
    use murmur_app::{App, AppEvent, KeyInput};
    use murmur_core::{Identity, SyncState};
    use murmur_proto::{ChatMessage, ServerEvent};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(view: &View<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, view)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn message(name: &str, text: &str, time: &str) -> ServerEvent {
        ServerEvent::Message(ChatMessage { name: name.into(), text: text.into(), time: time.into() })
    }

    #[test]
    fn join_screen_without_identity() {
        let app = App::new("offline");
        let session = SyncState::new();
        let screen = draw(&View::new(&app, &session, None));

        assert!(screen.contains("Welcome to murmur"));
        assert!(screen.contains("Display name"));
        assert!(screen.contains("Not joined"));
        assert!(!screen.contains("Online ("));
    }

    #[test]
    fn room_view_shows_transcript_roster_and_typing() {
        let app = App::new("ws://chat.local");
        let alice = Identity::new("alice").unwrap();
        let session = SyncState::new()
            .apply(message("bob", "hello there", "10:00:00"))
            .apply(ServerEvent::UserList(vec!["alice".into(), "bob".into()]))
            .apply(ServerEvent::Typing(vec!["alice".into(), "bob".into()]));

        let screen = draw(&View::new(&app, &session, Some(&alice)));

        assert!(screen.contains("[10:00:00] bob: hello there"));
        assert!(screen.contains("Online (2)"));
        assert!(screen.contains("alice (you)"));
        assert!(screen.contains("bob is typing"));
        assert!(!screen.contains("alice is typing"));
        assert!(screen.contains("ws://chat.local"));
    }

    #[test]
    fn only_the_newest_messages_fit() {
        let app = App::new("offline");
        let alice = Identity::new("alice").unwrap();
        let session = (0..40).fold(SyncState::new(), |state, n| {
            state.apply(message("bob", &format!("line {n:02}"), "10:00:00"))
        });

        let screen = draw(&View::new(&app, &session, Some(&alice)));

        assert!(screen.contains("line 39"));
        assert!(!screen.contains("line 00"));
    }

    #[test]
    fn status_shows_theme_and_message() {
        let mut app = App::new("offline");
        app.toggle_theme();
        "/bogus".chars().for_each(|c| {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        });
        app.handle(AppEvent::Key(KeyInput::Enter));

        let session = SyncState::new();
        let screen = draw(&View::new(&app, &session, None));

        assert!(screen.contains("dark theme"));
        assert!(screen.contains("Unknown command: /bogus"));
    }
}
