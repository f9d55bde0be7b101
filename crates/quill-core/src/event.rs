use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent};

/// Terminal events produced by the runtime's event loop.
///
/// Every event is offered to [`Model::handle_event`](crate::Model::handle_event)
/// before anything else happens. Each variant wraps the corresponding
/// [`crossterm::event::Event`] payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// Terminal resized to (columns, rows). Also sent once at startup.
    Resize(u16, u16),
    /// Terminal window gained focus.
    FocusGained,
    /// Terminal window lost focus.
    FocusLost,
    /// Bracketed paste content.
    Paste(String),
}

impl From<crossterm::event::Event> for TerminalEvent {
    fn from(event: crossterm::event::Event) -> Self {
        match event {
            crossterm::event::Event::Key(k) => TerminalEvent::Key(k),
            crossterm::event::Event::Mouse(m) => TerminalEvent::Mouse(m),
            crossterm::event::Event::Resize(w, h) => TerminalEvent::Resize(w, h),
            crossterm::event::Event::FocusGained => TerminalEvent::FocusGained,
            crossterm::event::Event::FocusLost => TerminalEvent::FocusLost,
            crossterm::event::Event::Paste(s) => TerminalEvent::Paste(s),
        }
    }
}

impl TerminalEvent {
    /// The key event, if this is a key *press* (repeats count, releases do not).
    ///
    /// Terminals with the kitty keyboard protocol report releases as separate
    /// events; widgets only ever act on presses.
    pub fn key_press(&self) -> Option<KeyEvent> {
        match self {
            TerminalEvent::Key(key) if key.kind != KeyEventKind::Release => Some(*key),
            _ => None,
        }
    }
}
