//! Multi-select tag picker with remote autocomplete.
//!
//! Selected tags render as chips in front of a one-line text field. Typing
//! fetches suggestions from a [`TagSource`]; a trailing comma, `Enter`, or a
//! click on a suggestion commits a tag. `Backspace` on an empty field
//! removes the most recently added tag, and clicking a chip's `×` removes
//! that tag.
//!
//! The selected set is insertion-ordered and duplicate-free. Its serialized
//! form ([`TagInput::submission_value`], names joined with `", "`) is
//! rebuilt in the same call that mutates the set.
//!
//! # Example
//!
//! ```ignore
//! use quill_widgets::tag_input::TagInput;
//!
//! let tags = TagInput::new(Arc::new(client))
//!     .with_initial_tags(["rust", "async"])
//!     .with_limit(8);
//! ```

use std::cell::Cell;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use indexmap::IndexSet;
use quill_core::{Command, Component};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::candidate::Candidate;
use crate::lookup::{LookupError, TagSource};
use crate::query::{classify_tag_input, TagIntent};
use crate::request::{RequestTracker, Ticket};
use crate::suggestions::{SuggestionList, UpAtTop};
use crate::text_edit::TextEditState;

/// Separator used in [`TagInput::submission_value`].
pub const SUBMISSION_SEPARATOR: &str = ", ";

/// Minimum columns reserved for the text field after the last chip.
const MIN_INPUT_WIDTH: u16 = 10;

/// Messages for the tag picker.
#[derive(Debug, Clone)]
pub enum Message {
    KeyPress(KeyEvent),
    Paste(String),
    /// Raw mouse event, hit-tested against the last rendered area.
    Mouse(MouseEvent),
    /// Pointer entered the suggestion at this index.
    Hover(usize),
    /// Pointer clicked the suggestion at this index.
    Click(usize),
    /// Remove a tag by name (chip `×`).
    Remove(String),
    FocusGained,
    FocusLost,
    /// A suggestion fetch finished.
    SuggestionsLoaded(Ticket<String>, Result<Vec<Candidate>, LookupError>),
    /// Notification: a tag was added to the selected set.
    TagAdded(String),
    /// Notification: a tag was removed from the selected set.
    TagRemoved(String),
}

/// Style configuration for the tag picker.
#[derive(Debug, Clone)]
pub struct TagInputStyle {
    pub border: Style,
    pub focused_border: Style,
    pub chip: Style,
    pub chip_close: Style,
    pub input: Style,
    pub cursor: Style,
    pub placeholder: Style,
}

impl Default for TagInputStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            focused_border: Style::default().fg(Color::Cyan),
            chip: Style::default().fg(Color::Black).bg(Color::Blue),
            chip_close: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            input: Style::default(),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            placeholder: Style::default().fg(Color::DarkGray),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChipSlot {
    row: u16,
    x: u16,
    width: u16,
    close_x: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldLayout {
    chips: Vec<ChipSlot>,
    input_row: u16,
    input_x: u16,
    rows: u16,
}

/// Tag picker component.
pub struct TagInput {
    source: Arc<dyn TagSource>,
    editor: TextEditState,
    selected: IndexSet<String>,
    submission: String,
    suggestions: SuggestionList,
    tracker: RequestTracker<String>,
    limit: usize,
    focused: bool,
    title: String,
    placeholder: String,
    style: TagInputStyle,
    last_area: Cell<Rect>,
}

impl TagInput {
    pub fn new(source: Arc<dyn TagSource>) -> Self {
        Self {
            source,
            editor: TextEditState::new(),
            selected: IndexSet::new(),
            submission: String::new(),
            suggestions: SuggestionList::new(),
            tracker: RequestTracker::new(),
            limit: 8,
            focused: false,
            title: " Tags ".to_string(),
            placeholder: "add a tag…".to_string(),
            style: TagInputStyle::default(),
            last_area: Cell::new(Rect::default()),
        }
    }

    /// Seed the selected set, e.g. with tags already stored on the article.
    pub fn with_initial_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.insert(tag.as_ref());
        }
        self.sync_submission();
        self
    }

    /// Maximum number of suggestions requested per lookup.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_up_at_top(mut self, policy: UpAtTop) -> Self {
        self.suggestions = self.suggestions.with_up_at_top(policy);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_style(mut self, style: TagInputStyle) -> Self {
        self.style = style;
        self
    }

    /// Selected tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn tag_count(&self) -> usize {
        self.selected.len()
    }

    /// The selected set serialized for form submission.
    pub fn submission_value(&self) -> &str {
        &self.submission
    }

    /// Current raw text in the field.
    pub fn input(&self) -> String {
        self.editor.value()
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.suggestions.hide();
            self.tracker.clear();
        }
    }

    /// Add `name` (trimmed). Returns `false` when it is empty or already selected.
    pub fn add_tag(&mut self, name: &str) -> bool {
        let added = self.insert(name);
        if added {
            self.sync_submission();
        }
        added
    }

    /// Remove `name`, keeping the order of the rest. Returns `false` when absent.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        let removed = self.selected.shift_remove(name);
        if removed {
            self.sync_submission();
        }
        removed
    }

    /// Rows the bordered field needs at `width`; the dropdown goes below it.
    pub fn field_height(&self, width: u16) -> u16 {
        self.layout(width.saturating_sub(2)).rows + 2
    }

    /// Whether a pointer position falls on the field or the visible dropdown,
    /// as last rendered.
    pub fn hit(&self, column: u16, row: u16) -> bool {
        let area = self.last_area.get();
        let field = self.field_rect(area);
        let dropdown = self.suggestions.dropdown_rect(self.dropdown_area(area));
        contains(field, column, row) || dropdown.is_some_and(|d| contains(d, column, row))
    }

    /// Index of the chip whose `×` is at the given position within `area`.
    pub fn chip_hit_test(&self, area: Rect, column: u16, row: u16) -> Option<usize> {
        let inner = Block::default()
            .borders(Borders::ALL)
            .inner(self.field_rect(area));
        if row < inner.y || column < inner.x {
            return None;
        }
        let (rel_row, rel_col) = (row - inner.y, column - inner.x);
        self.layout(inner.width)
            .chips
            .iter()
            .position(|slot| slot.row == rel_row && slot.close_x == rel_col)
    }

    fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.selected.insert(name.to_string())
    }

    fn sync_submission(&mut self) {
        self.submission = self
            .selected
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(SUBMISSION_SEPARATOR);
    }

    /// Commit `name`, then reset the field and the dropdown.
    fn commit(&mut self, name: &str) -> Command<Message> {
        self.editor.clear();
        self.suggestions.hide();
        self.tracker.clear();
        let name = name.trim().to_string();
        if self.add_tag(&name) {
            tracing::debug!(tag = %name, "tag committed");
            Command::message(Message::TagAdded(name))
        } else {
            Command::none()
        }
    }

    /// Re-run query extraction after the field text changed.
    fn refresh(&mut self) -> Command<Message> {
        match classify_tag_input(&self.editor.value()) {
            TagIntent::Empty => {
                self.suggestions.hide();
                self.tracker.clear();
                Command::none()
            }
            TagIntent::Commit(name) => self.commit(&name),
            TagIntent::Query(query) => {
                let ticket = self.tracker.issue(query.clone());
                tracing::debug!(query = %query, request = ticket.id.get(), "fetching tag suggestions");
                Command::perform(self.source.suggest_tags(&query, self.limit), move |result| {
                    Message::SuggestionsLoaded(ticket, result)
                })
            }
        }
    }

    fn apply_suggestions(
        &mut self,
        ticket: Ticket<String>,
        result: Result<Vec<Candidate>, LookupError>,
    ) -> Command<Message> {
        if !self.focused || !self.tracker.is_current(&ticket) {
            tracing::debug!(query = %ticket.key, request = ticket.id.get(), "discarding stale tag suggestions");
            return Command::none();
        }
        match result {
            Ok(candidates) => {
                let fresh: Vec<Candidate> = candidates
                    .into_iter()
                    .filter(|c| !self.selected.contains(&c.identity))
                    .collect();
                self.suggestions.show(fresh, &ticket.key);
            }
            Err(err) => {
                tracing::warn!(error = %err, query = %ticket.key, "tag suggestion lookup failed");
                self.suggestions.hide();
            }
        }
        Command::none()
    }

    fn remove_last(&mut self) -> Command<Message> {
        match self.selected.pop() {
            Some(name) => {
                self.sync_submission();
                Command::message(Message::TagRemoved(name))
            }
            None => Command::none(),
        }
    }

    fn click_candidate(&mut self, index: usize) -> Command<Message> {
        match self.suggestions.get(index).map(|c| c.identity.clone()) {
            Some(identity) => self.commit(&identity),
            None => Command::none(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        let dropdown = self.suggestions.is_visible();
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.suggestions.hide();
                self.tracker.clear();
                Command::none()
            }
            (KeyCode::Down, _) if dropdown => {
                self.suggestions.move_down();
                Command::none()
            }
            (KeyCode::Up, _) if dropdown => {
                self.suggestions.move_up();
                Command::none()
            }
            (KeyCode::Enter, _) => {
                if let Some(candidate) = self.suggestions.highlighted() {
                    let identity = candidate.identity.clone();
                    return self.commit(&identity);
                }
                let raw = self.editor.value();
                if raw.trim().is_empty() {
                    Command::none()
                } else {
                    self.commit(&raw)
                }
            }
            (KeyCode::Backspace, _) => {
                if self.editor.is_empty() {
                    self.remove_last()
                } else if self.editor.delete_back() {
                    self.refresh()
                } else {
                    Command::none()
                }
            }
            (KeyCode::Delete, _) => {
                if self.editor.delete_forward() {
                    self.refresh()
                } else {
                    Command::none()
                }
            }
            (KeyCode::Left, _) => {
                self.editor.move_left();
                Command::none()
            }
            (KeyCode::Right, _) => {
                self.editor.move_right();
                Command::none()
            }
            (KeyCode::Home, _) => {
                self.editor.move_line_start();
                Command::none()
            }
            (KeyCode::End, _) => {
                self.editor.move_line_end();
                Command::none()
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.editor.insert_char(c);
                self.refresh()
            }
            _ => Command::none(),
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Command<Message> {
        let area = self.last_area.get();
        let candidate = self
            .suggestions
            .hit_test(self.dropdown_area(area), event.column, event.row);
        match event.kind {
            MouseEventKind::Moved => {
                if let Some(index) = candidate {
                    self.suggestions.hover(index);
                }
                Command::none()
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = candidate {
                    return self.click_candidate(index);
                }
                let chip = self.chip_hit_test(area, event.column, event.row);
                match chip.and_then(|i| self.selected.get_index(i).cloned()) {
                    Some(name) => self.update(Message::Remove(name)),
                    None => Command::none(),
                }
            }
            _ => Command::none(),
        }
    }

    fn layout(&self, width: u16) -> FieldLayout {
        let mut chips = Vec::with_capacity(self.selected.len());
        let (mut x, mut row) = (0u16, 0u16);
        for name in &self.selected {
            let name_width = name.width() as u16;
            let chip_width = name_width.saturating_add(4);
            if x > 0 && x.saturating_add(chip_width) > width {
                row += 1;
                x = 0;
            }
            chips.push(ChipSlot {
                row,
                x,
                width: chip_width,
                close_x: x.saturating_add(name_width + 2),
            });
            x = x.saturating_add(chip_width + 1);
        }
        let input_width = (self.editor.value().width() as u16 + 1).max(MIN_INPUT_WIDTH);
        if x > 0 && x.saturating_add(input_width) > width {
            row += 1;
            x = 0;
        }
        FieldLayout {
            chips,
            input_row: row,
            input_x: x,
            rows: row + 1,
        }
    }

    fn field_rect(&self, area: Rect) -> Rect {
        Rect {
            height: self.field_height(area.width).min(area.height),
            ..area
        }
    }

    fn dropdown_area(&self, area: Rect) -> Rect {
        let field = self.field_rect(area);
        Rect {
            y: field.bottom(),
            height: area.bottom().saturating_sub(field.bottom()),
            ..area
        }
    }

    fn input_line(&self) -> Line<'static> {
        if self.editor.is_empty() && self.selected.is_empty() && !self.focused {
            return Line::from(Span::styled(self.placeholder.clone(), self.style.placeholder));
        }
        let chars = self.editor.chars();
        let cursor = self.editor.cursor();
        let before: String = chars[..cursor].iter().collect();
        let mut spans = vec![Span::styled(before, self.style.input)];
        if self.focused {
            let at: String = chars.get(cursor).map_or(" ".to_string(), |c| c.to_string());
            spans.push(Span::styled(at, self.style.cursor));
            let after: String = chars.iter().skip(cursor + 1).collect();
            spans.push(Span::styled(after, self.style.input));
        } else {
            let after: String = chars[cursor..].iter().collect();
            spans.push(Span::styled(after, self.style.input));
        }
        Line::from(spans)
    }
}

impl Component for TagInput {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) => self.handle_key(key),
            Message::Paste(text) => {
                let flat = text.replace(['\r', '\n'], " ");
                self.editor.insert_str(&flat);
                self.refresh()
            }
            Message::Mouse(event) => self.handle_mouse(event),
            Message::Hover(index) => {
                self.suggestions.hover(index);
                Command::none()
            }
            Message::Click(index) => self.click_candidate(index),
            Message::Remove(name) => {
                if self.remove_tag(&name) {
                    Command::message(Message::TagRemoved(name))
                } else {
                    Command::none()
                }
            }
            Message::FocusGained => {
                self.set_focused(true);
                Command::none()
            }
            Message::FocusLost => {
                self.set_focused(false);
                Command::none()
            }
            Message::SuggestionsLoaded(ticket, result) => self.apply_suggestions(ticket, result),
            Message::TagAdded(_) | Message::TagRemoved(_) => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        self.last_area.set(area);
        if area.height == 0 || area.width < 3 {
            return;
        }
        let field = self.field_rect(area);
        let border = if self.focused {
            self.style.focused_border
        } else {
            self.style.border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(self.title.clone());
        let inner = block.inner(field);
        frame.render_widget(block, field);

        let layout = self.layout(inner.width);
        for (name, slot) in self.selected.iter().zip(&layout.chips) {
            if slot.row >= inner.height {
                break;
            }
            let chip = Line::from(vec![
                Span::styled(format!(" {name} "), self.style.chip),
                Span::styled("× ", self.style.chip_close),
            ]);
            let chip_area = Rect {
                x: inner.x + slot.x.min(inner.width),
                y: inner.y + slot.row,
                width: slot.width.min(inner.width.saturating_sub(slot.x)),
                height: 1,
            };
            frame.render_widget(Paragraph::new(chip), chip_area);
        }
        if layout.input_row < inner.height {
            let input_area = Rect {
                x: inner.x + layout.input_x,
                y: inner.y + layout.input_row,
                width: inner.width.saturating_sub(layout.input_x),
                height: 1,
            };
            frame.render_widget(Paragraph::new(self.input_line()), input_area);
        }

        self.suggestions.render(frame, self.dropdown_area(area));
    }

    fn focused(&self) -> bool {
        self.focused
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{key, FailingSource, StaticSource};
    use pretty_assertions::assert_eq;
    use quill_core::testing::Harness;

    fn picker(initial: &[&str]) -> Harness<TagInput> {
        let source = Arc::new(StaticSource::new([
            Candidate::new("rust").with_count(12),
            Candidate::new("rustls"),
            Candidate::new("ruby").with_color("#cc342d"),
            Candidate::new("python"),
        ]));
        let mut input = TagInput::new(source).with_initial_tags(initial.iter().copied());
        input.set_focused(true);
        Harness::new(input)
    }

    fn type_text(h: &mut Harness<TagInput>, text: &str) {
        for c in text.chars() {
            h.send(Message::KeyPress(key(KeyCode::Char(c))));
        }
    }

    fn shown(h: &Harness<TagInput>) -> Vec<String> {
        h.component()
            .suggestions()
            .candidates()
            .iter()
            .map(|c| c.identity.clone())
            .collect()
    }

    #[test]
    fn initial_tags_seed_submission_value() {
        let h = picker(&["rust", " async ", "rust", ""]);
        assert_eq!(h.component().submission_value(), "rust, async");
        assert_eq!(h.component().tag_count(), 2);
    }

    #[test]
    fn add_and_remove_keep_submission_in_sync() {
        let mut h = picker(&[]);
        let input = h.component_mut();
        assert!(input.add_tag(" rust "));
        assert!(!input.add_tag("rust"));
        assert!(!input.add_tag("   "));
        assert!(input.add_tag("cli"));
        assert!(input.add_tag("web"));
        assert_eq!(input.submission_value(), "rust, cli, web");
        assert!(input.remove_tag("cli"));
        assert!(!input.remove_tag("cli"));
        assert_eq!(input.submission_value(), "rust, web");
        assert_eq!(input.tags().collect::<Vec<_>>(), vec!["rust", "web"]);
    }

    #[test]
    fn typing_fetches_and_shows_suggestions() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        assert_eq!(h.pending_tasks(), 2);
        h.run_task(1);
        assert_eq!(shown(&h), vec!["rust", "rustls", "ruby"]);
        assert_eq!(h.component().suggestions().highlight_index(), None);
    }

    #[test]
    fn already_selected_tags_are_filtered_out() {
        let mut h = picker(&["rust"]);
        type_text(&mut h, "ru");
        h.run_task(1);
        assert_eq!(shown(&h), vec!["rustls", "ruby"]);
    }

    #[test]
    fn all_results_selected_hides_the_list() {
        let mut h = picker(&["python"]);
        type_text(&mut h, "py");
        h.run_task(1);
        assert!(!h.component().suggestions().is_visible());
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        // "ru" resolves first, then the older "r"
        h.run_task(1);
        h.run_task(0);
        assert_eq!(h.component().suggestions().query(), "ru");
        assert_eq!(shown(&h), vec!["rust", "rustls", "ruby"]);
    }

    #[test]
    fn late_results_after_focus_loss_are_discarded() {
        let mut h = picker(&[]);
        type_text(&mut h, "py");
        h.send(Message::FocusLost);
        h.run_task(1);
        assert!(!h.component().suggestions().is_visible());
    }

    #[test]
    fn trailing_comma_commits_and_clears() {
        let mut h = picker(&[]);
        type_text(&mut h, "new tag,");
        let delivered = h.drain_messages();
        assert!(matches!(&delivered[..], [Message::TagAdded(t)] if t == "new tag"));
        assert_eq!(h.component().input(), "");
        assert_eq!(h.component().submission_value(), "new tag");
    }

    #[test]
    fn comma_on_duplicate_clears_without_adding() {
        let mut h = picker(&["rust"]);
        type_text(&mut h, "rust,");
        assert!(h.drain_messages().is_empty());
        assert_eq!(h.component().input(), "");
        assert_eq!(h.component().tag_count(), 1);
    }

    #[test]
    fn enter_commits_highlighted_candidate() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.run_task(1);
        h.send(Message::KeyPress(key(KeyCode::Down)));
        h.send(Message::KeyPress(key(KeyCode::Down)));
        h.send(Message::KeyPress(key(KeyCode::Enter)));
        assert_eq!(h.component().submission_value(), "rustls");
        assert!(!h.component().suggestions().is_visible());
        assert_eq!(h.component().input(), "");
    }

    #[test]
    fn enter_without_highlight_commits_raw_text() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.run_task(1);
        h.send(Message::KeyPress(key(KeyCode::Enter)));
        assert_eq!(h.component().submission_value(), "ru");
    }

    #[test]
    fn arrow_up_from_first_clears_highlight() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.run_task(1);
        h.send(Message::KeyPress(key(KeyCode::Down)));
        h.send(Message::KeyPress(key(KeyCode::Up)));
        assert_eq!(h.component().suggestions().highlight_index(), None);
        h.send(Message::KeyPress(key(KeyCode::Enter)));
        assert_eq!(h.component().submission_value(), "ru");
    }

    #[test]
    fn hold_policy_keeps_first_highlighted() {
        let source = Arc::new(StaticSource::new([Candidate::new("rust"), Candidate::new("ruby")]));
        let mut input = TagInput::new(source).with_up_at_top(UpAtTop::Hold);
        input.set_focused(true);
        let mut h = Harness::new(input);
        type_text(&mut h, "r");
        h.run_task(0);
        h.send(Message::KeyPress(key(KeyCode::Down)));
        h.send(Message::KeyPress(key(KeyCode::Up)));
        assert_eq!(h.component().suggestions().highlight_index(), Some(0));
    }

    #[test]
    fn click_commits_candidate() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.run_task(1);
        h.send(Message::Hover(1));
        h.send(Message::Click(2));
        let delivered = h.drain_messages();
        assert!(matches!(&delivered[..], [Message::TagAdded(t)] if t == "ruby"));
    }

    #[test]
    fn backspace_on_empty_removes_last_added() {
        let mut h = picker(&["rust", "cli"]);
        h.component_mut().add_tag("web");
        h.send(Message::KeyPress(key(KeyCode::Backspace)));
        let delivered = h.drain_messages();
        assert!(matches!(&delivered[..], [Message::TagRemoved(t)] if t == "web"));
        assert_eq!(h.component().submission_value(), "rust, cli");
    }

    #[test]
    fn backspace_with_text_edits_the_field() {
        let mut h = picker(&["rust"]);
        type_text(&mut h, "ab");
        h.send(Message::KeyPress(key(KeyCode::Backspace)));
        assert_eq!(h.component().input(), "a");
        assert_eq!(h.component().tag_count(), 1);
    }

    #[test]
    fn clearing_the_field_hides_suggestions() {
        let mut h = picker(&[]);
        type_text(&mut h, "r");
        h.run_task(0);
        assert!(h.component().suggestions().is_visible());
        h.send(Message::KeyPress(key(KeyCode::Backspace)));
        assert!(!h.component().suggestions().is_visible());
        assert_eq!(h.pending_tasks(), 0);
    }

    #[test]
    fn lookup_failure_hides_the_list() {
        let mut input = TagInput::new(Arc::new(FailingSource));
        input.set_focused(true);
        let mut h = Harness::new(input);
        type_text(&mut h, "x");
        h.run_task(0);
        assert!(!h.component().suggestions().is_visible());
    }

    #[test]
    fn escape_dismisses() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.run_task(1);
        h.send(Message::KeyPress(key(KeyCode::Esc)));
        assert!(!h.component().suggestions().is_visible());
    }

    #[test]
    fn results_landing_after_escape_stay_hidden() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.send(Message::KeyPress(key(KeyCode::Esc)));
        h.run_task(1);
        assert!(!h.component().suggestions().is_visible());
        // typing again re-arms the lookup
        type_text(&mut h, "s");
        h.run_task(h.pending_tasks() - 1);
        assert_eq!(shown(&h), vec!["rust", "rustls"]);
    }

    #[test]
    fn chips_render_with_close_buttons() {
        let h = picker(&["rust", "cli"]);
        let screen = h.render_string(30, 4);
        assert!(screen.contains(" rust × "), "{screen}");
        assert!(screen.contains(" cli × "), "{screen}");
    }

    #[test]
    fn clicking_chip_close_removes_it() {
        let mut h = picker(&["rust", "cli"]);
        h.render_string(30, 6);
        // border at x=0; chip " rust × " starts at x=1, "×" at 1 + 2 + 4
        let area = Rect::new(0, 0, 30, 6);
        assert_eq!(h.component().chip_hit_test(area, 7, 1), Some(0));
        h.send(Message::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 1,
            modifiers: KeyModifiers::NONE,
        }));
        let delivered = h.drain_messages();
        assert!(matches!(&delivered[..], [Message::TagRemoved(t)] if t == "rust"));
        assert_eq!(h.component().submission_value(), "cli");
    }

    #[test]
    fn chips_wrap_to_new_rows() {
        let h = picker(&["alpha", "bravo", "charlie"]);
        // inner width 16: "alpha" (9) fits, "bravo" (9) wraps, "charlie" (11) wraps
        assert_eq!(h.component().field_height(18), 6);
    }

    #[test]
    fn dropdown_renders_below_the_field() {
        let mut h = picker(&[]);
        type_text(&mut h, "ru");
        h.run_task(1);
        let screen = h.render_string(30, 10);
        let lines: Vec<&str> = screen.lines().collect();
        assert!(lines[4].contains("rust"), "{screen}");
        assert!(lines[4].contains("12"), "{screen}");
        assert!(lines[6].contains("ruby"), "{screen}");
    }
}
