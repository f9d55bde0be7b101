//! Multi-line article body with `[[wiki link]]` autocomplete and validation.
//!
//! Typing after an unclosed `[[` looks up article titles. Choosing one
//! replaces the text from the marker to the cursor with `[[Title]]` and puts
//! the cursor after the closing `]]`. `Enter` selects only when a suggestion
//! is highlighted; otherwise it inserts a newline, so free text never becomes
//! a link by accident.
//!
//! Every edit emits [`Message::ContentChanged`], which re-validates the whole
//! document through a [`LinkValidator`]. Missing targets are listed in a
//! warning panel under the text. [`Message::Submit`] awaits a fresh check
//! and answers with [`Message::Submitted`] or [`Message::SubmitBlocked`];
//! [`Message::ForceSubmit`] skips the check while the panel is showing
//! warnings for the current text.

use std::cell::Cell;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use quill_core::{Command, Component};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use crate::candidate::Candidate;
use crate::lookup::{ArticleSource, LinkChecker, LookupError, ValidationResult};
use crate::query::{extract_link_query, find_open_marker, scan_link_targets, CLOSE_MARKER, OPEN_MARKER};
use crate::request::{RequestTracker, Ticket};
use crate::suggestions::{SuggestionList, UpAtTop};
use crate::text_edit::TextEditState;
use crate::validator::{LinkValidator, SubmitStart, SubmitVerdict};

const DROPDOWN_WIDTH: u16 = 40;
const MAX_WARNING_ROWS: u16 = 4;

/// Messages for the link editor.
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
    FocusGained,
    FocusLost,
    SuggestionsLoaded(Ticket<String>, Result<Vec<Candidate>, LookupError>),
    /// The text changed; re-validates links.
    ContentChanged,
    Validated(Ticket<u64>, Result<ValidationResult, LookupError>),
    /// Validate, then submit if every link resolves.
    Submit,
    /// Submit despite the warnings shown for the current text.
    ForceSubmit,
    SubmitChecked(Ticket<u64>, Result<ValidationResult, LookupError>),
    /// Notification: the content may be submitted.
    Submitted(String),
    /// Notification: submission blocked by these missing targets.
    SubmitBlocked(Vec<String>),
}

/// Style configuration for the link editor.
#[derive(Debug, Clone)]
pub struct LinkEditorStyle {
    pub border: Style,
    pub focused_border: Style,
    pub text: Style,
    pub cursor: Style,
    pub placeholder: Style,
    pub warning_border: Style,
    pub warning: Style,
}

impl Default for LinkEditorStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            focused_border: Style::default().fg(Color::Cyan),
            text: Style::default(),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            placeholder: Style::default().fg(Color::DarkGray),
            warning_border: Style::default().fg(Color::Yellow),
            warning: Style::default().fg(Color::Yellow),
        }
    }
}

/// Link-aware text editor component.
pub struct LinkEditor {
    articles: Arc<dyn ArticleSource>,
    editor: TextEditState,
    suggestions: SuggestionList,
    tracker: RequestTracker<String>,
    validator: LinkValidator,
    limit: usize,
    focused: bool,
    title: String,
    placeholder: String,
    style: LinkEditorStyle,
    last_area: Cell<Rect>,
    scroll: Cell<usize>,
}

impl LinkEditor {
    pub fn new(articles: Arc<dyn ArticleSource>, checker: Arc<dyn LinkChecker>) -> Self {
        Self {
            articles,
            editor: TextEditState::new(),
            suggestions: SuggestionList::new(),
            tracker: RequestTracker::new(),
            validator: LinkValidator::new(checker),
            limit: 8,
            focused: false,
            title: " Body ".to_string(),
            placeholder: "Write here. Type [[ to link an article.".to_string(),
            style: LinkEditorStyle::default(),
            last_area: Cell::new(Rect::default()),
            scroll: Cell::new(0),
        }
    }

    /// Start with `content`, cursor at the end. Send
    /// [`Message::ContentChanged`] afterwards to validate it.
    pub fn with_content(mut self, content: &str) -> Self {
        self.editor.set_value(content);
        self
    }

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

    pub fn with_style(mut self, style: LinkEditorStyle) -> Self {
        self.style = style;
        self
    }

    pub fn content(&self) -> String {
        self.editor.value()
    }

    pub fn cursor(&self) -> usize {
        self.editor.cursor()
    }

    /// Move the cursor (clamped) and re-run link extraction.
    pub fn set_cursor(&mut self, pos: usize) -> Command<Message> {
        self.editor.set_cursor(pos);
        self.refresh_query()
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    pub fn validator(&self) -> &LinkValidator {
        &self.validator
    }

    /// Number of closed `[[target]]` links in the text.
    pub fn link_count(&self) -> usize {
        scan_link_targets(&self.editor.value()).len()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.suggestions.hide();
            self.tracker.clear();
        }
    }

    /// Whether a pointer position falls on the editor, its dropdown or its
    /// warning panel, as last rendered.
    pub fn hit(&self, column: u16, row: u16) -> bool {
        let area = self.last_area.get();
        column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
    }

    /// Replace the trigger span before the cursor with `[[title]]`.
    ///
    /// Does nothing when the cursor is no longer inside a trigger span.
    pub fn select_suggestion(&mut self, title: &str) -> Command<Message> {
        let cursor = self.editor.cursor();
        let Some(start) = find_open_marker(self.editor.chars(), cursor) else {
            tracing::debug!("no open link marker at cursor, ignoring selection");
            return Command::none();
        };
        self.editor
            .splice(start..cursor, &format!("{OPEN_MARKER}{title}{CLOSE_MARKER}"));
        self.suggestions.hide();
        self.tracker.clear();
        Command::message(Message::ContentChanged)
    }

    fn edited(&mut self) -> Command<Message> {
        Command::batch([self.refresh_query(), Command::message(Message::ContentChanged)])
    }

    fn refresh_query(&mut self) -> Command<Message> {
        let Some(link) = extract_link_query(self.editor.chars(), self.editor.cursor()) else {
            self.suggestions.hide();
            self.tracker.clear();
            return Command::none();
        };
        let ticket = self.tracker.issue(link.query.clone());
        tracing::debug!(query = %link.query, request = ticket.id.get(), "fetching article titles");
        Command::perform(
            self.articles.autocomplete(&link.query, self.limit),
            move |result| Message::SuggestionsLoaded(ticket, result),
        )
    }

    fn apply_suggestions(
        &mut self,
        ticket: Ticket<String>,
        result: Result<Vec<Candidate>, LookupError>,
    ) -> Command<Message> {
        if !self.focused || !self.tracker.is_current(&ticket) {
            tracing::debug!(query = %ticket.key, request = ticket.id.get(), "discarding stale article titles");
            return Command::none();
        }
        match result {
            Ok(candidates) => {
                self.suggestions.show(candidates, &ticket.key);
            }
            Err(err) => {
                tracing::warn!(error = %err, query = %ticket.key, "article autocomplete failed");
                self.suggestions.hide();
            }
        }
        Command::none()
    }

    fn submit(&mut self) -> Command<Message> {
        let content = self.editor.value();
        match self.validator.begin_submit(&content) {
            SubmitStart::Ready(verdict) => self.conclude(verdict, content),
            SubmitStart::Pending(check) => {
                let ticket = check.ticket;
                Command::perform(check.future, move |result| {
                    Message::SubmitChecked(ticket, result)
                })
            }
        }
    }

    fn conclude(&mut self, verdict: SubmitVerdict, content: String) -> Command<Message> {
        match verdict {
            SubmitVerdict::Allowed | SubmitVerdict::FailedOpen => {
                tracing::info!(links = scan_link_targets(&content).len(), "submission accepted");
                Command::message(Message::Submitted(content))
            }
            SubmitVerdict::Blocked(missing) => {
                tracing::info!(missing = missing.len(), "submission blocked by missing links");
                Command::message(Message::SubmitBlocked(missing))
            }
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
            (KeyCode::Enter, _) => match self.suggestions.highlighted() {
                Some(candidate) => {
                    let title = candidate.identity.clone();
                    self.select_suggestion(&title)
                }
                None => {
                    self.editor.insert_char('\n');
                    self.edited()
                }
            },
            (KeyCode::Backspace, _) => {
                if self.editor.delete_back() {
                    self.edited()
                } else {
                    Command::none()
                }
            }
            (KeyCode::Delete, _) => {
                if self.editor.delete_forward() {
                    self.edited()
                } else {
                    Command::none()
                }
            }
            (KeyCode::Left, _) => self.moved(TextEditState::move_left),
            (KeyCode::Right, _) => self.moved(TextEditState::move_right),
            (KeyCode::Up, _) => self.moved(TextEditState::move_up),
            (KeyCode::Down, _) => self.moved(TextEditState::move_down),
            (KeyCode::Home, _) => {
                self.editor.move_line_start();
                self.refresh_query()
            }
            (KeyCode::End, _) => {
                self.editor.move_line_end();
                self.refresh_query()
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.editor.insert_char(c);
                self.edited()
            }
            _ => Command::none(),
        }
    }

    fn moved(&mut self, step: fn(&mut TextEditState) -> bool) -> Command<Message> {
        if step(&mut self.editor) {
            self.refresh_query()
        } else {
            Command::none()
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Command<Message> {
        let area = self.last_area.get();
        let (editor_rect, _) = self.split(area);
        let inner = text_block().inner(editor_rect);
        let candidate =
            self.suggestions
                .hit_test(self.dropdown_area(inner), event.column, event.row);
        match event.kind {
            MouseEventKind::Moved => {
                if let Some(index) = candidate {
                    self.suggestions.hover(index);
                }
                Command::none()
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = candidate {
                    return self.update(Message::Click(index));
                }
                match self.position_at(inner, event.column, event.row) {
                    Some(pos) => self.set_cursor(pos),
                    None => Command::none(),
                }
            }
            _ => Command::none(),
        }
    }

    /// Char index under a pointer position inside the text area.
    fn position_at(&self, inner: Rect, column: u16, row: u16) -> Option<usize> {
        if column < inner.x || column >= inner.right() || row < inner.y || row >= inner.bottom() {
            return None;
        }
        let lines = self.editor.lines();
        let line_index = (self.scroll.get() + (row - inner.y) as usize).min(lines.len() - 1);
        let line_start: usize = lines[..line_index].iter().map(|l| l.len() + 1).sum();
        let target = (column - inner.x) as usize;
        let mut width = 0;
        let mut offset = 0;
        for c in lines[line_index] {
            let w = c.width().unwrap_or(0);
            if width + w > target {
                break;
            }
            width += w;
            offset += 1;
        }
        Some(line_start + offset)
    }

    /// Editor rect and warning panel rect (zero height when there are none).
    fn split(&self, area: Rect) -> (Rect, Rect) {
        let count = self.validator.warnings().count() as u16;
        let panel = if count == 0 {
            0
        } else {
            (count.min(MAX_WARNING_ROWS) + 2).min(area.height / 2)
        };
        let editor = Rect {
            height: area.height - panel,
            ..area
        };
        let warnings = Rect {
            y: editor.bottom(),
            height: panel,
            ..area
        };
        (editor, warnings)
    }

    fn cursor_screen(&self, inner: Rect) -> (u16, u16) {
        let (row, col) = self.editor.cursor_position();
        let lines = self.editor.lines();
        let width: usize = lines
            .get(row)
            .map(|line| line[..col].iter().map(|c| c.width().unwrap_or(0)).sum())
            .unwrap_or(0);
        let y = inner.y + row.saturating_sub(self.scroll.get()) as u16;
        (inner.x + (width as u16).min(inner.width.saturating_sub(1)), y)
    }

    /// Area handed to the dropdown: below the cursor line, or above it when
    /// there is more room there.
    fn dropdown_area(&self, inner: Rect) -> Rect {
        let (cursor_x, cursor_y) = self.cursor_screen(inner);
        let width = DROPDOWN_WIDTH.min(inner.width);
        let x = cursor_x.min(inner.right().saturating_sub(width));
        let needed = self.suggestions.height();
        let below = inner.bottom().saturating_sub(cursor_y + 1);
        let above = cursor_y.saturating_sub(inner.y);
        if below >= needed || below >= above {
            Rect::new(x, cursor_y + 1, width, below)
        } else {
            let height = needed.min(above);
            Rect::new(x, cursor_y - height, width, height)
        }
    }

    fn text_lines(&self, top: usize, rows: usize) -> Vec<Line<'static>> {
        if self.editor.is_empty() && !self.focused {
            return vec![Line::from(Span::styled(
                self.placeholder.clone(),
                self.style.placeholder,
            ))];
        }
        let (cursor_row, cursor_col) = self.editor.cursor_position();
        self.editor
            .lines()
            .into_iter()
            .enumerate()
            .skip(top)
            .take(rows)
            .map(|(index, line)| {
                if !self.focused || index != cursor_row {
                    let text: String = line.iter().collect();
                    return Line::from(Span::styled(text, self.style.text));
                }
                let before: String = line[..cursor_col].iter().collect();
                let at: String = line.get(cursor_col).map_or(" ".to_string(), |c| c.to_string());
                let after: String = line.iter().skip(cursor_col + 1).collect();
                Line::from(vec![
                    Span::styled(before, self.style.text),
                    Span::styled(at, self.style.cursor),
                    Span::styled(after, self.style.text),
                ])
            })
            .collect()
    }
}

fn text_block() -> Block<'static> {
    Block::default().borders(Borders::ALL)
}

impl Component for LinkEditor {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) => self.handle_key(key),
            Message::Paste(text) => {
                if text.is_empty() {
                    return Command::none();
                }
                self.editor.insert_str(&text.replace("\r\n", "\n"));
                self.edited()
            }
            Message::Mouse(event) => self.handle_mouse(event),
            Message::Hover(index) => {
                self.suggestions.hover(index);
                Command::none()
            }
            Message::Click(index) => match self.suggestions.get(index) {
                Some(candidate) => {
                    let title = candidate.identity.clone();
                    self.select_suggestion(&title)
                }
                None => Command::none(),
            },
            Message::FocusGained => {
                self.set_focused(true);
                Command::none()
            }
            Message::FocusLost => {
                self.set_focused(false);
                Command::none()
            }
            Message::SuggestionsLoaded(ticket, result) => self.apply_suggestions(ticket, result),
            Message::ContentChanged => match self.validator.content_changed(&self.editor.value()) {
                Some(check) => {
                    let ticket = check.ticket;
                    Command::perform(check.future, move |result| {
                        Message::Validated(ticket, result)
                    })
                }
                None => Command::none(),
            },
            Message::Validated(ticket, result) => {
                self.validator.apply(&ticket, result);
                Command::none()
            }
            Message::Submit => self.submit(),
            Message::ForceSubmit => {
                let content = self.editor.value();
                if self.validator.warnings_current_for(&content) {
                    tracing::info!("submitting despite missing links");
                    Command::message(Message::Submitted(content))
                } else {
                    self.submit()
                }
            }
            Message::SubmitChecked(ticket, result) => {
                match self.validator.finish_submit(&ticket, result) {
                    Some(verdict) => self.conclude(verdict, self.editor.value()),
                    None => Command::none(),
                }
            }
            Message::Submitted(_) | Message::SubmitBlocked(_) => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        self.last_area.set(area);
        if area.height < 3 || area.width < 3 {
            return;
        }
        let (editor_rect, warning_rect) = self.split(area);
        let border = if self.focused {
            self.style.focused_border
        } else {
            self.style.border
        };
        let block = text_block()
            .border_style(border)
            .title(self.title.clone());
        let inner = block.inner(editor_rect);
        frame.render_widget(block, editor_rect);

        let rows = inner.height as usize;
        let (cursor_row, _) = self.editor.cursor_position();
        let mut top = self.scroll.get();
        if cursor_row < top {
            top = cursor_row;
        } else if rows > 0 && cursor_row >= top + rows {
            top = cursor_row + 1 - rows;
        }
        self.scroll.set(top);
        frame.render_widget(Paragraph::new(self.text_lines(top, rows)), inner);

        if warning_rect.height > 0 {
            let lines: Vec<Line> = self
                .validator
                .warnings()
                .map(|target| {
                    Line::from(Span::styled(
                        format!("⚠ {OPEN_MARKER}{target}{CLOSE_MARKER} does not exist"),
                        self.style.warning,
                    ))
                })
                .collect();
            let panel = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.style.warning_border)
                    .title(" Missing articles "),
            );
            frame.render_widget(panel, warning_rect);
        }

        self.suggestions.render(frame, self.dropdown_area(inner));
    }

    fn focused(&self) -> bool {
        self.focused
    }
}
