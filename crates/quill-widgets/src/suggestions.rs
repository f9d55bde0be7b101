//! Suggestion dropdown shared by the tag picker and the link editor.
//!
//! [`SuggestionList`] is a state helper, not a component: the owning widget
//! decides when to show or hide it and what `Enter` means, while the list
//! owns the highlight cursor and the rendering.
//!
//! The highlight is cleared every time the list is rebuilt and comes back
//! only through explicit navigation or hover. Keyboard and pointer share the
//! same single highlight.

use std::cell::Cell;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::candidate::{emphasized_segments, Candidate};

/// What `ArrowUp` does when the first candidate is highlighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpAtTop {
    /// Clear the highlight, handing the cursor back to the text field.
    #[default]
    Clear,
    /// Keep the first candidate highlighted.
    Hold,
}

/// Style configuration for the dropdown.
#[derive(Debug, Clone)]
pub struct SuggestionStyle {
    pub border: Style,
    pub item: Style,
    pub highlighted: Style,
    /// Applied on top of the item style to the parts matching the query.
    pub emphasis: Style,
    pub count: Style,
}

impl Default for SuggestionStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            item: Style::default().fg(Color::White),
            highlighted: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
            emphasis: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            count: Style::default().fg(Color::DarkGray),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum ListState {
    #[default]
    Hidden,
    Visible {
        candidates: Vec<Candidate>,
        highlight: Option<usize>,
    },
}

/// Dropdown state: hidden, or visible with candidates and an optional highlight.
#[derive(Debug, Clone)]
pub struct SuggestionList {
    state: ListState,
    query: String,
    up_at_top: UpAtTop,
    max_visible: usize,
    offset: Cell<usize>,
    /// Candidate rows the last render had room for; 0 before the first.
    rendered_rows: Cell<usize>,
    style: SuggestionStyle,
}

impl Default for SuggestionList {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionList {
    pub fn new() -> Self {
        Self {
            state: ListState::Hidden,
            query: String::new(),
            up_at_top: UpAtTop::default(),
            max_visible: 8,
            offset: Cell::new(0),
            rendered_rows: Cell::new(0),
            style: SuggestionStyle::default(),
        }
    }

    pub fn with_up_at_top(mut self, policy: UpAtTop) -> Self {
        self.up_at_top = policy;
        self
    }

    /// Rows shown before the list scrolls.
    pub fn with_max_visible(mut self, max: usize) -> Self {
        self.max_visible = max.max(1);
        self
    }

    pub fn with_style(mut self, style: SuggestionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn up_at_top(&self) -> UpAtTop {
        self.up_at_top
    }

    /// Replace the list with `candidates` for `query`. The highlight is
    /// cleared. An empty result hides the list; returns whether it is visible.
    pub fn show(&mut self, candidates: Vec<Candidate>, query: &str) -> bool {
        self.offset.set(0);
        if candidates.is_empty() {
            self.hide();
            return false;
        }
        self.query = query.to_string();
        self.state = ListState::Visible {
            candidates,
            highlight: None,
        };
        true
    }

    /// Hide the list and discard its candidates.
    pub fn hide(&mut self) {
        self.state = ListState::Hidden;
        self.query.clear();
        self.offset.set(0);
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, ListState::Visible { .. })
    }

    /// The rendered candidates, empty while hidden.
    pub fn candidates(&self) -> &[Candidate] {
        match &self.state {
            ListState::Visible { candidates, .. } => candidates,
            ListState::Hidden => &[],
        }
    }

    /// The query the current candidates were fetched for.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlight_index(&self) -> Option<usize> {
        match &self.state {
            ListState::Visible { highlight, .. } => *highlight,
            ListState::Hidden => None,
        }
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.highlight_index().and_then(|i| self.candidates().get(i))
    }

    /// Highlight the first candidate if none is highlighted, else the next
    /// one. At the last candidate this is a no-op (no wraparound).
    pub fn move_down(&mut self) {
        if let ListState::Visible {
            candidates,
            highlight,
        } = &mut self.state
        {
            *highlight = match *highlight {
                None => Some(0),
                Some(i) if i + 1 < candidates.len() => Some(i + 1),
                Some(i) => Some(i),
            };
        }
        self.ensure_highlight_visible();
    }

    /// Highlight the previous candidate. At the first one, behaviour follows
    /// [`UpAtTop`]. With nothing highlighted this is a no-op.
    pub fn move_up(&mut self) {
        let policy = self.up_at_top;
        if let ListState::Visible { highlight, .. } = &mut self.state {
            *highlight = match (*highlight, policy) {
                (Some(0), UpAtTop::Clear) => None,
                (Some(0), UpAtTop::Hold) => Some(0),
                (Some(i), _) => Some(i - 1),
                (None, _) => None,
            };
        }
        self.ensure_highlight_visible();
    }

    /// Pointer hover: replace any highlight with `index`. Out-of-range
    /// indices are ignored.
    pub fn hover(&mut self, index: usize) {
        if let ListState::Visible {
            candidates,
            highlight,
        } = &mut self.state
        {
            if index < candidates.len() {
                *highlight = Some(index);
            }
        }
    }

    /// Candidate at `index`, if visible.
    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates().get(index)
    }

    /// Rows the dropdown occupies when rendered (borders included), 0 when hidden.
    pub fn height(&self) -> u16 {
        if !self.is_visible() {
            return 0;
        }
        self.candidates().len().min(self.max_visible) as u16 + 2
    }

    /// The rectangle [`render`](Self::render) draws into, given the area
    /// reserved for the dropdown.
    pub fn dropdown_rect(&self, area: Rect) -> Option<Rect> {
        let height = self.height().min(area.height);
        if height < 3 || area.width < 3 {
            return None;
        }
        Some(Rect { height, ..area })
    }

    /// Map a pointer position to a candidate index. Consistent with `render`.
    pub fn hit_test(&self, area: Rect, column: u16, row: u16) -> Option<usize> {
        let inner = Block::default()
            .borders(Borders::ALL)
            .inner(self.dropdown_rect(area)?);
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        if !inside {
            return None;
        }
        let index = self.offset.get() + (row - inner.y) as usize;
        (index < self.candidates().len()).then_some(index)
    }

    /// Draw the dropdown at the top of `area`. Does nothing while hidden.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(rect) = self.dropdown_rect(area) else {
            return;
        };
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.border);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let visible = inner.height as usize;
        self.rendered_rows.set(visible);
        let last_page = self.candidates().len().saturating_sub(visible);
        self.offset.set(self.offset.get().min(last_page));
        self.scroll_into_view(visible);

        let highlight = self.highlight_index();
        let rows = self
            .candidates()
            .iter()
            .enumerate()
            .skip(self.offset.get())
            .take(visible);
        for (row, (index, candidate)) in rows.enumerate() {
            let base = if Some(index) == highlight {
                self.style.highlighted
            } else {
                self.style.item
            };
            let line = self.candidate_line(candidate, base);
            let line_area = Rect {
                y: inner.y + row as u16,
                height: 1,
                ..inner
            };
            frame.render_widget(Paragraph::new(line).style(base), line_area);
        }
    }

    fn candidate_line(&self, candidate: &Candidate, base: Style) -> Line<'static> {
        let mut spans = Vec::new();
        let bar_color = candidate
            .meta
            .color
            .as_deref()
            .and_then(|c| c.parse::<Color>().ok());
        match bar_color {
            Some(color) => spans.push(Span::styled("▌", base.fg(color))),
            None => spans.push(Span::styled(" ", base)),
        }
        for (text, emphasized) in emphasized_segments(&candidate.display_text, &self.query) {
            let style = if emphasized {
                base.patch(self.style.emphasis)
            } else {
                base
            };
            spans.push(Span::styled(text.to_string(), style));
        }
        if let Some(count) = candidate.meta.count {
            spans.push(Span::styled(format!(" {count}"), base.patch(self.style.count)));
        }
        Line::from(spans)
    }

    fn ensure_highlight_visible(&mut self) {
        let window = match self.rendered_rows.get() {
            0 => self.max_visible,
            rows => rows.min(self.max_visible),
        };
        self.scroll_into_view(window);
    }

    fn scroll_into_view(&self, window: usize) {
        let Some(index) = self.highlight_index() else {
            self.offset.set(0);
            return;
        };
        let offset = self.offset.get();
        if index < offset {
            self.offset.set(index);
        } else if window > 0 && index >= offset + window {
            self.offset.set(index + 1 - window);
        }
    }
}
