//! The article authoring form: a tag picker above a link-aware body editor.
//!
//! Keys go to the focused field except for the form shortcuts:
//!
//! | Key | Action |
//! |-----|--------|
//! | `Tab` / `Shift+Tab` | switch between tags and body |
//! | `Ctrl+S` | validate links, then submit |
//! | `Ctrl+F` | submit despite the missing links shown |
//! | `Ctrl+C` / `Ctrl+Q` | quit without submitting |
//!
//! Clicking a field focuses it. Submitting records a [`Submission`] and
//! quits.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use quill_core::{Command, Component, Model, TerminalEvent};
use quill_widgets::link_editor::{self, LinkEditor};
use quill_widgets::tag_input::{self, TagInput};
use quill_widgets::{ArticleSource, LinkChecker, TagSource, UpAtTop};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use serde::Serialize;

/// What the form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Tags joined with `", "`.
    pub tags: String,
    pub content: String,
}

/// Startup data for [`ArticleForm`].
pub struct FormFlags {
    pub tags: Arc<dyn TagSource>,
    pub articles: Arc<dyn ArticleSource>,
    pub checker: Arc<dyn LinkChecker>,
    pub initial_tags: Vec<String>,
    pub content: String,
    pub limit: usize,
    pub tag_up_at_top: UpAtTop,
}

impl FormFlags {
    /// Use one client for every lookup.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: TagSource + ArticleSource + LinkChecker,
    {
        Self {
            tags: client.clone(),
            articles: client.clone(),
            checker: client,
            initial_tags: Vec::new(),
            content: String::new(),
            limit: 8,
            tag_up_at_top: UpAtTop::Clear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tags,
    Body,
}

#[derive(Debug)]
pub enum Msg {
    Tags(tag_input::Message),
    Body(link_editor::Message),
    FocusNext,
    /// Mouse event over a field; a left click focuses it first.
    Pointer(Field, MouseEvent),
    Quit,
}

pub struct ArticleForm {
    tags: TagInput,
    body: LinkEditor,
    focus: Field,
    notice: Option<String>,
    submission: Option<Submission>,
}

impl ArticleForm {
    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn tags(&self) -> &TagInput {
        &self.tags
    }

    pub fn body(&self) -> &LinkEditor {
        &self.body
    }

    /// The submitted form, once submission went through.
    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn into_submission(self) -> Option<Submission> {
        self.submission
    }

    fn set_focus(&mut self, field: Field) -> Command<Msg> {
        if field == self.focus {
            return Command::none();
        }
        self.focus = field;
        let (gained, lost) = match field {
            Field::Tags => (
                self.tags.update(tag_input::Message::FocusGained).map(Msg::Tags),
                self.body.update(link_editor::Message::FocusLost).map(Msg::Body),
            ),
            Field::Body => (
                self.body.update(link_editor::Message::FocusGained).map(Msg::Body),
                self.tags.update(tag_input::Message::FocusLost).map(Msg::Tags),
            ),
        };
        Command::batch([lost, gained])
    }

    fn key_message(&self, event: crossterm::event::KeyEvent) -> Option<Msg> {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Char('c' | 'q') if ctrl => Some(Msg::Quit),
            KeyCode::Char('s') if ctrl => Some(Msg::Body(link_editor::Message::Submit)),
            KeyCode::Char('f') if ctrl => Some(Msg::Body(link_editor::Message::ForceSubmit)),
            KeyCode::Tab | KeyCode::BackTab => Some(Msg::FocusNext),
            _ => Some(match self.focus {
                Field::Tags => Msg::Tags(tag_input::Message::KeyPress(event)),
                Field::Body => Msg::Body(link_editor::Message::KeyPress(event)),
            }),
        }
    }

    fn on_body(&mut self, msg: link_editor::Message) -> Command<Msg> {
        match &msg {
            link_editor::Message::Submitted(content) => {
                let submission = Submission {
                    tags: self.tags.submission_value().to_string(),
                    content: content.clone(),
                };
                tracing::info!(tags = self.tags.tag_count(), "article submitted");
                self.submission = Some(submission);
                return Command::quit();
            }
            link_editor::Message::SubmitBlocked(missing) => {
                self.notice = Some(format!(
                    "{} missing article{}. Fix the links or press Ctrl+F to submit anyway.",
                    missing.len(),
                    if missing.len() == 1 { "" } else { "s" }
                ));
            }
            link_editor::Message::Submit | link_editor::Message::ForceSubmit => {
                self.notice = Some("Checking links…".to_string());
            }
            _ => {}
        }
        self.body.update(msg).map(Msg::Body)
    }

    fn on_tags(&mut self, msg: tag_input::Message) -> Command<Msg> {
        match &msg {
            tag_input::Message::TagAdded(tag) => self.notice = Some(format!("Added tag “{tag}”")),
            tag_input::Message::TagRemoved(tag) => {
                self.notice = Some(format!("Removed tag “{tag}”"));
            }
            _ => {}
        }
        self.tags.update(msg).map(Msg::Tags)
    }

    fn status_line(&self) -> Line<'static> {
        let validator = self.body.validator();
        let links = self.body.link_count();
        let state = if links == 0 {
            Span::styled("no links", Style::default().fg(Color::DarkGray))
        } else if validator.is_pending() {
            Span::styled("checking links…", Style::default().fg(Color::DarkGray))
        } else if validator.has_warnings() {
            let missing = validator.warnings().count();
            Span::styled(format!("⚠ {missing} missing"), Style::default().fg(Color::Yellow))
        } else {
            Span::styled("✓ links ok", Style::default().fg(Color::Green))
        };
        let mut spans = vec![
            Span::raw(format!(" tags: {}  links: {links}  ", self.tags.tag_count())),
            state,
        ];
        if let Some(notice) = &self.notice {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    }
}

impl Model for ArticleForm {
    type Message = Msg;
    type Flags = FormFlags;

    fn init(flags: FormFlags) -> (Self, Command<Msg>) {
        let mut tags = TagInput::new(flags.tags)
            .with_initial_tags(&flags.initial_tags)
            .with_limit(flags.limit)
            .with_up_at_top(flags.tag_up_at_top);
        tags.set_focused(true);
        let body = LinkEditor::new(flags.articles, flags.checker)
            .with_content(&flags.content)
            .with_limit(flags.limit);
        let init = if flags.content.is_empty() {
            Command::none()
        } else {
            Command::message(Msg::Body(link_editor::Message::ContentChanged))
        };
        let form = ArticleForm {
            tags,
            body,
            focus: Field::Tags,
            notice: None,
            submission: None,
        };
        (form, init)
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Tags(m) => self.on_tags(m),
            Msg::Body(m) => self.on_body(m),
            Msg::FocusNext => {
                let next = match self.focus {
                    Field::Tags => Field::Body,
                    Field::Body => Field::Tags,
                };
                self.set_focus(next)
            }
            Msg::Pointer(field, event) => {
                let focus = if matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
                    self.set_focus(field)
                } else {
                    Command::none()
                };
                let forwarded = match field {
                    Field::Tags => self.tags.update(tag_input::Message::Mouse(event)).map(Msg::Tags),
                    Field::Body => self
                        .body
                        .update(link_editor::Message::Mouse(event))
                        .map(Msg::Body),
                };
                Command::batch([focus, forwarded])
            }
            Msg::Quit => Command::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [form_area, status_area, help_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let field_height = self.tags.field_height(form_area.width).min(form_area.height);
        let body_area = Rect {
            y: form_area.y + field_height,
            height: form_area.height - field_height,
            ..form_area
        };
        // Tags render last so their dropdown overlays the body.
        self.body.view(frame, body_area);
        self.tags.view(frame, form_area);

        frame.render_widget(Paragraph::new(self.status_line()), status_area);

        let key = Style::default().fg(Color::Cyan);
        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Tab", key),
            Span::raw(" switch  "),
            Span::styled("Ctrl+S", key),
            Span::raw(" submit  "),
            Span::styled("Ctrl+F", key),
            Span::raw(" force  "),
            Span::styled("Ctrl+Q", key),
            Span::raw(" quit"),
        ]))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, help_area);
    }

    fn handle_event(&self, event: TerminalEvent) -> Option<Msg> {
        if let Some(key) = event.key_press() {
            return self.key_message(key);
        }
        match event {
            TerminalEvent::Paste(text) => Some(match self.focus {
                Field::Tags => Msg::Tags(tag_input::Message::Paste(text)),
                Field::Body => Msg::Body(link_editor::Message::Paste(text)),
            }),
            TerminalEvent::Mouse(mouse) => {
                // The tag dropdown overlays the body, so tags are hit-tested first.
                if self.tags.hit(mouse.column, mouse.row) {
                    Some(Msg::Pointer(Field::Tags, mouse))
                } else if self.body.hit(mouse.column, mouse.row) {
                    Some(Msg::Pointer(Field::Body, mouse))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
