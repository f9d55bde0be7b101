//! Headless harnesses for unit-testing models and components.
//!
//! Both harnesses run the update cycle synchronously. Immediate messages
//! ([`Command::message`]) are queued and flushed with `drain_messages`.
//! Async work ([`Command::perform`]) is *parked* instead of spawned: tests
//! resolve parked tasks one at a time, in whatever order they like, which is
//! how out-of-order network responses are reproduced.

use crate::command::{Action, Command, CommandInner};
use crate::component::Component;
use crate::event::TerminalEvent;
use crate::model::Model;
use futures::future::BoxFuture;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

/// Messages and parked tasks collected from commands.
struct Outbox<Msg: Send + 'static> {
    messages: Vec<Msg>,
    tasks: Vec<BoxFuture<'static, Msg>>,
    quit: bool,
}

impl<Msg: Send + 'static> Outbox<Msg> {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            tasks: Vec::new(),
            quit: false,
        }
    }

    fn collect(&mut self, cmd: Command<Msg>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => self.messages.push(msg),
            CommandInner::Action(Action::Quit) => self.quit = true,
            CommandInner::Future(fut) => self.tasks.push(fut),
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
        }
    }

    fn take_task(&mut self, index: usize) -> BoxFuture<'static, Msg> {
        assert!(
            index < self.tasks.len(),
            "no parked task at index {index} ({} parked)",
            self.tasks.len()
        );
        self.tasks.remove(index)
    }
}

/// A headless test harness that drives a [`Model`] without a real terminal.
///
/// ```rust,ignore
/// let mut prog = TestProgram::<ArticleForm>::new(flags);
/// prog.send(FormMsg::Body(link_editor::Message::Submit));
/// prog.run_task(0);          // resolve the validation request
/// prog.drain_messages();
/// assert!(prog.model().submission().is_some());
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    outbox: Outbox<M::Message>,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            outbox: Outbox::new(),
        };
        program.outbox.collect(init_cmd);
        program
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.outbox.collect(cmd);
    }

    /// Offer a terminal event to [`Model::handle_event`] and send the
    /// resulting message, if any. Returns whether a message was produced.
    pub fn send_event(&mut self, event: TerminalEvent) -> bool {
        match self.model.handle_event(event) {
            Some(msg) => {
                self.send(msg);
                true
            }
            None => false,
        }
    }

    /// Process pending immediate messages until none are left.
    pub fn drain_messages(&mut self) {
        while !self.outbox.messages.is_empty() {
            let messages: Vec<_> = self.outbox.messages.drain(..).collect();
            for msg in messages {
                self.send(msg);
            }
        }
    }

    /// Number of parked async tasks.
    pub fn pending_tasks(&self) -> usize {
        self.outbox.tasks.len()
    }

    /// Resolve the parked task at `index`, feed its message to `update`,
    /// then drain immediate messages.
    ///
    /// # Panics
    ///
    /// Panics if there is no parked task at `index`.
    pub fn run_task(&mut self, index: usize) {
        let task = self.outbox.take_task(index);
        let msg = futures::executor::block_on(task);
        self.send(msg);
        self.drain_messages();
    }

    /// Resolve parked tasks in FIFO order until none are left.
    pub fn run_all_tasks(&mut self) {
        self.drain_messages();
        while !self.outbox.tasks.is_empty() {
            self.run_task(0);
        }
    }

    /// Whether a [`Command::quit`] has been returned.
    pub fn quit_requested(&self) -> bool {
        self.outbox.quit
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        render_with(width, height, |frame| self.model.view(frame))
    }

    /// Render the model and return the visible content as a plain string.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }
}

/// A headless harness for a single [`Component`].
///
/// Behaves like [`TestProgram`] but wraps an already-constructed component,
/// so builder-style setup works:
///
/// ```rust,ignore
/// let mut h = Harness::new(TagInput::new(source).with_initial_tags(["rust"]));
/// h.send(tag_input::Message::Paste("asy".into()));
/// h.run_task(0);
/// ```
pub struct Harness<C: Component> {
    component: C,
    outbox: Outbox<C::Message>,
}

impl<C: Component> Harness<C> {
    /// Wrap a component.
    pub fn new(component: C) -> Self {
        Self {
            component,
            outbox: Outbox::new(),
        }
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: C::Message) {
        let cmd = self.component.update(msg);
        self.outbox.collect(cmd);
    }

    /// Process pending immediate messages until none are left, returning
    /// them in delivery order (useful for asserting on notifications).
    pub fn drain_messages(&mut self) -> Vec<C::Message>
    where
        C::Message: Clone,
    {
        let mut delivered = Vec::new();
        while !self.outbox.messages.is_empty() {
            let messages: Vec<_> = self.outbox.messages.drain(..).collect();
            for msg in messages {
                delivered.push(msg.clone());
                self.send(msg);
            }
        }
        delivered
    }

    /// Number of parked async tasks.
    pub fn pending_tasks(&self) -> usize {
        self.outbox.tasks.len()
    }

    /// Resolve the parked task at `index` and feed its message to `update`.
    /// Immediate messages produced by that update stay queued.
    ///
    /// # Panics
    ///
    /// Panics if there is no parked task at `index`.
    pub fn run_task(&mut self, index: usize) {
        let task = self.outbox.take_task(index);
        let msg = futures::executor::block_on(task);
        self.send(msg);
    }

    /// Drop every parked task without resolving it.
    pub fn discard_tasks(&mut self) {
        self.outbox.tasks.clear();
    }

    /// Get a shared reference to the component.
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Get a mutable reference to the component.
    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    /// Render the component into a `width` x `height` area.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        let buf = render_with(width, height, |frame| {
            self.component.view(frame, Rect::new(0, 0, width, height));
        });
        buffer_to_string(&buf)
    }
}

fn render_with(width: u16, height: u16, draw: impl FnOnce(&mut ratatui::Frame)) -> Buffer {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("test backend never fails");
    let mut draw = Some(draw);
    terminal
        .draw(|frame| {
            if let Some(draw) = draw.take() {
                draw(frame);
            }
        })
        .expect("test backend never fails");
    terminal.backend().buffer().clone()
}

fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}
