use crate::command::{Action, Command, CommandInner};
use crate::event::TerminalEvent;
use crate::model::Model;
use crossterm::{
    cursor,
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture, EventStream,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors that can occur while initializing or running a [`Program`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// An I/O error from terminal setup, rendering, or teardown.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration options for a [`Program`].
///
/// Use struct update syntax to override only the options you need:
///
/// ```rust,ignore
/// let opts = ProgramOptions {
///     title: Some("quill".into()),
///     ..ProgramOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Start in alternate screen (default: true).
    pub alt_screen: bool,
    /// Capture mouse movement and clicks (default: true). Hovering a
    /// suggestion highlights it, so the widgets want motion events.
    pub mouse_capture: bool,
    /// Enable bracketed paste (default: true).
    pub bracketed_paste: bool,
    /// Report terminal focus changes (default: false).
    pub focus_reporting: bool,
    /// Set terminal title.
    pub title: Option<String>,
    /// Restore the terminal before the default panic hook runs (default: true).
    pub catch_panics: bool,
    /// Quit on ctrl-c delivered as a signal (default: true).
    pub handle_signals: bool,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            alt_screen: true,
            mouse_capture: true,
            bracketed_paste: true,
            focus_reporting: false,
            title: None,
            catch_panics: true,
            handle_signals: true,
        }
    }
}

/// The program runtime: terminal setup, the event loop, and the [`Model`]
/// lifecycle.
///
/// All model state is touched from the loop only. Futures spawned by
/// [`Command::perform`] run on the tokio runtime and report back through a
/// channel, so `update` never runs concurrently with itself.
///
/// ```rust,ignore
/// let model = Program::<ArticleForm>::new(flags)?.run().await?;
/// ```
pub struct Program<M: Model> {
    model: M,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    msg_tx: mpsc::UnboundedSender<M::Message>,
    msg_rx: mpsc::UnboundedReceiver<M::Message>,
    options: ProgramOptions,
    should_quit: bool,
}

impl<M: Model> Program<M> {
    /// Create a new program with default options.
    pub fn new(flags: M::Flags) -> Result<Self, ProgramError> {
        Self::with_options(flags, ProgramOptions::default())
    }

    /// Create a new program with custom options.
    ///
    /// Returns an error if terminal initialization fails.
    pub fn with_options(flags: M::Flags, options: ProgramOptions) -> Result<Self, ProgramError> {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (model, init_cmd) = M::init(flags);
        let terminal = init_terminal(&options)?;

        let mut program = Self {
            model,
            terminal,
            msg_tx,
            msg_rx,
            options,
            should_quit: false,
        };
        debug!("program initialized");

        if let Ok((width, height)) = crossterm::terminal::size() {
            program.dispatch_event(TerminalEvent::Resize(width, height));
        }
        program.execute_command(init_cmd);
        Ok(program)
    }

    /// Get a sender for external message injection.
    pub fn sender(&self) -> mpsc::UnboundedSender<M::Message> {
        self.msg_tx.clone()
    }

    /// Run the program until the model quits. Returns the final model.
    pub async fn run(mut self) -> Result<M, ProgramError> {
        let result = self.event_loop().await;
        debug!("shutting down");
        restore_terminal(&self.options)?;
        result.map(|()| self.model)
    }

    async fn event_loop(&mut self) -> Result<(), ProgramError> {
        let mut events = EventStream::new();
        let handle_signals = self.options.handle_signals;
        self.render()?;

        while !self.should_quit {
            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c(), if handle_signals => {
                    debug!("received ctrl+c signal");
                    return Ok(());
                }

                Some(msg) = self.msg_rx.recv() => {
                    self.process_message(msg);
                    // Drain whatever is already queued before redrawing.
                    while let Ok(msg) = self.msg_rx.try_recv() {
                        self.process_message(msg);
                        if self.should_quit {
                            break;
                        }
                    }
                }

                event = events.next() => match event {
                    Some(Ok(event)) => self.dispatch_event(event.into()),
                    Some(Err(err)) => {
                        warn!(error = %err, "terminal event stream failed");
                        return Err(err.into());
                    }
                    None => return Ok(()),
                },
            }

            if !self.should_quit {
                self.render()?;
            }
        }
        Ok(())
    }

    fn dispatch_event(&mut self, event: TerminalEvent) {
        if let Some(msg) = self.model.handle_event(event) {
            self.process_message(msg);
        }
    }

    fn process_message(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_command(cmd);
    }

    fn execute_command(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => {
                let _ = self.msg_tx.send(msg);
            }
            CommandInner::Action(Action::Quit) => {
                self.should_quit = true;
            }
            CommandInner::Future(fut) => {
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let msg = fut.await;
                    // The receiver is gone once the program has exited.
                    let _ = tx.send(msg);
                });
            }
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.execute_command(cmd);
                }
            }
        }
    }

    fn render(&mut self) -> Result<(), ProgramError> {
        self.terminal.draw(|frame| {
            self.model.view(frame);
        })?;
        Ok(())
    }
}

fn init_terminal(options: &ProgramOptions) -> Result<Terminal<CrosstermBackend<Stdout>>, ProgramError> {
    // Install the restoring panic hook once, however many programs are created.
    if options.catch_panics {
        use std::sync::Once;
        static HOOK_INSTALLED: Once = Once::new();
        let restore_options = options.clone();
        HOOK_INSTALLED.call_once(move || {
            let original_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = restore_terminal(&restore_options);
                original_hook(info);
            }));
        });
    }

    enable_raw_mode()?;
    let mut writer = stdout();

    if options.alt_screen {
        execute!(writer, EnterAlternateScreen)?;
    }
    if options.bracketed_paste {
        execute!(writer, EnableBracketedPaste)?;
    }
    if options.mouse_capture {
        execute!(writer, EnableMouseCapture)?;
    }
    if options.focus_reporting {
        execute!(writer, EnableFocusChange)?;
    }
    if let Some(ref title) = options.title {
        execute!(writer, SetTitle(title))?;
    }

    let terminal = Terminal::new(CrosstermBackend::new(writer))?;
    Ok(terminal)
}

fn restore_terminal(options: &ProgramOptions) -> Result<(), ProgramError> {
    // Best effort: keep going when a single step fails so as much terminal
    // state as possible is restored; only the raw-mode error is reported.
    let raw = disable_raw_mode();
    let mut writer = stdout();
    execute!(writer, DisableBracketedPaste).ok();
    execute!(writer, DisableMouseCapture).ok();
    execute!(writer, DisableFocusChange).ok();
    execute!(writer, cursor::Show).ok();
    if options.alt_screen {
        execute!(writer, LeaveAlternateScreen).ok();
    }
    raw?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_capture_mouse() {
        let opts = ProgramOptions::default();
        assert!(opts.mouse_capture);
        assert!(opts.alt_screen);
        assert!(opts.title.is_none());
    }

    #[test]
    fn program_error_wraps_io() {
        let err: ProgramError = io::Error::other("boom").into();
        assert_eq!(err.to_string(), "IO error: boom");
    }
}
