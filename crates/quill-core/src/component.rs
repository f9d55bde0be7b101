use crate::command::Command;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`] area.
///
/// `Component` is nearly identical to [`Model`](crate::Model) but its
/// [`view`](Component::view) receives the area to draw into, so a parent can
/// lay several widgets out side by side. Both authoring widgets
/// ([`TagInput`] and [`LinkEditor`] in `quill-widgets`) are components.
///
/// # Composition pattern
///
/// Wrap the child's message type in a variant of the parent message and lift
/// returned commands with [`Command::map`]:
///
/// ```rust,ignore
/// enum FormMsg { Tags(tag_input::Message) }
///
/// fn update(&mut self, msg: FormMsg) -> Command<FormMsg> {
///     match msg {
///         FormMsg::Tags(m) => self.tags.update(m).map(FormMsg::Tags),
///     }
/// }
/// ```
///
/// [`TagInput`]: https://docs.rs/quill-widgets
/// [`LinkEditor`]: https://docs.rs/quill-widgets
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for side effects.
    ///
    /// The returned command uses the component's own `Message` type; the
    /// parent calls [`.map()`](Command::map) to lift it.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into a specific `area` of the [`Frame`].
    ///
    /// Overlays such as suggestion dropdowns may extend below the input row
    /// but stay inside `area`.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Whether this component currently has focus.
    ///
    /// A parent uses this to route keyboard input. The default
    /// implementation returns `false`.
    fn focused(&self) -> bool {
        false
    }
}
