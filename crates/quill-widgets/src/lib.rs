//! Authoring widgets for **quill**.
//!
//! Both widgets implement [`quill_core::Component`] and talk to the server
//! only through the traits in [`lookup`], handed in as `Arc<dyn …>` at
//! construction.
//!
//! # Widgets
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tag_input`] | Multi-select tag picker with autocomplete and removable chips |
//! | [`link_editor`] | Text editor with `[[wiki link]]` autocomplete and link validation |
//!
//! # Building blocks
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`candidate`] | Suggestion candidates and query emphasis |
//! | [`lookup`] | Remote lookup traits and errors |
//! | [`query`] | Tag intent and link trigger extraction |
//! | [`request`] | Tickets guarding against stale async results |
//! | [`suggestions`] | Dropdown navigator shared by both widgets |
//! | [`text_edit`] | Char-indexed text buffer |
//! | [`validator`] | Link validation and the submit gate |

pub mod candidate;
pub mod link_editor;
pub mod lookup;
pub mod query;
pub mod request;
pub mod suggestions;
pub mod tag_input;
pub mod text_edit;
pub mod validator;

pub use candidate::Candidate;
pub use link_editor::LinkEditor;
pub use lookup::{ArticleSource, LinkChecker, LookupError, TagSource, ValidationResult};
pub use suggestions::UpAtTop;
pub use tag_input::TagInput;
