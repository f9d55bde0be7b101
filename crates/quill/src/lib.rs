//! **quill**: terminal article authoring with tag autocomplete and
//! `[[wiki link]]` validation.
//!
//! This is the umbrella crate. It re-exports the runtime from
//! [`quill_core`] at the crate root, the widgets under [`widgets`], the HTTP
//! client under [`api`], and hosts the [`app::ArticleForm`] model that the
//! `quill` binary runs.
//!
//! ```ignore
//! use std::sync::Arc;
//! use quill::api::{ApiClient, ApiConfig};
//! use quill::app::{ArticleForm, FormFlags};
//!
//! let client = Arc::new(ApiClient::new(ApiConfig::new("http://127.0.0.1:5000")?)?);
//! let form = quill::run::<ArticleForm>(FormFlags::from_client(client)).await?;
//! if let Some(submission) = form.submission() {
//!     println!("{}", serde_json::to_string(submission)?);
//! }
//! ```

pub mod app;

pub use quill_core::*;

/// Widgets from [`quill_widgets`].
pub mod widgets {
    pub use quill_widgets::*;
}

/// HTTP client from [`quill_api`].
pub mod api {
    pub use quill_api::*;
}

pub use crossterm;
pub use ratatui;
pub use tokio;
