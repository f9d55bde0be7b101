use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use quill::api::{ApiClient, ApiConfig};
use quill::app::{ArticleForm, FormFlags};
use quill::widgets::UpAtTop;
use quill::ProgramOptions;
use tracing_subscriber::EnvFilter;

/// Write an article in the terminal: tags with autocomplete, a body with
/// `[[wiki link]]` autocomplete, and link validation before submit.
///
/// On submit the form is printed to stdout as JSON.
#[derive(Debug, Parser)]
#[command(name = "quill", version)]
struct Args {
    /// Base URL of the article server.
    #[arg(long, env = "QUILL_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Request timeout in seconds.
    #[arg(long, env = "QUILL_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Maximum suggestions per lookup.
    #[arg(long, default_value_t = 8)]
    limit: usize,

    /// Tag the article already has (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Load the initial body from a file.
    #[arg(long, value_name = "FILE")]
    content: Option<PathBuf>,

    /// Write logs here (RUST_LOG filters, default `info`). Without it
    /// nothing is logged, since the terminal belongs to the form.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Keep the first tag suggestion highlighted on ArrowUp instead of
    /// returning to the text field.
    #[arg(long)]
    hold_top: bool,
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }

    let content = match &args.content {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read content from {}", path.display()))?,
        None => String::new(),
    };

    let config = ApiConfig::new(&args.base_url)?
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let client = Arc::new(ApiClient::new(config)?);
    tracing::info!(base_url = %client.base_url(), "starting quill");

    let mut flags = FormFlags::from_client(client);
    flags.initial_tags = args.tags;
    flags.content = content;
    flags.limit = args.limit;
    if args.hold_top {
        flags.tag_up_at_top = UpAtTop::Hold;
    }

    let options = ProgramOptions {
        title: Some("quill".to_string()),
        ..ProgramOptions::default()
    };
    let form = quill::run_with::<ArticleForm>(flags, options)
        .await
        .context("terminal error")?;

    match form.into_submission() {
        Some(submission) => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        None => tracing::info!("quit without submitting"),
    }
    Ok(())
}
