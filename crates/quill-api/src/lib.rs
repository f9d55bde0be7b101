//! HTTP client for the quill article server.
//!
//! [`ApiClient`] wraps a configured `reqwest::Client` and implements the
//! lookup traits the widgets depend on ([`TagSource`], [`ArticleSource`],
//! [`LinkChecker`]), so it can be handed to them directly:
//!
//! ```ignore
//! let client = Arc::new(ApiClient::new(ApiConfig::new("http://127.0.0.1:5000")?)?);
//! let tags = TagInput::new(client.clone());
//! let body = LinkEditor::new(client.clone(), client);
//! ```
//!
//! Endpoints:
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | `GET` | `api/tags/suggestions?q=&limit=` | tag picker |
//! | `GET` | `api/articles/autocomplete?q=&limit=` | link editor |
//! | `POST` | `api/links/validate` | link validator |
//! | `GET` | `api/articles/exists?title=` | [`ApiClient::article_exists`] |

mod config;
mod error;
mod wire;

use futures::FutureExt;
use quill_widgets::lookup::LookupFuture;
use quill_widgets::{ArticleSource, Candidate, LinkChecker, LookupError, TagSource, ValidationResult};
use reqwest::{header, Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use config::{ApiConfig, DEFAULT_TIMEOUT};
pub use error::ApiError;

const TAG_SUGGESTIONS: &str = "api/tags/suggestions";
const ARTICLE_AUTOCOMPLETE: &str = "api/articles/autocomplete";
const VALIDATE_LINKS: &str = "api/links/validate";
const ARTICLE_EXISTS: &str = "api/articles/exists";

/// Client for the article server. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Up to `limit` tags matching `query`.
    pub async fn tag_suggestions(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ApiError> {
        let body: Value = self
            .send(TAG_SUGGESTIONS, |req| {
                req.query(&[("q", query.to_string()), ("limit", limit.to_string())])
            })
            .await?;
        Ok(wire::tag_candidates(&body))
    }

    /// Up to `limit` article titles matching `query`.
    pub async fn article_titles(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ApiError> {
        let body: Value = self
            .send(ARTICLE_AUTOCOMPLETE, |req| {
                req.query(&[("q", query.to_string()), ("limit", limit.to_string())])
            })
            .await?;
        Ok(wire::title_candidates(&body))
    }

    /// Check every `[[target]]` in `content`.
    pub async fn validate_links(&self, content: &str) -> Result<ValidationResult, ApiError> {
        let url = self.endpoint(VALIDATE_LINKS)?;
        let request = self
            .http
            .post(url)
            .json(&wire::ValidateRequest { content });
        let response: wire::ValidateResponse = self.execute(VALIDATE_LINKS, request).await?;
        Ok(response.into())
    }

    /// Whether an article titled `title` exists.
    pub async fn article_exists(&self, title: &str) -> Result<bool, ApiError> {
        let response: wire::ExistsResponse = self
            .send(ARTICLE_EXISTS, |req| req.query(&[("title", title)]))
            .await?;
        Ok(response.exists)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(path, build(self.http.get(url))).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(path, "sending request");
        let response = request.send().await.map_err(|source| ApiError::Request {
            path: path.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|source| ApiError::Request {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

impl TagSource for ApiClient {
    fn suggest_tags(&self, query: &str, limit: usize) -> LookupFuture<Vec<Candidate>> {
        let client = self.clone();
        let query = query.to_string();
        async move {
            client
                .tag_suggestions(&query, limit)
                .await
                .map_err(LookupError::from)
        }
        .boxed()
    }
}

impl ArticleSource for ApiClient {
    fn autocomplete(&self, query: &str, limit: usize) -> LookupFuture<Vec<Candidate>> {
        let client = self.clone();
        let query = query.to_string();
        async move {
            client
                .article_titles(&query, limit)
                .await
                .map_err(LookupError::from)
        }
        .boxed()
    }
}

impl LinkChecker for ApiClient {
    fn validate(&self, content: &str) -> LookupFuture<ValidationResult> {
        let client = self.clone();
        let content = content.to_string();
        async move {
            client
                .validate_links(&content)
                .await
                .map_err(LookupError::from)
        }
        .boxed()
    }
}
