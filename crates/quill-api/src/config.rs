use std::time::Duration;

use reqwest::Url;

use crate::error::ApiError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the article server lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are resolved relative to it.
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiConfig {
    /// Validate `base_url`: it must be an absolute `http` or `https` URL with
    /// a host. A trailing slash is added so relative endpoint paths resolve
    /// under any path prefix.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: &str| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let mut url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("quill/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/wiki").unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/wiki/");
        let config = ApiConfig::new("https://example.org").unwrap();
        assert_eq!(config.base_url.as_str(), "https://example.org/");
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("ftp://example.org"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn builders_override_defaults() {
        let config = ApiConfig::new("http://127.0.0.1:5000")
            .unwrap()
            .with_timeout(Duration::from_secs(2))
            .with_user_agent("tests");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "tests");
    }
}
