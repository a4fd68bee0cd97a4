use crate::utils::error::{ExporterError, Result};
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Reddit Comment Exporter 1.0";
pub const UNKNOWN_POST_ID: &str = "unknown";

const REDDIT_DOMAIN: &str = "reddit.com";

fn post_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)comments/([a-z0-9]+)/").expect("post id pattern is a valid regex")
    })
}

/// Pulls the thread id out of a `.../comments/<id>/...` URL.
pub fn extract_post_id(input: &str) -> Option<String> {
    post_id_pattern()
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Turns user input into the thread's `.json` endpoint.
///
/// A missing scheme defaults to `https://`. The host must be a reddit.com host. When
/// `api_base` is set its scheme, host and port replace the reddit origin while the path and
/// query are kept, so mirrors and local test servers can stand in for reddit.
pub fn normalize_thread_url(input: &str, api_base: Option<&str>) -> Result<Url> {
    let trimmed = input.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let invalid = |reason: &str| ExporterError::InvalidUrlError {
        url: input.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;

    match url.host_str() {
        Some(host) if host.contains(REDDIT_DOMAIN) => {}
        _ => return Err(invalid("host is not a reddit.com domain")),
    }

    if !url.path().ends_with(".json") {
        let path = format!("{}.json", url.path());
        url.set_path(&path);
    }

    if let Some(base) = api_base {
        let mut rebased = Url::parse(base).map_err(|e| ExporterError::InvalidConfigValueError {
            field: "api_base".to_string(),
            value: base.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        rebased.set_path(url.path());
        rebased.set_query(url.query());
        url = rebased;
    }

    Ok(url)
}

pub struct RedditClient {
    client: Client,
    user_agent: String,
}

impl RedditClient {
    pub fn new(user_agent: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    pub async fn fetch_thread(&self, url: &Url) -> Result<serde_json::Value> {
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Rate limited by {}", url);
            return Err(ExporterError::RateLimitedError);
        }

        if !status.is_success() {
            return Err(ExporterError::HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_normalize_adds_scheme_and_json_suffix() {
        let url = normalize_thread_url("www.reddit.com/r/rust/comments/abc123/title/", None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/rust/comments/abc123/title/.json"
        );
    }

    #[test]
    fn test_normalize_keeps_existing_json_suffix() {
        let url =
            normalize_thread_url("https://old.reddit.com/r/rust/comments/abc123.json", None)
                .unwrap();
        assert_eq!(url.as_str(), "https://old.reddit.com/r/rust/comments/abc123.json");
    }

    #[test]
    fn test_normalize_keeps_query_after_suffix() {
        let url =
            normalize_thread_url("https://www.reddit.com/r/rust/comments/abc/t?sort=top", None)
                .unwrap();
        assert_eq!(url.path(), "/r/rust/comments/abc/t.json");
        assert_eq!(url.query(), Some("sort=top"));
    }

    #[test]
    fn test_normalize_rejects_other_hosts() {
        let err = normalize_thread_url("https://example.com/comments/abc/x/", None).unwrap_err();
        assert!(matches!(err, ExporterError::InvalidUrlError { .. }));
        assert!(normalize_thread_url("", None).is_err());
    }

    #[test]
    fn test_normalize_rebases_onto_api_base() {
        let url = normalize_thread_url(
            "https://www.reddit.com/r/rust/comments/abc123/title/",
            Some("http://127.0.0.1:8080"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/r/rust/comments/abc123/title/.json"
        );
    }

    #[test]
    fn test_extract_post_id() {
        assert_eq!(
            extract_post_id("https://www.reddit.com/r/rust/comments/AbC123/title/"),
            Some("AbC123".to_string())
        );
        // 需要結尾斜線
        assert_eq!(extract_post_id("https://www.reddit.com/r/rust/comments/abc123"), None);
        assert_eq!(extract_post_id("https://www.reddit.com/r/rust/"), None);
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/r/rust/comments/abc/t.json")
                .header("user-agent", DEFAULT_USER_AGENT);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{}, {}]));
        });

        let client = RedditClient::new(DEFAULT_USER_AGENT, 5).unwrap();
        let url = Url::parse(&server.url("/r/rust/comments/abc/t.json")).unwrap();
        let body = client.fetch_thread(&url).await.unwrap();

        api_mock.assert();
        assert!(body.is_array());
    }

    #[tokio::test]
    async fn test_fetch_maps_429_to_rate_limited() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(429);
        });

        let client = RedditClient::new(DEFAULT_USER_AGENT, 5).unwrap();
        let url = Url::parse(&server.url("/r/rust/comments/abc/t.json")).unwrap();
        let err = client.fetch_thread(&url).await.unwrap_err();
        assert!(matches!(err, ExporterError::RateLimitedError));
    }

    #[tokio::test]
    async fn test_fetch_maps_other_statuses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });

        let client = RedditClient::new(DEFAULT_USER_AGENT, 5).unwrap();
        let url = Url::parse(&server.url("/r/rust/comments/gone/t.json")).unwrap();
        let err = client.fetch_thread(&url).await.unwrap_err();
        assert!(matches!(err, ExporterError::HttpStatusError { status: 404, .. }));
    }
}
