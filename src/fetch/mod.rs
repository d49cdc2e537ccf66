//! Remote document download for URL imports.
//!
//! [`Fetcher::fetch`] rewrites Sheets share links to their CSV export, then performs a GET with a
//! browser-like header set, following redirects manually so the hop limit applies to the whole
//! chain.

pub mod google_sheets;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, LOCATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::FetchError;

pub use google_sheets::rewrite_sheets_url;

/// Default cap on a downloaded body (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Options controlling remote downloads.
///
/// Use [`Default`] for the stock browser-like behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Upper bound for the whole download, redirects included.
    pub timeout_secs: u64,
    /// Maximum number of redirect hops followed.
    pub max_redirects: usize,
    /// Downloads larger than this fail with [`FetchError::BodyTooLarge`].
    pub max_body_bytes: usize,
    /// Skip TLS certificate validation.
    ///
    /// On by default so self-signed development hosts work. Turn it off for any deployment that
    /// fetches from untrusted networks.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 5,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            accept_invalid_certs: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            accept: "*/*".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP(S) downloader with manual redirect handling.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    options: FetchOptions,
}

impl Fetcher {
    /// Build a fetcher (and its HTTP client) from `options`.
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&options.user_agent)?);
        headers.insert(ACCEPT, header_value(&options.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&options.accept_language)?);
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .default_headers(headers)
            .timeout(options.timeout())
            .build()?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Rewrite `url` if it is a Sheets share link, then download it.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let download_url = rewrite_sheets_url(url);
        if download_url != url {
            debug!(from = %url, to = %download_url, "rewrote sheets url to csv export");
        }
        self.download(&download_url).await
    }

    /// Download `url` as-is, following up to `max_redirects` redirects.
    ///
    /// The body is returned only for a final `200`; every other non-redirect status is an
    /// [`FetchError::HttpStatus`].
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let start = parse_http_url(url)?;
        info!(url = %start, "downloading");

        let bytes = tokio::time::timeout(self.options.timeout(), self.follow_chain(start))
            .await
            .map_err(|_| FetchError::Timeout)??;

        info!(bytes = bytes.len(), "download complete");
        Ok(bytes)
    }

    async fn follow_chain(&self, start: Url) -> Result<Vec<u8>, FetchError> {
        let mut current = start;
        let mut redirects = 0usize;

        loop {
            let mut response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                if let Some(location) = location {
                    redirects += 1;
                    if redirects > self.options.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            limit: self.options.max_redirects,
                        });
                    }
                    let next = current.join(&location).map_err(|e| FetchError::InvalidUrl {
                        message: format!("bad redirect location '{location}': {e}"),
                    })?;
                    debug!(hop = redirects, status = status.as_u16(), to = %next, "following redirect");
                    current = next;
                    continue;
                }
            }

            if status != StatusCode::OK {
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("").to_string(),
                });
            }

            return read_body_with_limit(&mut response, self.options.max_body_bytes).await;
        }
    }
}

/// Read the body in arrival order, failing as soon as it is known to exceed `limit` bytes.
///
/// An advertised `Content-Length` over the limit fails before any of the body is read.
async fn read_body_with_limit(response: &mut reqwest::Response, limit: usize) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::BodyTooLarge { limit });
        }
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::Network {
        message: format!("invalid request header value '{value}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_http_url, FetchOptions};
    use crate::error::FetchError;

    #[test]
    fn default_options() {
        let opts = FetchOptions::default();
        assert_eq!(opts.timeout_secs, 30);
        assert_eq!(opts.max_redirects, 5);
        assert_eq!(opts.max_body_bytes, 10 * 1024 * 1024);
        assert!(opts.accept_invalid_certs);
        assert!(opts.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: FetchOptions =
            serde_json::from_str(r#"{"accept_invalid_certs": false, "timeout_secs": 5}"#).unwrap();
        assert!(!opts.accept_invalid_certs);
        assert_eq!(opts.timeout_secs, 5);
        assert_eq!(opts.max_redirects, 5);
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            parse_http_url("ftp://example.com/roster.csv"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_http_url("roster.csv"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(parse_http_url(" https://example.com/roster.csv ").is_ok());
    }
}
