//! Minimal HTTP client for fetching HTML pages with safe logging.
//!
//! - Request options: headers and a per-request timeout
//! - The caller hands over the full [`Url`]; nothing is resolved against a base
//! - Redacts sensitive query params and auth headers in logs
//! - One attempt per request: failures surface immediately as [`HttpError`]
//! - Optional *raw* request/response logging via `GAMESCOUT_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), gamescout_http::HttpError> {
//! use std::time::Duration;
//!
//! let client = gamescout_http::HttpClient::new(Duration::from_secs(10))?;
//! let url = gamescout_http::Url::parse("https://example.com/index.html")
//!     .map_err(|e| gamescout_http::HttpError::Url(e.to_string()))?;
//! let page: String = client
//!     .get_text(&url, gamescout_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `GAMESCOUT_HTTP_RAW=1`.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

pub use reqwest::Url;
pub use reqwest::header;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "GAMESCOUT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    let (host_path, query) = redact_query(url);
    let mut shown = format!("{}://{}", url.scheme(), host_path);
    if !query.is_empty() {
        let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        shown.push('?');
        shown.push_str(&pairs.join("&"));
    }
    parts.push(format!("'{}'", shown));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("cookie") {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    /// `message` is the canonical reason phrase, or a body snippet when the
    /// status has none.
    #[error("server returned HTTP {}: {message}", .status.as_u16())]
    Api { status: StatusCode, message: String },
}

impl HttpError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_builder() {
            HttpError::Build(err.to_string())
        } else {
            HttpError::Network(err.to_string())
        }
    }
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use gamescout_http::RequestOpts;
/// use gamescout_http::header::{HeaderMap, HeaderValue, USER_AGENT};
/// use std::time::Duration;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(USER_AGENT, HeaderValue::from_static("gamescout-test"));
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(10)),
///     headers: Some(headers),
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 10);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    /// Overrides [`HttpClient::default_timeout`] for one request.
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    /// Bounds the whole request, connect phase included.
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client whose only time limit is `timeout`.
    ///
    /// ```no_run
    /// use gamescout_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new(Duration::from_secs(10))?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(10));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: timeout,
        })
    }

    /// GET `url` and return its body decoded as text.
    ///
    /// Any non-2xx status is returned as [`HttpError::Api`].
    pub async fn get_text(&self, url: &Url, opts: RequestOpts) -> Result<String, HttpError> {
        let method = Method::GET;

        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        let req_id = format!("r{}", NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed));
        let (host_path, redacted_q) = redact_query(url);

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let empty = HeaderMap::new();
            let curl = make_curl(&method, url, opts.headers.as_ref().unwrap_or(&empty));
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let err = HttpError::from_reqwest(err);
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.send");
            err
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|err| {
            let err = HttpError::from_reqwest(err);
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.body");
            err
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=body.len(),
            content_length=content_len(&headers, body.len()),
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let mut text = body.clone();
            let truncated = text.len() > RAW_MAX_BODY;
            if truncated {
                text.truncate(floor_char_boundary(&text, RAW_MAX_BODY));
            }
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&body);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return Ok(body);
        }

        tracing::warn!(
            req_id=%req_id,
            %status,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or(snippet),
        })
    }
}

// ==============================
// Helpers
// ==============================

fn snip_body(body: &str) -> String {
    let mut snip = body.to_string();
    if snip.len() > 500 {
        snip.truncate(floor_char_boundary(&snip, 500));
        snip.push_str("...");
    }
    snip
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    // Return "host + path" string and redacted query list for logging
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = v.to_string();
            let is_secret = matches!(
                k.to_ascii_lowercase().as_str(),
                "access_token"
                    | "authorization"
                    | "auth"
                    | "key"
                    | "api_key"
                    | "token"
                    | "secret"
                    | "client_secret"
                    | "bearer"
            );
            (k, if is_secret { "<redacted>".into() } else { v })
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

fn content_len(headers: &HeaderMap, body_len: usize) -> usize {
    headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(body_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, HeaderValue, USER_AGENT};

    #[test]
    fn secret_query_params_are_redacted() {
        let url = Url::parse("https://example.com/search?q=snes&api_key=abc123").unwrap();
        let (host_path, q) = redact_query(&url);
        assert_eq!(host_path, "example.com/search");
        assert_eq!(
            q,
            vec![
                ("q".to_string(), "snes".to_string()),
                ("api_key".to_string(), "<redacted>".to_string()),
            ]
        );
    }

    #[test]
    fn curl_hides_auth_but_keeps_user_agent() {
        let mut h = HeaderMap::new();
        h.insert(USER_AGENT, HeaderValue::from_static("ua/1.0"));
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cr3t"));
        let url = Url::parse("https://example.com/search?q=wii").unwrap();

        let curl = make_curl(&Method::GET, &url, &h);
        assert!(curl.contains("user-agent: ua/1.0"));
        assert!(!curl.contains("s3cr3t"));
        assert!(curl.ends_with("'https://example.com/search?q=wii'"));
    }

    #[test]
    fn snippets_are_truncated_on_char_boundaries() {
        let body = "é".repeat(400);
        let snip = snip_body(&body);
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= 503);
    }

    #[test]
    fn configured_timeout_is_the_only_bound() {
        let client = HttpClient::new(Duration::from_secs(30)).unwrap();
        assert_eq!(client.default_timeout, Duration::from_secs(30));
    }

    #[test]
    fn api_error_names_the_reason_once() {
        let err = HttpError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Service Unavailable".into(),
        };
        let text = err.to_string();
        assert_eq!(text, "server returned HTTP 503: Service Unavailable");
        assert_eq!(text.matches("Service Unavailable").count(), 1);
    }
}
