//! The search operation: build the query, fetch one page, extract fragments.
//!
//! [`search`] is a pure function of its inputs; the network sits behind
//! [`PageFetcher`] and every selector comes from [`SearchSettings`].

use crate::extract::{ExtractError, SearchReport, extract};
use crate::query::{build_query, build_search_url};
use async_trait::async_trait;
use gamescout_config::SearchSettings;
use gamescout_http::header::{HeaderMap, HeaderValue, USER_AGENT};
use gamescout_http::{HttpClient, HttpError, RequestOpts};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Fetches the body of a result page. One attempt, no retries.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<String, HttpError>;
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<String, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| HttpError::Build(e.to_string()))?,
        );
        self.get_text(
            url,
            RequestOpts {
                timeout: Some(timeout),
                headers: Some(headers),
            },
        )
        .await
    }
}

/// Why a search produced no report. The `Display` text is what users see.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Error making request: {0}")]
    Transport(#[from] HttpError),
    #[error("Error parsing results: {0}")]
    Extraction(#[from] ExtractError),
}

/// Run one search for `console`.
pub async fn search<F>(
    fetcher: &F,
    settings: &SearchSettings,
    console: &str,
) -> Result<SearchReport, SearchError>
where
    F: PageFetcher + ?Sized,
{
    let query = build_query(&settings.query_template, console);
    let url = build_search_url(&settings.url_template, &query)?;

    let started = Instant::now();
    tracing::info!(
        target: "web.search",
        console = %console,
        host = url.host_str().unwrap_or("-"),
        "search.start"
    );

    let body = fetcher
        .fetch(&url, &settings.user_agent, Duration::from_secs(settings.timeout_secs))
        .await?;
    let report = extract(&body, &settings.rules)?;

    tracing::info!(
        target: "web.search",
        console = %console,
        fragments = report.fragments.len(),
        body_len = body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search.done"
    );
    Ok(report)
}

/// Collapse a search outcome into the text shown to the user.
///
/// ```
/// use gamescout_http::HttpError;
/// use gamescout_web::{SearchError, SearchReport, NO_RESULTS, render_outcome};
///
/// assert_eq!(render_outcome(&Ok(SearchReport::default())), NO_RESULTS);
///
/// let failed = Err(SearchError::Transport(HttpError::Timeout("10s elapsed".into())));
/// assert_eq!(
///     render_outcome(&failed),
///     "Error making request: request timed out: 10s elapsed"
/// );
/// ```
pub fn render_outcome(outcome: &Result<SearchReport, SearchError>) -> String {
    match outcome {
        Ok(report) => report.render(),
        Err(err) => err.to_string(),
    }
}

/// A fetcher bound to its settings; what the interactive front end holds.
#[derive(Clone)]
pub struct GameSearch {
    fetcher: Arc<dyn PageFetcher>,
    settings: SearchSettings,
}

impl GameSearch {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: SearchSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Build the default reqwest-backed fetcher for `settings`.
    pub fn from_settings(settings: SearchSettings) -> Result<Self, HttpError> {
        let client = HttpClient::new(Duration::from_secs(settings.timeout_secs))?;
        Ok(Self::new(Arc::new(client), settings))
    }

    pub async fn search(&self, console: &str) -> Result<SearchReport, SearchError> {
        search(self.fetcher.as_ref(), &self.settings, console).await
    }

    /// Like [`GameSearch::search`], but failures come back as text.
    pub async fn search_text(&self, console: &str) -> String {
        let outcome = self.search(console).await;
        if let Err(err) = &outcome {
            tracing::warn!(target: "web.search", console = %console, error = %err, "search.failed");
        }
        render_outcome(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves a canned response and remembers what it was asked for.
    struct CannedFetcher {
        response: Box<dyn Fn() -> Result<String, HttpError> + Send + Sync>,
        seen: Mutex<Vec<(String, String, Duration)>>,
    }

    impl CannedFetcher {
        fn new(response: impl Fn() -> Result<String, HttpError> + Send + Sync + 'static) -> Self {
            Self {
                response: Box::new(response),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(
            &self,
            url: &Url,
            user_agent: &str,
            timeout: Duration,
        ) -> Result<String, HttpError> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), user_agent.to_string(), timeout));
            (self.response)()
        }
    }

    #[tokio::test]
    async fn fetches_the_templated_url_with_configured_headers() {
        let fetcher = CannedFetcher::new(|| Ok(String::new()));
        let settings = SearchSettings::default();

        let _ = search(&fetcher, &settings, "Xbox 360").await;

        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (url, ua, timeout) = &seen[0];
        assert_eq!(
            url,
            "https://www.google.com/search?q=most%20popular%20video%20game%20for%20Xbox%20360"
        );
        assert_eq!(ua, &settings.user_agent);
        assert_eq!(*timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn transport_failure_is_reported_as_request_error() {
        let fetcher = CannedFetcher::new(|| Err(HttpError::Network("dns error".into())));
        let search = GameSearch::new(Arc::new(fetcher), SearchSettings::default());

        let text = search.search_text("Dreamcast").await;
        assert_eq!(text, "Error making request: network error: dns error");
    }

    #[tokio::test]
    async fn bad_rules_are_reported_as_parse_error() {
        let fetcher = CannedFetcher::new(|| Ok("<div class=\"g\"><h3>x</h3></div>".into()));
        let mut settings = SearchSettings::default();
        settings.rules.organic.container = ":::".into();
        let search = GameSearch::new(Arc::new(fetcher), settings);

        let outcome = search.search("Wii U").await;
        assert!(matches!(outcome, Err(SearchError::Extraction(_))));
        assert!(render_outcome(&outcome).starts_with("Error parsing results: "));
    }

    #[tokio::test]
    async fn unmatched_page_renders_fixed_message() {
        let fetcher = CannedFetcher::new(|| Ok("<html><body>captcha</body></html>".into()));
        let search = GameSearch::new(Arc::new(fetcher), SearchSettings::default());

        assert_eq!(search.search_text("PS2").await, crate::NO_RESULTS);
    }

    #[tokio::test]
    async fn broken_url_template_never_reaches_the_fetcher() {
        let fetcher = Arc::new(CannedFetcher::new(|| Ok(String::new())));
        let mut settings = SearchSettings::default();
        settings.url_template = "search?q={query}".into();
        let search = GameSearch::new(fetcher.clone(), settings);

        let text = search.search_text("GameCube").await;
        assert!(text.starts_with("Error making request: invalid URL"));
        assert!(fetcher.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn configured_timeout_reaches_the_fetcher_unchanged() {
        let fetcher = Arc::new(CannedFetcher::new(|| Ok(String::new())));
        let settings = SearchSettings {
            timeout_secs: 30,
            ..SearchSettings::default()
        };
        let search = GameSearch::new(fetcher.clone(), settings);

        search.search_text("Saturn").await;
        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen[0].2, Duration::from_secs(30));
    }
}
