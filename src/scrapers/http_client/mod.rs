//! HTTP client tuned for community-site upstreams.
//!
//! One attempt: realistic desktop headers, 10 s timeout, up to 5 redirects
//! followed transparently. Failed attempts (anything except 404 and
//! off-host redirects) retry with exponential backoff before propagating.

mod user_agent;

pub use user_agent::{random_user_agent, USER_AGENTS};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, redirect, Client, StatusCode};
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::Fetcher;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;
/// Retries after the initial attempt.
const MAX_RETRIES: u32 = 3;

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const JSON_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Classified HTTP failure.
#[derive(Error, Debug)]
pub enum HttpError {
    /// 404. Content deleted upstream; never retried.
    #[error("not found: {0}")]
    NotFound(String),

    /// 429. Retried with backoff until attempts exhaust.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success status.
    #[error("http status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The redirect chain left the requested host.
    #[error("redirected off host: {url} landed on {final_host}")]
    RedirectedOffHost { url: String, final_host: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HttpError {
    /// Whether another attempt can change the outcome.
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::RedirectedOffHost { .. })
    }
}

/// Backoff before retry `attempt` (1-indexed): 2^attempt seconds.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * 2u64.pow(attempt))
}

/// Run `op` with the per-request retry policy.
///
/// Issues at most `MAX_RETRIES + 1` attempts with sleeps of 2 s, 4 s, 8 s
/// between them. The attempt counter is local to this call.
pub(crate) async fn with_backoff<T, F, Fut>(url: &str, mut op: F) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt > MAX_RETRIES => return Err(err),
            Err(err) => {
                let delay = backoff_delay(attempt);
                warn!(
                    "request failed ({err}); retry {attempt}/{MAX_RETRIES} for {url} in {}s",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn classify(status: StatusCode, url: &str) -> Result<(), HttpError> {
    if status == StatusCode::NOT_FOUND {
        return Err(HttpError::NotFound(url.to_string()));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(HttpError::RateLimited(url.to_string()));
    }
    if status.is_client_error() || status.is_server_error() {
        return Err(HttpError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{}", parsed.scheme(), host))
}

/// HTTP client with per-request user agents and bounded retries.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    /// Referer sent on POST requests; the run URL when configured.
    referer: Option<String>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_referer(None)
    }

    /// Create a client whose POST requests carry `referer`.
    pub fn with_referer(referer: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, referer }
    }

    async fn get_once(&self, url: &str) -> Result<String, HttpError> {
        let requested_host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));

        let mut request = self
            .client
            .get(url)
            .header(header::USER_AGENT, random_user_agent())
            .header(header::ACCEPT, HTML_ACCEPT);
        if let Some(origin) = origin_of(url) {
            request = request.header(header::REFERER, origin);
        }

        let response = request.send().await?;
        classify(response.status(), url)?;

        if let (Some(requested), Some(landed)) = (requested_host, response.url().host_str()) {
            if requested != landed {
                return Err(HttpError::RedirectedOffHost {
                    url: url.to_string(),
                    final_host: landed.to_string(),
                });
            }
        }

        Ok(response.text().await?)
    }

    async fn post_once(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<serde_json::Value, HttpError> {
        let referer = self.referer.clone().or_else(|| origin_of(url));

        let mut request = self
            .client
            .post(url)
            .header(header::USER_AGENT, random_user_agent())
            .header(header::ACCEPT, JSON_ACCEPT)
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(referer) = referer {
            request = request.header(header::REFERER, referer);
        }

        let response = request.form(form).send().await?;
        classify(response.status(), url)?;
        Ok(response.json().await?)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get_html(&self, url: &str) -> Result<String, HttpError> {
        with_backoff(url, || self.get_once(url)).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<serde_json::Value, HttpError> {
        with_backoff(url, || self.post_once(url, form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status_err(status: u16) -> HttpError {
        HttpError::Status {
            url: "https://gall.dcinside.com/board/lists/?id=pro".to_string(),
            status,
        }
    }

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_classify_statuses() {
        assert!(classify(StatusCode::OK, "u").is_ok());
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, "u"),
            Err(HttpError::NotFound(_))
        ));
        assert!(matches!(
            classify(StatusCode::TOO_MANY_REQUESTS, "u"),
            Err(HttpError::RateLimited(_))
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "u"),
            Err(HttpError::Status { status: 500, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_retries_then_succeeds() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = with_backoff("u", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(status_err(429))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two failures: slept 2s then 4s.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_exhausts_after_four_attempts() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<&str, _> = with_backoff("u", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status_err(500)) }
        })
        .await;

        assert!(matches!(result, Err(HttpError::Status { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 + 8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_never_retries_not_found() {
        let calls = AtomicU32::new(0);

        let result: Result<&str, _> = with_backoff("u", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(HttpError::NotFound("u".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(HttpError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
