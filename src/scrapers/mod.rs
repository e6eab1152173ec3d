//! Site crawl engines and shared crawl plumbing.

pub mod dcinside;
pub mod http_client;
pub mod ruliweb;
pub mod youtube;

pub use http_client::HttpClient;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{CrawlOptions, Settings};
use crate::error::Result;
use crate::repository::Repository;
use self::http_client::HttpError;

/// Page-fetching port between the engines and the HTTP client.
///
/// Behavioral tests substitute canned pages here; retry policy lives below
/// this seam, in the client.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a page as HTML text.
    async fn get_html(&self, url: &str) -> std::result::Result<String, HttpError>;

    /// POST a form and decode the JSON response.
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> std::result::Result<serde_json::Value, HttpError>;
}

/// Cooperative cancellation handle shared between a run and its caller.
///
/// Cancellation is silent and non-faulting: in-flight work completes and
/// further work is abandoned.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrawlSummary {
    pub posts_inserted: u64,
    pub posts_skipped: u64,
    pub comments_inserted: u64,
}

/// Route a run to the engine selected by its crawler code.
pub async fn run_crawler(
    options: &CrawlOptions,
    settings: &Settings,
    repo: Arc<dyn Repository>,
    cancel: CancelToken,
) -> Result<CrawlSummary> {
    if settings
        .youtube_code
        .as_deref()
        .is_some_and(|code| code == options.crawler_code)
    {
        return youtube::run(options).await;
    }
    if settings
        .ruliweb_code
        .as_deref()
        .is_some_and(|code| code == options.crawler_code)
    {
        return ruliweb::run(options).await;
    }

    let config = dcinside::EngineConfig::from_options(options, settings)?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpClient::with_referer(Some(config.start_url.clone())));
    let engine = dcinside::DcInsideEngine::new(config, fetcher, repo, cancel);
    engine.start_crawling().await
}
