//! YouTube engine placeholder.

use tracing::warn;

use crate::config::CrawlOptions;
use crate::error::{CrawlError, Result};
use crate::scrapers::CrawlSummary;

/// Routed by the dispatcher when `YOUTUBE_CRAWLER` matches the run's code.
pub async fn run(options: &CrawlOptions) -> Result<CrawlSummary> {
    warn!(
        "youtube engine is not implemented; refusing crawler code {}",
        options.crawler_code
    );
    Err(CrawlError::Unsupported(options.crawler_code.clone()))
}
