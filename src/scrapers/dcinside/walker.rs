//! Stateful listing walker.
//!
//! Traverses listing pages in blocks: the current page first, then every
//! per-page link of its pagination block, then the next block. Stops at the
//! date cutoff, at the incremental frontier (a post the repository already
//! holds for this scenario), or when pagination is exhausted.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};
use url::Url;

use super::listing::{parse_listing, parse_pagination};
use super::url::PlatformPostId;
use super::{polite_sleep, LISTING_DELAY_MS};
use crate::config::RowLayout;
use crate::error::{CrawlError, Result};
use crate::repository::Repository;
use crate::scrapers::{CancelToken, Fetcher};

/// Outcome of ingesting one batch of rows.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct ListingWalker<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub repo: &'a dyn Repository,
    pub scenario_id: &'a str,
    pub layout: RowLayout,
    /// Rows strictly older than this end the walk.
    pub date_from: Option<DateTime<FixedOffset>>,
    pub cancel: &'a CancelToken,
}

impl ListingWalker<'_> {
    /// Walk listing pages starting at `start_url`, queueing discovered
    /// platform IDs into `queued`.
    pub async fn walk(&self, start_url: &str, queued: &mut HashSet<PlatformPostId>) -> Result<()> {
        let mut current = start_url.to_string();

        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let page_url =
                Url::parse(&current).map_err(|_| CrawlError::InvalidUrl(current.clone()))?;
            let html = self.fetcher.get_html(&current).await?;

            if self.ingest(&html, &page_url, queued).await? == Flow::Stop {
                return Ok(());
            }

            let pagination = parse_pagination(&html, self.layout, &page_url);
            for link in &pagination.page_urls {
                if self.cancel.is_cancelled() {
                    return Ok(());
                }
                polite_sleep(LISTING_DELAY_MS).await;

                let html = self.fetcher.get_html(link.as_str()).await?;
                if self.ingest(&html, link, queued).await? == Flow::Stop {
                    return Ok(());
                }
            }

            match pagination.next_block {
                Some(next) => {
                    polite_sleep(LISTING_DELAY_MS).await;
                    current = next.to_string();
                }
                None => {
                    debug!("pagination exhausted at {current}");
                    return Ok(());
                }
            }
        }
    }

    async fn ingest(
        &self,
        html: &str,
        page_url: &Url,
        queued: &mut HashSet<PlatformPostId>,
    ) -> Result<Flow> {
        let items = parse_listing(html, self.layout, page_url);
        let mut matched = 0usize;

        for item in items {
            let id = match PlatformPostId::from_url(item.url.as_str()) {
                Ok(id) => id,
                Err(_) => {
                    debug!("skipping unrecognizable row link {}", item.url);
                    continue;
                }
            };

            if let (Some(cutoff), Some(written)) = (self.date_from, item.written_at) {
                if written < cutoff {
                    info!("date cutoff reached at {id} ({written})");
                    return Ok(Flow::Stop);
                }
            }

            if queued.contains(&id) {
                continue;
            }
            if self
                .repo
                .find_post_by_platform_id(self.scenario_id, &id.to_string())
                .await?
                .is_some()
            {
                info!("incremental frontier reached at {id}");
                return Ok(Flow::Stop);
            }

            queued.insert(id);
            matched += 1;
        }

        info!(
            "matched {matched} new posts on {} ({} queued total)",
            page_url,
            queued.len()
        );
        Ok(Flow::Continue)
    }
}
