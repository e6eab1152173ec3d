//! DCInside crawl engine orchestration.
//!
//! A run is three phases: an optional rehydrate pass over recent posts, the
//! listing walk (search phase), and the detail phase over the queued IDs.
//! Cancellation is polled before every blocking step; the heartbeat task is
//! stopped on every exit path by its drop guard.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::collector::{is_fatal, Collector};
use super::walker::ListingWalker;
use super::{dates, polite_sleep, DETAIL_DELAY_MS};
use crate::config::{CrawlMode, CrawlOptions, RowLayout, Settings, EXPIRATION_SLEEP_HOURS};
use crate::error::Result;
use crate::repository::Repository;
use crate::scrapers::{CancelToken, CrawlSummary, Fetcher};

const HEARTBEAT_SECS: u64 = 15;

/// Per-run engine configuration, established at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scenario_id: String,
    /// First listing URL of the search phase.
    pub start_url: String,
    /// Host root the run operates under.
    pub base_url: String,
    /// Listing layout for the parsers.
    pub layout: RowLayout,
    /// Host carrying the comments endpoint.
    pub dc_host: String,
    /// Optional lower bound on listing dates.
    pub date_from: Option<DateTime<FixedOffset>>,
    /// Backlog bound for the rehydrate phase: `now − period − sleep hours`.
    pub expiration: Option<DateTime<FixedOffset>>,
    /// Whether the rehydrate phase runs at all.
    pub rehydrate: bool,
}

impl EngineConfig {
    /// Resolve mode and derive the run configuration.
    pub fn from_options(options: &CrawlOptions, settings: &Settings) -> Result<Self> {
        let mode = CrawlMode::resolve(options, settings)?;
        let expiration = (settings.expiration_days > 0).then(|| {
            dates::now_kst()
                - chrono::Duration::days(settings.expiration_days)
                - chrono::Duration::hours(EXPIRATION_SLEEP_HOURS)
        });

        Ok(Self {
            scenario_id: options.scenario_id.clone(),
            start_url: mode.start_url(settings),
            base_url: mode.base_url(settings),
            layout: mode.row_layout(),
            dc_host: settings.dc_host.clone(),
            date_from: None,
            expiration,
            rehydrate: false,
        })
    }
}

/// Liveness logger, aborted when dropped.
struct Heartbeat {
    handle: JoinHandle<()>,
}

impl Heartbeat {
    fn start(scenario_id: String) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(HEARTBEAT_SECS));
            // The first tick fires immediately; consume it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                info!("heartbeat: scenario {scenario_id} crawl in progress");
            }
        });
        Self { handle }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One engine instance drives one scenario run; instances share nothing
/// mutable.
pub struct DcInsideEngine {
    config: EngineConfig,
    fetcher: Arc<dyn Fetcher>,
    repo: Arc<dyn Repository>,
    cancel: CancelToken,
}

impl DcInsideEngine {
    pub fn new(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
        repo: Arc<dyn Repository>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            fetcher,
            repo,
            cancel,
        }
    }

    /// Run the three crawl phases.
    pub async fn start_crawling(&self) -> Result<CrawlSummary> {
        let _heartbeat = Heartbeat::start(self.config.scenario_id.clone());
        info!(
            "starting crawl of scenario {} from {}",
            self.config.scenario_id, self.config.start_url
        );
        self.run().await
    }

    async fn run(&self) -> Result<CrawlSummary> {
        let collector = Collector {
            fetcher: self.fetcher.as_ref(),
            repo: self.repo.as_ref(),
            scenario_id: &self.config.scenario_id,
            dc_host: &self.config.dc_host,
            cancel: &self.cancel,
        };
        let mut summary = CrawlSummary::default();

        if self.config.rehydrate {
            if let Some(since) = self.config.expiration {
                summary.comments_inserted += self.rehydrate(&collector, since).await?;
            }
        }

        let walker = ListingWalker {
            fetcher: self.fetcher.as_ref(),
            repo: self.repo.as_ref(),
            scenario_id: &self.config.scenario_id,
            layout: self.config.layout,
            date_from: self.config.date_from,
            cancel: &self.cancel,
        };
        let mut queued = HashSet::new();
        walker.walk(&self.config.start_url, &mut queued).await?;

        if self.cancel.is_cancelled() {
            return Ok(summary);
        }
        info!("search phase queued {} posts", queued.len());

        let stats = collector.collect(queued.into_iter().collect()).await?;
        summary.posts_inserted += stats.posts_inserted;
        summary.posts_skipped += stats.posts_skipped;
        summary.comments_inserted += stats.comments_inserted;

        info!(
            "crawl of scenario {} finished: {} posts, {} comments, {} skipped",
            self.config.scenario_id,
            summary.posts_inserted,
            summary.comments_inserted,
            summary.posts_skipped
        );
        Ok(summary)
    }

    /// Refresh posts persisted inside the expiration window.
    async fn rehydrate(
        &self,
        collector: &Collector<'_>,
        since: DateTime<FixedOffset>,
    ) -> Result<u64> {
        let posts = self
            .repo
            .list_recent_posts(&self.config.scenario_id, since)
            .await?;
        info!("rehydrating {} posts written since {since}", posts.len());

        let mut inserted = 0u64;
        for post in posts {
            if self.cancel.is_cancelled() {
                break;
            }
            polite_sleep(DETAIL_DELAY_MS).await;

            match collector.refresh_post(&post).await {
                Ok(count) => inserted += count,
                Err(err) if is_fatal(&err) => return Err(err),
                Err(err) => warn!("rehydrate of {} failed: {err}", post.platform_post_id),
            }
        }
        Ok(inserted)
    }
}
