//! CLI entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::config::{CrawlOptions, Settings};
use crate::repository::MemoryRepository;
use crate::scrapers::{run_crawler, CancelToken};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Incremental post and comment harvester for Korean community sites")]
#[command(version)]
pub struct Cli {
    /// Scenario ID scoping all persisted rows of this run
    #[arg(long)]
    sid: String,

    /// Crawler code selecting the site and mode
    #[arg(long)]
    cid: String,

    /// Listing or gallog URL, depending on mode
    #[arg(long)]
    url: Option<String>,

    /// Search keyword (keyword mode)
    #[arg(long)]
    keyword: Option<String>,

    /// Target gallery ID
    #[arg(long)]
    target: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments, run one crawl, report the outcome.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    let options = CrawlOptions {
        scenario_id: cli.sid,
        crawler_code: cli.cid,
        url: cli.url,
        keyword: cli.keyword,
        target: cli.target,
    };

    let repo = Arc::new(MemoryRepository::new());
    let summary = run_crawler(&options, &settings, repo, CancelToken::new()).await?;

    info!(
        "run complete: {} posts inserted, {} comments inserted, {} posts skipped",
        summary.posts_inserted, summary.comments_inserted, summary.posts_skipped
    );
    Ok(())
}
