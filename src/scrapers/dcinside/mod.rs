//! DCInside crawl engine.
//!
//! Listing pages flow through the walker, queued posts through the
//! collector, everything through the repository port. The engine stops at
//! the boundary of what a scenario has already persisted, so repeated runs
//! only pick up new material.

mod collector;
pub mod comments;
pub mod dates;
mod engine;
pub mod listing;
pub mod post;
pub mod url;
mod walker;

pub use collector::CollectStats;
pub use engine::{DcInsideEngine, EngineConfig};
pub use url::{extract_gallery_info, GalleryInfo, GalleryType, PlatformPostId};

use std::time::Duration;

use rand::Rng;

/// Politeness delay between listing page fetches.
pub(crate) const LISTING_DELAY_MS: u64 = 1000;
/// Politeness delay around post detail fetches.
pub(crate) const DETAIL_DELAY_MS: u64 = 1000;
/// Politeness delay between comment pages.
pub(crate) const COMMENT_DELAY_MS: u64 = 2000;

/// Sleep `base + rand([0, base/2])` milliseconds.
pub(crate) async fn polite_sleep(base_ms: u64) {
    let jitter = rand::rng().random_range(0..=base_ms / 2);
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}
