//! Crate-level error taxonomy.

use thiserror::Error;

use crate::repository::RepositoryError;
use crate::scrapers::http_client::HttpError;

/// Errors surfaced by the crawl engines.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// URL cannot be decoded into a platform ID. Never retried; the walker
    /// skips the offending row.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    /// Item-level parse failure; the offending post or page is skipped.
    #[error("parse error: {0}")]
    Parse(String),

    /// Missing required input for the selected mode. Fatal at construction.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Crawler code resolves to an engine this build does not implement.
    #[error("unsupported crawler code: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
