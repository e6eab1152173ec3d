//! Repository port for harvested records.
//!
//! The engines depend only on this trait; persistent backends live outside
//! the core. Each call is assumed logically atomic, with no cross-call
//! transactional guarantee.

mod memory;

pub use memory::MemoryRepository;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::models::{Comment, CommentInput, Post, PostInput};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistence contract consumed by the crawl engines.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Look up a post by platform identity. The incremental boundary check.
    async fn find_post_by_platform_id(
        &self,
        scenario_id: &str,
        platform_post_id: &str,
    ) -> Result<Option<Post>>;

    /// Create a post row and return it with its surrogate ID.
    async fn insert_post(&self, input: PostInput) -> Result<Post>;

    /// Overwrite a post's comment counter. Used by the rehydrate phase.
    async fn update_post_comment_count(&self, post_id: i64, comment_cnt: u32) -> Result<()>;

    /// Posts of a scenario written at or after `since`, for rehydration.
    async fn list_recent_posts(
        &self,
        scenario_id: &str,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<Post>>;

    /// Append one page worth of comments in a single call.
    async fn insert_comments_bulk(&self, inputs: &[CommentInput]) -> Result<Vec<Comment>>;

    /// Check whether a comment identity is already persisted.
    async fn comment_exists(&self, scenario_id: &str, platform_comment_id: &str) -> Result<bool>;
}
