//! Comment models.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A harvested comment as returned by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Surrogate row ID assigned by the backend.
    pub id: i64,
    /// `<platform post id>&<comment no>`.
    pub platform_comment_id: String,
    /// Surrogate ID of the owning post row.
    pub post_id: i64,
    pub scenario_id: String,
    pub writer: Option<String>,
    pub writer_id: Option<String>,
    pub writer_ip: Option<String>,
    /// Plain text, HTML stripped. Never empty.
    pub contents: String,
    /// URL of the post the comment belongs to.
    pub url: String,
    /// Gallery key `<gallType>&<galleryId>`.
    pub gallery: String,
    /// Publication instant, KST.
    pub written_at: DateTime<FixedOffset>,
}

/// Input for appending a comment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentInput {
    pub platform_comment_id: String,
    pub post_id: i64,
    pub scenario_id: String,
    pub writer: Option<String>,
    pub writer_id: Option<String>,
    pub writer_ip: Option<String>,
    pub contents: String,
    pub url: String,
    pub gallery: String,
    pub written_at: DateTime<FixedOffset>,
}
