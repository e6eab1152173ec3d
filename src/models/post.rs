//! Post models.
//!
//! A post row is created exactly once per (scenario, platform post id) pair;
//! repeated runs stop at the incremental frontier instead of re-inserting.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A harvested post as returned by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Surrogate row ID assigned by the backend.
    pub id: i64,
    /// Scenario scoping this row.
    pub scenario_id: String,
    /// Stable platform identity, e.g. `DC&M&programming&42`.
    pub platform_post_id: String,
    /// Canonical post URL.
    pub url: String,
    pub title: String,
    /// Plain-text body.
    pub contents: String,
    /// Display name of the writer.
    pub writer: Option<String>,
    /// Account ID, present for logged-in writers.
    pub writer_id: Option<String>,
    /// IP fragment, present for anonymous writers.
    pub writer_ip: Option<String>,
    /// Publication instant, KST.
    pub written_at: DateTime<FixedOffset>,
    pub like_cnt: u32,
    /// Absent on boards that do not expose a dislike counter.
    pub dislike_cnt: Option<u32>,
    pub comment_cnt: u32,
}

/// Input for creating a post row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInput {
    pub scenario_id: String,
    pub platform_post_id: String,
    pub url: String,
    pub title: String,
    pub contents: String,
    pub writer: Option<String>,
    pub writer_id: Option<String>,
    pub writer_ip: Option<String>,
    pub written_at: DateTime<FixedOffset>,
    pub like_cnt: u32,
    pub dislike_cnt: Option<u32>,
    pub comment_cnt: u32,
}
