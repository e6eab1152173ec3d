//! In-memory repository backend.
//!
//! Reference implementation of the [`Repository`] port, used by the CLI
//! binary and the test suite. Rows live for the lifetime of the process.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tokio::sync::Mutex;

use super::{Repository, RepositoryError, Result};
use crate::models::{Comment, CommentInput, Post, PostInput};

#[derive(Default)]
struct Store {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    next_post_id: i64,
    next_comment_id: i64,
}

/// Repository keeping all rows in process memory.
#[derive(Default)]
pub struct MemoryRepository {
    store: Mutex<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all persisted posts, oldest insertion first.
    pub async fn posts(&self) -> Vec<Post> {
        self.store.lock().await.posts.clone()
    }

    /// Snapshot of all persisted comments, oldest insertion first.
    pub async fn comments(&self) -> Vec<Comment> {
        self.store.lock().await.comments.clone()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_post_by_platform_id(
        &self,
        scenario_id: &str,
        platform_post_id: &str,
    ) -> Result<Option<Post>> {
        let store = self.store.lock().await;
        Ok(store
            .posts
            .iter()
            .find(|p| p.scenario_id == scenario_id && p.platform_post_id == platform_post_id)
            .cloned())
    }

    async fn insert_post(&self, input: PostInput) -> Result<Post> {
        let mut store = self.store.lock().await;
        if store
            .posts
            .iter()
            .any(|p| p.scenario_id == input.scenario_id && p.platform_post_id == input.platform_post_id)
        {
            return Err(RepositoryError::Backend(format!(
                "duplicate post {}",
                input.platform_post_id
            )));
        }
        store.next_post_id += 1;
        let post = Post {
            id: store.next_post_id,
            scenario_id: input.scenario_id,
            platform_post_id: input.platform_post_id,
            url: input.url,
            title: input.title,
            contents: input.contents,
            writer: input.writer,
            writer_id: input.writer_id,
            writer_ip: input.writer_ip,
            written_at: input.written_at,
            like_cnt: input.like_cnt,
            dislike_cnt: input.dislike_cnt,
            comment_cnt: input.comment_cnt,
        };
        store.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post_comment_count(&self, post_id: i64, comment_cnt: u32) -> Result<()> {
        let mut store = self.store.lock().await;
        let post = store
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("post {post_id}")))?;
        post.comment_cnt = comment_cnt;
        Ok(())
    }

    async fn list_recent_posts(
        &self,
        scenario_id: &str,
        since: DateTime<FixedOffset>,
    ) -> Result<Vec<Post>> {
        let store = self.store.lock().await;
        Ok(store
            .posts
            .iter()
            .filter(|p| p.scenario_id == scenario_id && p.written_at >= since)
            .cloned()
            .collect())
    }

    async fn insert_comments_bulk(&self, inputs: &[CommentInput]) -> Result<Vec<Comment>> {
        let mut store = self.store.lock().await;
        let mut inserted = Vec::with_capacity(inputs.len());
        for input in inputs {
            if store.comments.iter().any(|c| {
                c.scenario_id == input.scenario_id
                    && c.platform_comment_id == input.platform_comment_id
            }) {
                return Err(RepositoryError::Backend(format!(
                    "duplicate comment {}",
                    input.platform_comment_id
                )));
            }
            store.next_comment_id += 1;
            let comment = Comment {
                id: store.next_comment_id,
                platform_comment_id: input.platform_comment_id.clone(),
                post_id: input.post_id,
                scenario_id: input.scenario_id.clone(),
                writer: input.writer.clone(),
                writer_id: input.writer_id.clone(),
                writer_ip: input.writer_ip.clone(),
                contents: input.contents.clone(),
                url: input.url.clone(),
                gallery: input.gallery.clone(),
                written_at: input.written_at,
            };
            store.comments.push(comment.clone());
            inserted.push(comment);
        }
        Ok(inserted)
    }

    async fn comment_exists(&self, scenario_id: &str, platform_comment_id: &str) -> Result<bool> {
        let store = self.store.lock().await;
        Ok(store
            .comments
            .iter()
            .any(|c| c.scenario_id == scenario_id && c.platform_comment_id == platform_comment_id))
    }
}
