//! Post detail fetching and the comment-thread paginator.

use tracing::{debug, info, warn};

use super::comments::{comment_request_form, parse_comment_response};
use super::post::{parse_post_detail, ParsedPost};
use super::url::PlatformPostId;
use super::{polite_sleep, COMMENT_DELAY_MS, DETAIL_DELAY_MS};
use crate::error::{CrawlError, Result};
use crate::models::{CommentInput, Post, PostInput};
use crate::repository::Repository;
use crate::scrapers::dcinside::dates;
use crate::scrapers::http_client::HttpError;
use crate::scrapers::{CancelToken, Fetcher};
use crate::utils::html::strip_html;

/// Counters reported at the end of the detail phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectStats {
    pub posts_inserted: u64,
    pub posts_skipped: u64,
    pub comments_inserted: u64,
}

pub(crate) struct Collector<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub repo: &'a dyn Repository,
    pub scenario_id: &'a str,
    /// Host root carrying the comments endpoint.
    pub dc_host: &'a str,
    pub cancel: &'a CancelToken,
}

/// Failures that end the whole run rather than skip the current post.
pub(crate) fn is_fatal(err: &CrawlError) -> bool {
    matches!(
        err,
        CrawlError::Http(HttpError::RateLimited(_)) | CrawlError::Repository(_)
    )
}

impl Collector<'_> {
    /// Fetch, parse and persist every queued post in chronological order.
    pub async fn collect(&self, mut ids: Vec<PlatformPostId>) -> Result<CollectStats> {
        ids.sort();
        let total = ids.len();
        let mut stats = CollectStats::default();

        for (index, id) in ids.iter().enumerate() {
            if self.cancel.is_cancelled() {
                break;
            }
            polite_sleep(DETAIL_DELAY_MS).await;

            match self.collect_post(id).await {
                Ok(Some(comments)) => {
                    stats.posts_inserted += 1;
                    stats.comments_inserted += comments;
                }
                Ok(None) => stats.posts_skipped += 1,
                Err(err) if is_fatal(&err) => return Err(err),
                Err(err) => {
                    warn!("skipping {id}: {err}");
                    stats.posts_skipped += 1;
                }
            }

            info!(
                "[{}/{}] ({}%) processed {id}",
                index + 1,
                total,
                (index + 1) * 100 / total.max(1)
            );
        }

        Ok(stats)
    }

    /// Process one post. `Ok(None)` means the post is gone upstream.
    async fn collect_post(&self, id: &PlatformPostId) -> Result<Option<u64>> {
        let url = id.to_url();
        let html = match self.fetcher.get_html(&url).await {
            Ok(html) => html,
            Err(HttpError::NotFound(_)) => {
                debug!("{id} deleted upstream");
                return Ok(None);
            }
            Err(HttpError::RedirectedOffHost { final_host, .. }) => {
                debug!("{id} redirected off board to {final_host}");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let parsed = parse_post_detail(&html)?;
        let post = self
            .repo
            .insert_post(PostInput {
                scenario_id: self.scenario_id.to_string(),
                platform_post_id: id.to_string(),
                url: url.clone(),
                title: parsed.title.clone(),
                contents: parsed.contents.clone(),
                writer: parsed.writer.clone(),
                writer_id: parsed.writer_id.clone(),
                writer_ip: parsed.writer_ip.clone(),
                written_at: parsed.written_at,
                like_cnt: parsed.like_cnt,
                dislike_cnt: parsed.dislike_cnt,
                comment_cnt: parsed.comment_cnt,
            })
            .await?;

        let mut comments = 0;
        if parsed.comment_cnt > 0 {
            comments = self.collect_comments(&post, id, &parsed.esno).await?;
        }
        Ok(Some(comments))
    }

    /// Refresh a previously persisted post: update its comment counter when
    /// it moved and re-run the comment loop. Used by the rehydrate phase.
    pub async fn refresh_post(&self, post: &Post) -> Result<u64> {
        let id: PlatformPostId = post.platform_post_id.parse()?;
        let html = match self.fetcher.get_html(&post.url).await {
            Ok(html) => html,
            Err(HttpError::NotFound(_)) | Err(HttpError::RedirectedOffHost { .. }) => {
                debug!("{} gone upstream, skipping refresh", post.platform_post_id);
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };
        let parsed: ParsedPost = parse_post_detail(&html)?;

        if parsed.comment_cnt != post.comment_cnt {
            self.repo
                .update_post_comment_count(post.id, parsed.comment_cnt)
                .await?;
        }
        if parsed.comment_cnt == 0 {
            return Ok(0);
        }
        self.collect_comments(post, &id, &parsed.esno).await
    }

    /// Page through the comment thread, one bulk insert per page.
    async fn collect_comments(
        &self,
        post: &Post,
        id: &PlatformPostId,
        esno: &str,
    ) -> Result<u64> {
        let endpoint = format!("{}/board/comment/", self.dc_host);
        let mut page = 1u32;
        let mut inserted = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            polite_sleep(COMMENT_DELAY_MS).await;

            let form = comment_request_form(id, esno, page);
            let response = match self.fetcher.post_form(&endpoint, &form).await {
                Ok(value) => value,
                Err(HttpError::RateLimited(url)) => {
                    return Err(HttpError::RateLimited(url).into());
                }
                Err(err) => {
                    warn!("comment page {page} of {id} failed: {err}");
                    break;
                }
            };

            let raw = parse_comment_response(&response);
            if raw.is_empty() {
                break;
            }

            let mut inputs = Vec::new();
            for item in raw {
                let Some(no) = item.no else {
                    continue;
                };
                if item.deleted {
                    continue;
                }
                let comment_id = id.comment_id(&no);
                if self
                    .repo
                    .comment_exists(self.scenario_id, &comment_id)
                    .await?
                {
                    continue;
                }
                let contents = strip_html(&item.memo);
                if contents.is_empty() {
                    continue;
                }
                let Some(written_at) = item.reg_date.as_deref().and_then(dates::parse_comment_date)
                else {
                    debug!("comment {comment_id} has unparseable date, skipping");
                    continue;
                };

                inputs.push(CommentInput {
                    platform_comment_id: comment_id,
                    post_id: post.id,
                    scenario_id: self.scenario_id.to_string(),
                    writer: item.name,
                    writer_id: item.user_id,
                    writer_ip: item.ip,
                    contents,
                    url: id.to_url(),
                    gallery: id.gallery_key(),
                    written_at,
                });
            }

            if !inputs.is_empty() {
                inserted += self.repo.insert_comments_bulk(&inputs).await?.len() as u64;
            }
            page += 1;
        }

        Ok(inserted)
    }
}
