//! Post view page parsing.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use scraper::{Html, Selector};

use super::dates;
use crate::error::{CrawlError, Result};

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

/// Everything the collector needs from one view page.
#[derive(Debug, Clone)]
pub struct ParsedPost {
    pub post_no: String,
    /// Opaque token required by the comments API.
    pub esno: String,
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

fn nonempty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Parse a counter like `1,234` with thousands separators.
fn parse_count(text: &str) -> Option<u32> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Trailing integer of a label like `댓글 1,234`.
fn trailing_count(text: &str) -> Option<u32> {
    let re = Regex::new(r"([\d,]+)\s*$").expect("valid regex");
    parse_count(re.captures(text.trim())?.get(1)?.as_str())
}

/// Parse a post view page.
///
/// Deleted-post and otherwise unrecognizable pages fail with a parse error;
/// the collector skips them.
pub fn parse_post_detail(html: &str) -> Result<ParsedPost> {
    let document = Html::parse_document(html);

    let form = document
        .select(&sel("form#_view_form_"))
        .next()
        .ok_or_else(|| CrawlError::Parse("view form missing (deleted post?)".into()))?;
    let post_no = form
        .select(&sel("input#no"))
        .next()
        .and_then(|i| nonempty(i.value().attr("value")))
        .ok_or_else(|| CrawlError::Parse("post number missing from view form".into()))?;
    let esno = form
        .select(&sel("input#e_s_n_o"))
        .next()
        .and_then(|i| nonempty(i.value().attr("value")))
        .ok_or_else(|| CrawlError::Parse("e_s_n_o token missing from view form".into()))?;

    let wrap = document
        .select(&sel("div.view_content_wrap"))
        .next()
        .ok_or_else(|| CrawlError::Parse("view content wrap missing".into()))?;

    let title = wrap
        .select(&sel("span.title_subject"))
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .ok_or_else(|| CrawlError::Parse("title missing".into()))?;

    let contents = wrap
        .select(&sel("div.write_div"))
        .next()
        .map(|e| {
            e.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    let (writer, writer_id, writer_ip) = wrap
        .select(&sel("div.gall_writer"))
        .next()
        .map(|w| {
            (
                nonempty(w.value().attr("data-nick")),
                nonempty(w.value().attr("data-uid")),
                nonempty(w.value().attr("data-ip")),
            )
        })
        .unwrap_or((None, None, None));

    let written_at = wrap
        .select(&sel("span.gall_date"))
        .next()
        .and_then(|e| {
            let title_attr = e.value().attr("title").map(str::to_string);
            let text = e.text().collect::<String>();
            dates::parse_kst(title_attr.as_deref().unwrap_or(&text))
                .or_else(|| dates::parse_kst(&text))
        })
        .ok_or_else(|| CrawlError::Parse("written-at missing or unparseable".into()))?;

    let like_cnt = document
        .select(&Selector::parse(&format!("p#recommend_view_up_{post_no}")).expect("id selector"))
        .next()
        .and_then(|e| parse_count(&e.text().collect::<String>()))
        .unwrap_or(0);
    let dislike_cnt = document
        .select(&Selector::parse(&format!("p#recommend_view_down_{post_no}")).expect("id selector"))
        .next()
        .and_then(|e| parse_count(&e.text().collect::<String>()));

    let comment_cnt = document
        .select(&sel("span.gall_comment"))
        .next()
        .and_then(|e| trailing_count(&e.text().collect::<String>()))
        .unwrap_or(0);

    Ok(ParsedPost {
        post_no,
        esno,
        title,
        contents,
        writer,
        writer_id,
        writer_ip,
        written_at,
        like_cnt,
        dislike_cnt,
        comment_cnt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_page(no: &str, dislike: Option<&str>) -> String {
        let dislike_block = dislike
            .map(|d| format!(r#"<p id="recommend_view_down_{no}">{d}</p>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body>
              <form id="_view_form_">
                <input id="no" value="{no}">
                <input id="e_s_n_o" value="3duo9aab2dd76f">
              </form>
              <div class="view_content_wrap">
                <span class="title_subject">러스트 질문</span>
                <div class="gall_writer" data-nick="ㅇㅇ" data-ip="1.2"></div>
                <span class="gall_date" title="2025-03-04 05:06:07">03.04</span>
                <div class="write_div"><p>first line</p><p>second &amp; last</p></div>
                <span class="gall_comment">댓글 1,234</span>
              </div>
              <p id="recommend_view_up_{no}">12</p>
              {dislike_block}
            </body></html>"#
        )
    }

    #[test]
    fn test_parse_full_view_page() {
        let parsed = parse_post_detail(&view_page("42", Some("3"))).unwrap();
        assert_eq!(parsed.post_no, "42");
        assert_eq!(parsed.esno, "3duo9aab2dd76f");
        assert_eq!(parsed.title, "러스트 질문");
        assert_eq!(parsed.contents, "first line\nsecond & last");
        assert_eq!(parsed.writer.as_deref(), Some("ㅇㅇ"));
        assert_eq!(parsed.writer_id, None);
        assert_eq!(parsed.writer_ip.as_deref(), Some("1.2"));
        assert_eq!(parsed.written_at.to_rfc3339(), "2025-03-04T05:06:07+09:00");
        assert_eq!(parsed.like_cnt, 12);
        assert_eq!(parsed.dislike_cnt, Some(3));
        assert_eq!(parsed.comment_cnt, 1234);
    }

    #[test]
    fn test_dislike_absent_is_none() {
        let parsed = parse_post_detail(&view_page("42", None)).unwrap();
        assert_eq!(parsed.dislike_cnt, None);
    }

    #[test]
    fn test_deleted_page_is_parse_error() {
        let html = "<html><body><div class='box_infotxt'>삭제된 게시물입니다.</div></body></html>";
        assert!(matches!(
            parse_post_detail(html),
            Err(CrawlError::Parse(_))
        ));
    }

    #[test]
    fn test_trailing_count() {
        assert_eq!(trailing_count("댓글 7"), Some(7));
        assert_eq!(trailing_count("댓글 1,234"), Some(1234));
        assert_eq!(trailing_count("댓글"), None);
    }
}
