//! Shared fixtures for engine tests: a canned-page fetcher and HTML/JSON
//! builders shaped like the upstream.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use harvester::scrapers::http_client::HttpError;
use harvester::scrapers::Fetcher;

/// Fetcher serving pre-registered pages and comment responses.
///
/// GET requests resolve against `pages` (miss = 404). POST requests are
/// resolved by the `no` and `comment_page` form fields; a miss yields an
/// empty comment list, the upstream end-of-thread signal.
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    comment_pages: Mutex<HashMap<String, Value>>,
    pub gets: Mutex<Vec<String>>,
    pub posts: Mutex<Vec<Vec<(String, String)>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: &str, html: String) {
        self.pages.lock().unwrap().insert(url.to_string(), html);
    }

    pub fn add_comment_page(&self, post_no: u64, page: u32, response: Value) {
        self.comment_pages
            .lock()
            .unwrap()
            .insert(format!("{post_no}#{page}"), response);
    }

    pub fn get_urls(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get_html(&self, url: &str) -> Result<String, HttpError> {
        self.gets.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| HttpError::NotFound(url.to_string()))
    }

    async fn post_form(
        &self,
        _url: &str,
        form: &[(String, String)],
    ) -> Result<Value, HttpError> {
        self.posts.lock().unwrap().push(form.to_vec());
        let field = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let key = format!("{}#{}", field("no"), field("comment_page"));
        Ok(self
            .comment_pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| json!({ "comments": [] })))
    }
}

/// One listing row in board layout.
pub fn board_row(num: &str, href: &str, date_title: &str) -> String {
    format!(
        r#"<tr>
             <td class="gall_num">{num}</td>
             <td class="gall_tit"><a href="{href}">subject {num}</a></td>
             <td class="gall_date" title="{date_title}">date</td>
           </tr>"#
    )
}

/// A board listing page; `pagination` is injected verbatim when present.
pub fn board_listing(rows: &[String], pagination: Option<&str>) -> String {
    format!(
        r#"<html><body>
             <table class="gall_list"><tbody>{}</tbody></table>
             {}
           </body></html>"#,
        rows.join(""),
        pagination.unwrap_or("")
    )
}

/// A post view page with the fields the detail parser reads.
pub fn view_page(no: u64, title: &str, comment_cnt: u32) -> String {
    format!(
        r#"<html><body>
             <form id="_view_form_">
               <input id="no" value="{no}">
               <input id="e_s_n_o" value="esno-{no}">
             </form>
             <div class="view_content_wrap">
               <span class="title_subject">{title}</span>
               <div class="gall_writer" data-nick="writer{no}" data-uid="uid{no}"></div>
               <span class="gall_date" title="2025-03-04 05:06:07">03.04</span>
               <div class="write_div">body of {no}</div>
               <span class="gall_comment">댓글 {comment_cnt}</span>
             </div>
             <p id="recommend_view_up_{no}">5</p>
           </body></html>"#
    )
}

/// One comment item of an API response.
pub fn comment_item(no: u64, memo: &str, reg_date: &str) -> Value {
    json!({
        "no": no.to_string(),
        "del_yn": "N",
        "memo": memo,
        "name": "ㅇㅇ",
        "ip": "10.2",
        "reg_date": reg_date,
    })
}
