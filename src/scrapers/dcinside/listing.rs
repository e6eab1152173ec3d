//! Listing page parsing: post rows and the pagination block.

use chrono::{DateTime, FixedOffset};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::dates;
use crate::config::RowLayout;

/// Text marking a pinned notice row in the number cell.
const NOTICE_MARKER: &str = "공지";

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

/// A candidate post discovered on a listing page.
#[derive(Debug, Clone)]
pub struct ListingItem {
    /// Absolute view URL.
    pub url: Url,
    /// Listing-level date; day precision in keyword mode.
    pub written_at: Option<DateTime<FixedOffset>>,
}

/// Pagination block of a listing page.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    /// Per-page links inside the current block.
    pub page_urls: Vec<Url>,
    /// Link advancing to the next block of pages.
    pub next_block: Option<Url>,
}

fn row_selector(layout: RowLayout) -> Selector {
    match layout {
        RowLayout::Board => sel("table.gall_list > tbody > tr"),
        RowLayout::Gallog => sel("ul.cont_listbox > li"),
    }
}

fn num_selector(layout: RowLayout) -> Selector {
    match layout {
        RowLayout::Board => sel("td.gall_num"),
        RowLayout::Gallog => sel("span.num"),
    }
}

fn title_anchor_selector(layout: RowLayout) -> Selector {
    match layout {
        RowLayout::Board => sel("td.gall_tit a"),
        RowLayout::Gallog => sel("a.tit"),
    }
}

/// Decide post-row vs notice/ad: an explicit `data-no`, or a purely
/// numeric number cell that carries no notice marker.
fn is_post_row(row: ElementRef<'_>, layout: RowLayout) -> bool {
    if row.value().attr("data-no").is_some() {
        return true;
    }
    let Some(cell) = row.select(&num_selector(layout)).next() else {
        return false;
    };
    let num = cell.text().collect::<String>().trim().to_string();
    if num.contains(NOTICE_MARKER) {
        return false;
    }
    !num.is_empty() && num.chars().all(|c| c.is_ascii_digit())
}

/// Select the view link of a row: first an href containing `/board/view`,
/// then the title cell's anchor, then any anchor.
fn view_href<'a>(row: ElementRef<'a>, layout: RowLayout) -> Option<&'a str> {
    let anchors = sel("a");
    if let Some(href) = row
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find(|h| h.contains("/board/view"))
    {
        return Some(href);
    }
    if let Some(href) = row
        .select(&title_anchor_selector(layout))
        .find_map(|a| a.value().attr("href"))
    {
        return Some(href);
    }
    row.select(&anchors).find_map(|a| a.value().attr("href"))
}

fn row_date(row: ElementRef<'_>, layout: RowLayout) -> Option<DateTime<FixedOffset>> {
    match layout {
        RowLayout::Board => {
            // The title attribute holds `YYYY-MM-DD HH:mm:ss`; only the day
            // is trustworthy at listing level, so time is fixed to midnight.
            let cell = row.select(&sel("td.gall_date")).next()?;
            let title = cell.value().attr("title")?;
            dates::parse_kst(title.split_whitespace().next()?)
        }
        RowLayout::Gallog => {
            let cell = row.select(&sel("span.date")).next()?;
            let text = cell.text().collect::<String>();
            dates::parse_kst(&text)
        }
    }
}

fn resolve(page_url: &Url, href: &str) -> Option<Url> {
    let joined = page_url.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then_some(joined)
}

/// Extract candidate posts from a listing page.
///
/// Rows that fail classification or URL resolution are skipped, never fatal.
pub fn parse_listing(html: &str, layout: RowLayout, page_url: &Url) -> Vec<ListingItem> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for row in document.select(&row_selector(layout)) {
        if !is_post_row(row, layout) {
            continue;
        }
        let Some(href) = view_href(row, layout) else {
            continue;
        };
        let Some(url) = resolve(page_url, href) else {
            continue;
        };
        items.push(ListingItem {
            url,
            written_at: row_date(row, layout),
        });
    }

    items
}

/// Parse the pagination block of a listing page.
///
/// Per-page anchors carry no CSS class; any classed anchor is block
/// navigation, of which `page_next` / `search_next` advance to the next
/// block.
pub fn parse_pagination(html: &str, layout: RowLayout, page_url: &Url) -> Pagination {
    let document = Html::parse_document(html);
    let block_selector = match layout {
        RowLayout::Board => sel("div.bottom_paging_box.iconpaging"),
        RowLayout::Gallog => sel("div.cont_box div.bottom_paging_box.iconpaging"),
    };

    let mut pagination = Pagination::default();
    let Some(block) = document.select(&block_selector).next() else {
        return pagination;
    };

    for anchor in block.select(&sel("a")) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let classes = anchor.value().attr("class").unwrap_or("").trim();
        if classes.is_empty() {
            if let Some(url) = resolve(page_url, href) {
                pagination.page_urls.push(url);
            }
            continue;
        }
        let advances = classes
            .split_whitespace()
            .any(|c| c == "page_next" || c == "search_next");
        if advances && pagination.next_block.is_none() {
            pagination.next_block = resolve(page_url, href);
        }
    }

    pagination
}
