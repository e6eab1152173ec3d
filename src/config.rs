//! Run configuration: environment settings and crawl mode resolution.

use std::env;

use url::Url;

use crate::error::{CrawlError, Result};

/// Canonical DCInside host used when `DC_HOST` is not set.
pub const DEFAULT_DC_HOST: &str = "https://gall.dcinside.com";

/// Hours subtracted from the expiration window on top of the configured
/// period, covering the gap between scheduling and the actual run.
pub const EXPIRATION_SLEEP_HOURS: i64 = 1;

/// Environment-provided settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// DCInside host root, no trailing slash.
    pub dc_host: String,
    /// Crawler code that selects DCInside keyword mode.
    pub keyword_code: Option<String>,
    /// Crawler code that selects DCInside gallog mode.
    pub gallog_code: Option<String>,
    /// Crawler code routed to the YouTube engine.
    pub youtube_code: Option<String>,
    /// Crawler code routed to the Ruliweb engine.
    pub ruliweb_code: Option<String>,
    /// Rehydrate window in days; 0 disables the window.
    pub expiration_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dc_host: DEFAULT_DC_HOST.to_string(),
            keyword_code: None,
            gallog_code: None,
            youtube_code: None,
            ruliweb_code: None,
            expiration_days: 0,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            dc_host: env_nonempty("DC_HOST")
                .map(|h| h.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_DC_HOST.to_string()),
            keyword_code: env_nonempty("DC_KEYWORD_CRAWLER"),
            gallog_code: env_nonempty("DC_GALLOG_CRAWLER"),
            youtube_code: env_nonempty("YOUTUBE_CRAWLER"),
            ruliweb_code: env_nonempty("RULIWEB_CRAWLER"),
            expiration_days: env_nonempty("EXPIRATION_PERIOD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

/// Caller-supplied inputs for one run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Scenario scoping all rows written during the run.
    pub scenario_id: String,
    /// Opaque crawler code matched against the settings.
    pub crawler_code: String,
    pub url: Option<String>,
    pub keyword: Option<String>,
    /// Target gallery ID.
    pub target: Option<String>,
}

/// Listing layout the parsers must expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// `table.gall_list` rows (gallery listings and keyword search).
    Board,
    /// `ul.cont_listbox` items (gallog posting pages).
    Gallog,
}

/// DCInside crawl mode, resolved once from options and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlMode {
    /// Search within a target gallery by keyword.
    Keyword { gallery_id: String, keyword: String },
    /// Traverse a user's gallog posting page.
    Gallog { user_url: String },
    /// Treat the input URL as a raw listing.
    Raw { url: String },
}

impl CrawlMode {
    /// Resolve the mode for a DCInside run.
    ///
    /// Unknown crawler codes fall back to raw-listing mode; without a `url`
    /// or `target` to build the listing from, resolution fails.
    pub fn resolve(options: &CrawlOptions, settings: &Settings) -> Result<Self> {
        if settings
            .keyword_code
            .as_deref()
            .is_some_and(|code| code == options.crawler_code)
        {
            let gallery_id = options
                .target
                .clone()
                .ok_or_else(|| CrawlError::Config("keyword mode requires target".into()))?;
            let keyword = options
                .keyword
                .clone()
                .ok_or_else(|| CrawlError::Config("keyword mode requires keyword".into()))?;
            return Ok(Self::Keyword {
                gallery_id,
                keyword,
            });
        }

        if settings
            .gallog_code
            .as_deref()
            .is_some_and(|code| code == options.crawler_code)
        {
            let user_url = options
                .url
                .clone()
                .ok_or_else(|| CrawlError::Config("gallog mode requires url".into()))?;
            return Ok(Self::Gallog { user_url });
        }

        if let Some(url) = options.url.clone() {
            return Ok(Self::Raw { url });
        }
        if let Some(target) = &options.target {
            return Ok(Self::Raw {
                url: format!("{}/board/lists/?id={}", settings.dc_host, target),
            });
        }
        Err(CrawlError::Config(
            "cannot resolve crawl mode: need url or target".into(),
        ))
    }

    /// First listing URL of the run.
    pub fn start_url(&self, settings: &Settings) -> String {
        match self {
            Self::Keyword {
                gallery_id,
                keyword,
            } => format!(
                "{}/board/lists/?id={}&s_type=search_subject_memo&s_keyword={}",
                settings.dc_host,
                gallery_id,
                urlencoding::encode(keyword)
            ),
            Self::Gallog { user_url } => {
                format!("{}/posting", user_url.trim_end_matches('/'))
            }
            Self::Raw { url } => url.clone(),
        }
    }

    /// Host root the run operates under, derived from the start URL.
    pub fn base_url(&self, settings: &Settings) -> String {
        let start = self.start_url(settings);
        match Url::parse(&start) {
            Ok(u) => match u.host_str() {
                Some(host) => format!("{}://{}", u.scheme(), host),
                None => settings.dc_host.clone(),
            },
            Err(_) => settings.dc_host.clone(),
        }
    }

    /// Row layout the listing parser must use for this mode.
    pub fn row_layout(&self) -> RowLayout {
        match self {
            Self::Gallog { .. } => RowLayout::Gallog,
            _ => RowLayout::Board,
        }
    }
}
