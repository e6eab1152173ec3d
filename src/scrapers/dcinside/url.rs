//! Gallery URL decoding and the platform post ID codec.
//!
//! A platform post ID is the stable identity `DC&<gallType>&<galleryId>&<postNo>`
//! derived purely from URL components. The codec is bijective under the
//! canonical host `gall.dcinside.com`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::config::DEFAULT_DC_HOST;
use crate::error::{CrawlError, Result};

/// Gallery variant, derived from the URL path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GalleryType {
    /// `/mgallery/` boards.
    Minor,
    /// `/mini/` boards.
    Mini,
    /// `/board/` (general) boards.
    General,
}

impl GalleryType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Minor => "M",
            Self::Mini => "MI",
            Self::General => "G",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Minor),
            "MI" => Some(Self::Mini),
            "G" => Some(Self::General),
            _ => None,
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        if path.starts_with("/mgallery/") {
            Some(Self::Minor)
        } else if path.starts_with("/mini/") {
            Some(Self::Mini)
        } else if path.starts_with("/board/") {
            Some(Self::General)
        } else {
            None
        }
    }

    fn view_path(&self) -> &'static str {
        match self {
            Self::Minor => "/mgallery/board/view",
            Self::Mini => "/mini/board/view",
            Self::General => "/board/view",
        }
    }
}

/// Structured gallery information extracted from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryInfo {
    pub gall_type: GalleryType,
    pub gallery_id: String,
    /// Present on view URLs, absent on listing URLs.
    pub post_no: Option<u64>,
}

/// Decode the gallery variant, gallery ID and post number from a URL.
pub fn extract_gallery_info(url: &str) -> Result<GalleryInfo> {
    let parsed = Url::parse(url).map_err(|_| CrawlError::InvalidUrl(url.to_string()))?;
    let gall_type = GalleryType::from_path(parsed.path())
        .ok_or_else(|| CrawlError::InvalidUrl(url.to_string()))?;

    let mut gallery_id = None;
    let mut post_no = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "id" => gallery_id = Some(value.to_string()),
            "no" => post_no = value.parse().ok(),
            _ => {}
        }
    }

    let gallery_id = gallery_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CrawlError::InvalidUrl(url.to_string()))?;

    Ok(GalleryInfo {
        gall_type,
        gallery_id,
        post_no,
    })
}

/// Stable platform identity of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformPostId {
    pub gall_type: GalleryType,
    pub gallery_id: String,
    pub post_no: u64,
}

impl PlatformPostId {
    /// Decode a post view URL into its platform identity.
    pub fn from_url(url: &str) -> Result<Self> {
        let info = extract_gallery_info(url)?;
        let post_no = info
            .post_no
            .ok_or_else(|| CrawlError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            gall_type: info.gall_type,
            gallery_id: info.gallery_id,
            post_no,
        })
    }

    /// Reconstruct the canonical post view URL.
    pub fn to_url(&self) -> String {
        format!(
            "{}{}?id={}&no={}",
            DEFAULT_DC_HOST,
            self.gall_type.view_path(),
            self.gallery_id,
            self.post_no
        )
    }

    /// Platform identity of a comment under this post.
    pub fn comment_id(&self, comment_no: &str) -> String {
        format!("{self}&{comment_no}")
    }

    /// Gallery key `<gallType>&<galleryId>` stored on comment rows.
    pub fn gallery_key(&self) -> String {
        format!("{}&{}", self.gall_type.code(), self.gallery_id)
    }
}

impl fmt::Display for PlatformPostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DC&{}&{}&{}",
            self.gall_type.code(),
            self.gallery_id,
            self.post_no
        )
    }
}

impl FromStr for PlatformPostId {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('&').collect();
        let [prefix, code, gallery_id, post_no] = parts.as_slice() else {
            return Err(CrawlError::InvalidUrl(s.to_string()));
        };
        if *prefix != "DC" || gallery_id.is_empty() {
            return Err(CrawlError::InvalidUrl(s.to_string()));
        }
        let gall_type =
            GalleryType::from_code(code).ok_or_else(|| CrawlError::InvalidUrl(s.to_string()))?;
        let post_no = post_no
            .parse()
            .map_err(|_| CrawlError::InvalidUrl(s.to_string()))?;
        Ok(Self {
            gall_type,
            gallery_id: gallery_id.to_string(),
            post_no,
        })
    }
}

// Chronological approximation used by the collector: lexicographic on the
// type code and gallery ID, numeric on the post number.
impl Ord for PlatformPostId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gall_type
            .code()
            .cmp(other.gall_type.code())
            .then_with(|| self.gallery_id.cmp(&other.gallery_id))
            .then_with(|| self.post_no.cmp(&other.post_no))
    }
}

impl PartialOrd for PlatformPostId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_id_round_trip() {
        let url = "https://gall.dcinside.com/mgallery/board/view?id=programming&no=42";
        let id = PlatformPostId::from_url(url).unwrap();
        assert_eq!(id.to_string(), "DC&M&programming&42");

        let rebuilt = id.to_url();
        assert!(rebuilt.contains("/mgallery/board/view?id=programming&no=42"));
        assert_eq!(PlatformPostId::from_url(&rebuilt).unwrap(), id);
    }

    #[test]
    fn test_round_trip_all_variants() {
        for (prefix, code) in [("/mgallery", "M"), ("/mini", "MI"), ("", "G")] {
            let url = format!("https://gall.dcinside.com{prefix}/board/view?id=pro&no=7");
            let id = PlatformPostId::from_url(&url).unwrap();
            assert_eq!(id.to_string(), format!("DC&{code}&pro&7"));
            assert_eq!(PlatformPostId::from_url(&id.to_url()).unwrap(), id);
        }
    }

    #[test]
    fn test_extract_gallery_info_listing_url() {
        let info =
            extract_gallery_info("https://gall.dcinside.com/board/lists/?id=hit&page=2").unwrap();
        assert_eq!(info.gall_type, GalleryType::General);
        assert_eq!(info.gallery_id, "hit");
        assert_eq!(info.post_no, None);
    }

    #[test]
    fn test_invalid_urls_rejected() {
        // Unknown path prefix.
        assert!(extract_gallery_info("https://gall.dcinside.com/other/view?id=x&no=1").is_err());
        // Missing mandatory id.
        assert!(extract_gallery_info("https://gall.dcinside.com/board/view?no=1").is_err());
        // Not a URL at all.
        assert!(extract_gallery_info("not a url").is_err());
    }

    #[test]
    fn test_parse_platform_id_string() {
        let id: PlatformPostId = "DC&MI&cats&900".parse().unwrap();
        assert_eq!(id.gall_type, GalleryType::Mini);
        assert_eq!(id.gallery_id, "cats");
        assert_eq!(id.post_no, 900);

        assert!("DC&X&cats&900".parse::<PlatformPostId>().is_err());
        assert!("DC&M&cats".parse::<PlatformPostId>().is_err());
        assert!("DC&M&cats&abc".parse::<PlatformPostId>().is_err());
    }

    #[test]
    fn test_ordering_is_numeric_on_post_no() {
        let mut ids: Vec<PlatformPostId> = ["DC&M&b&2", "DC&M&a&100", "DC&G&z&5", "DC&M&a&20"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let sorted: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
        assert_eq!(sorted, ["DC&G&z&5", "DC&M&a&20", "DC&M&a&100", "DC&M&b&2"]);
    }

    #[test]
    fn test_comment_id_and_gallery_key() {
        let id: PlatformPostId = "DC&G&pro&100".parse().unwrap();
        assert_eq!(id.comment_id("7"), "DC&G&pro&100&7");
        assert_eq!(id.gallery_key(), "G&pro");
    }
}
