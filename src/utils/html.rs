//! HTML stripping utilities.

use scraper::Html;

/// Reduce an HTML snippet to its visible plain text.
///
/// Comment bodies arrive as markup; only the text content is persisted.
/// Entities are decoded by the parser, consecutive whitespace collapses to
/// a single space.
pub fn strip_html(snippet: &str) -> String {
    let fragment = Html::parse_fragment(snippet);
    let text: Vec<&str> = fragment.root_element().text().collect();
    let joined = text.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
