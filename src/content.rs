//! Markdown rendering for ad descriptions.
//!
//! The sole trust boundary between user-authored text and HTML shown to other
//! users: markdown is converted to HTML, then reduced to an explicit tag and
//! attribute allowlist. Pure and deterministic.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{html, Options, Parser};

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "em", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "a",
    "blockquote", "code", "pre", "hr", "table", "thead", "tbody", "tr", "th", "td",
];

const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Renders markdown to sanitized HTML. Empty input yields an empty string.
pub fn render(source: &str) -> String {
    if source.is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut raw = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut raw, Parser::new_ext(source, options));

    sanitize(&raw)
}

/// Anything outside the allowlist is removed, not escaped. `href` values with
/// a scheme outside http/https/mailto lose the attribute entirely.
fn sanitize(raw: &str) -> String {
    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].iter().copied().collect());
    tag_attributes.insert("code", ["class"].iter().copied().collect());

    ammonia::Builder::new()
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect())
        .link_rel(None)
        .clean(raw)
        .to_string()
}
