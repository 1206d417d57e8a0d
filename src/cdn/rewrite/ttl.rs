//! Long-lived cache query on CDN-hosted assets.

use super::{TTL_QUERY, has_extension};
use crate::utils::html;

/// Tags and the attribute/extensions that receive the TTL query.
const TTL_TARGETS: &[(&str, &str, &[&str])] = &[
    ("script", "src", &["js"]),
    ("link", "href", &["css"]),
    ("img", "src", &["jpg", "jpeg", "png", "gif", "webp"]),
];

/// Append `ttl=31536000` to CDN URLs that do not carry it yet.
pub(super) fn with_ttl(url: &str) -> String {
    if url.contains("ttl=") {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{TTL_QUERY}")
}

/// Add the TTL query to every CDN-origin script, stylesheet and image.
pub(super) fn add_cache_ttl(html: String, is_cdn_url: impl Fn(&str) -> bool) -> String {
    let mut html = html;
    for (name, attr, extensions) in TTL_TARGETS {
        html = html::rewrite_tags(&html, name, |tag| {
            let url = tag.attr(attr)?;
            if !is_cdn_url(url) || !has_extension(url, extensions) || url.contains("ttl=") {
                return None;
            }
            Some(html::set_attr(tag.raw, attr, &with_ttl(url)))
        });
    }
    html
}
