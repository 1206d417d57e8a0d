//! Priority loader and non-blocking stylesheets.

use super::stylesheets;
use crate::embed::{self, scripts};
use crate::pipeline::Transform;
use crate::utils::html;

/// Buckets resources into critical/high/medium/low and loads them in turn.
///
/// Stylesheets after the first switch to `media="print"` until they load,
/// unless they already set `media` or are print styles.
pub struct PriorityLoader;

impl Transform for PriorityLoader {
    fn name(&self) -> &'static str {
        "priority-loader"
    }

    fn transform(&self, html: String) -> String {
        let html = html::insert_after_body_open(&html, &embed::script(scripts::PRIORITY_LOADER_JS));

        let deferred: Vec<usize> = stylesheets(&html)
            .skip(1)
            .filter(|(tag, href)| !tag.has_attr("media") && !href.contains("print"))
            .map(|(tag, _)| tag.start)
            .collect();
        if deferred.is_empty() {
            return html;
        }

        html::rewrite_tags(&html, "link", |tag| {
            if !deferred.contains(&tag.start) {
                return None;
            }
            let link = html::set_attr(tag.raw, "media", "print");
            Some(html::set_attr(&link, "onload", "this.media='all'"))
        })
    }
}
