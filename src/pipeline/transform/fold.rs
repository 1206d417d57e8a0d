//! Above-the-fold prioritization.
//!
//! Loads the first stylesheet as critical CSS, defers below-the-fold images
//! behind `data-lazy-src`, and parks large footer/widget blocks in a
//! `data-lazy-html` attribute until they scroll into view.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{defer_image, stylesheets};
use crate::embed::scripts::{ABOVE_FOLD_JS, CssUrlVars};
use crate::pipeline::Transform;
use crate::utils::html;

/// Blocks whose class marks secondary page furniture.
static LAZY_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<div([^>]*)class=['"]([^'"]*(?:footer|widget|sidebar|additional|block-bottom|newsletter|social-links|copyright|links|menu-footer|secondary)[^'"]*)['"]([^>]*)>(.*?)</div>"#,
    )
    .unwrap()
});

/// Blocks shorter than this stay inline.
const MIN_LAZY_BLOCK: usize = 500;

pub struct AboveFoldPriority;

impl AboveFoldPriority {
    fn defer_images(html: &str) -> String {
        html::rewrite_tags(html, "img", |tag| {
            let src = tag.attr("src").filter(|src| !src.is_empty())?;
            if src.starts_with("data:")
                || tag.has_attr("loading")
                || tag.has_attr("data-lazy-src")
                || tag.raw.contains("above-the-fold")
            {
                return None;
            }
            Some(defer_image(tag.raw, src, "data-lazy"))
        })
    }

    /// Only leaf blocks move; a nested `<div>` or `<script>` keeps the block inline.
    fn defer_blocks(html: &str) -> String {
        LAZY_BLOCK_RE
            .replace_all(html, |caps: &Captures<'_>| {
                let content = &caps[4];
                if content.len() < MIN_LAZY_BLOCK
                    || html::contains_ci(content, "<div")
                    || html::contains_ci(content, "<script")
                {
                    return caps[0].to_string();
                }
                format!(
                    r#"<div{}class="{}"{} data-lazy-html="{}"></div>"#,
                    &caps[1],
                    &caps[2],
                    &caps[3],
                    html::escape_attr(content)
                )
            })
            .into_owned()
    }
}

impl Transform for AboveFoldPriority {
    fn name(&self) -> &'static str {
        "above-fold-priority"
    }

    fn transform(&self, html: String) -> String {
        let critical_css = html::head_inner(&html)
            .and_then(|head| stylesheets(head).next().map(|(_, href)| href.to_string()))
            .unwrap_or_default();
        let loader = ABOVE_FOLD_JS.render_script(&CssUrlVars { url: &critical_css });
        let html = html::insert_before_head_close(&html, &loader);

        let html = Self::defer_images(&html);
        Self::defer_blocks(&html)
    }
}
