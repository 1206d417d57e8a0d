//! Image lazy loading.

use super::defer_image;
use crate::embed::{self, scripts};
use crate::pipeline::Transform;
use crate::utils::html;

/// Images whose tag or URL mention these stay eager.
const EAGER_HINTS: &[&str] = &["logo", "icon"];

/// Class marking images that must load immediately.
const ABOVE_THE_FOLD: &str = "above-the-fold";

// =============================================================================
// LazyImages
// =============================================================================

/// Placeholder swap driven by the LQIP observer.
///
/// Each image moves its `src`/`srcset` to `data-src`/`data-srcset` and shows
/// a transparent SVG until it scrolls into view.
pub struct LazyImages;

impl Transform for LazyImages {
    fn name(&self) -> &'static str {
        "lazy-images"
    }

    fn transform(&self, html: String) -> String {
        let html = html::insert_before_head_close(&html, &embed::script(scripts::LQIP_JS));
        html::rewrite_tags(&html, "img", |tag| {
            let src = tag.attr("src").filter(|src| !src.is_empty())?;
            if src.starts_with("data:")
                || tag.has_attr("data-src")
                || EAGER_HINTS.iter().any(|hint| tag.raw.contains(hint))
            {
                return None;
            }
            Some(defer_image(tag.raw, src, "data"))
        })
    }
}

// =============================================================================
// NativeLazyLoading
// =============================================================================

/// `loading="lazy"` on images that do not choose a loading mode.
pub struct NativeLazyLoading;

impl Transform for NativeLazyLoading {
    fn name(&self) -> &'static str {
        "native-lazy-loading"
    }

    fn transform(&self, html: String) -> String {
        html::rewrite_tags(&html, "img", |tag| {
            if tag.has_attr("loading") || tag.raw.contains(ABOVE_THE_FOLD) {
                return None;
            }
            Some(html::set_attr(tag.raw, "loading", "lazy"))
        })
    }
}
