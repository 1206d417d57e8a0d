//! Performance stages.
//!
//! # Modules
//!
//! - `head`: fixed head injections (error shim, CSP, streaming hints, CLS styles)
//! - `payload`: moves CDN scripts and secondary stylesheets into a chunked loader
//! - `media`: image lazy loading (placeholder swap and native `loading`)
//! - `script`: script deferral, inline marking, analytics and tracking delay
//! - `link`: preload hints for the critical path
//! - `fold`: above-the-fold prioritization
//! - `body`: priority loader and non-blocking stylesheets
//! - `shell`: progressive shell page

mod body;
mod fold;
mod head;
mod link;
mod media;
mod payload;
mod script;
mod shell;

pub use body::PriorityLoader;
pub use fold::AboveFoldPriority;
pub use head::{CspMeta, LayoutShiftFix, ScriptShim, StreamingHints};
pub use link::{CriticalPreload, CriticalRequests};
pub use media::{LazyImages, NativeLazyLoading};
pub use payload::PayloadSplitter;
pub use script::{AnalyticsDefer, InlineScriptMarker, ScriptDefer, TrackingDefer};
pub use shell::ProgressiveShell;

use crate::utils::html::{self, Tag};

/// 1x1 transparent SVG used as `src` while the real image is deferred.
pub const PLACEHOLDER_SRC: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 1 1'%3E%3C/svg%3E";

/// `<link rel="stylesheet">` tags with their `href`, in document order.
fn stylesheets(html: &str) -> impl Iterator<Item = (Tag<'_>, &str)> {
    html::tags(html, "link").filter_map(|tag| {
        let is_stylesheet = tag
            .attr("rel")
            .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"));
        let href = tag.attr("href").filter(|href| !href.is_empty())?;
        is_stylesheet.then_some((tag, href))
    })
}

/// Swap an image to a placeholder, keeping the real `src`/`srcset` in
/// `{prefix}-src` / `{prefix}-srcset`, and mark it `loading="lazy"`.
fn defer_image(raw: &str, src: &str, prefix: &str) -> String {
    let srcset = html::get_attr(raw, "srcset").map(str::to_string);
    let mut img = html::remove_attr(raw, "srcset");
    img = html::set_attr(&img, "src", PLACEHOLDER_SRC);
    img = html::set_attr(&img, &format!("{prefix}-src"), src);
    if let Some(srcset) = srcset {
        img = html::set_attr(&img, &format!("{prefix}-srcset"), &srcset);
    }
    html::set_attr(&img, "loading", "lazy")
}
