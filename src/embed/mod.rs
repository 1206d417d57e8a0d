//! Embedded scripts and stylesheets injected into pages.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `scripts` - Inline JavaScript (`src/embed/scripts/*.js`)
//! - `styles` - Inline CSS (`src/embed/styles/*.css`)
//!
//! Snippets never contain `<script src=`, `<img` or `<link` markup, so the
//! tag-level transforms that run after an injection never match it.
//!
//! # Usage
//!
//! ```ignore
//! use embed::scripts::{ANALYTICS_LOADER_JS, AnalyticsVars};
//!
//! let tag = ANALYTICS_LOADER_JS.render_script(&AnalyticsVars {
//!     scripts: &srcs,
//!     inline: &bodies,
//!     gtm_id: "GTM-ABC123",
//! });
//! ```

mod template;

pub use template::{Template, TemplateVars, fill};

/// Wrap JavaScript in an inline `<script>` element.
pub fn script(body: &str) -> String {
    format!("<script>{}</script>", body.trim_end())
}

/// Wrap CSS in a `<style>` element.
pub fn style(body: &str) -> String {
    format!("<style>{}</style>", body.trim_end())
}

/// Wrap CSS in a `<style>` element carrying an `id`.
pub fn style_with_id(id: &str, body: &str) -> String {
    format!("<style id=\"{id}\">{}</style>", body.trim_end())
}

pub mod scripts {
    use super::{Template, TemplateVars, fill};
    use crate::utils::html::script_json;
    use serde::Serialize;

    /// Wraps selector lookups and listener registration to swallow errors,
    /// and stubs missing analytics globals.
    pub const ERROR_SHIM_JS: &str = include_str!("scripts/error-shim.js");

    /// Short `requestAnimationFrame` swap for a faster first paint.
    pub const STREAMING_JS: &str = include_str!("scripts/streaming.js");

    /// Makes the document visible once the head is parsed.
    pub const STREAMING_VISIBLE_JS: &str = include_str!("scripts/streaming-visible.js");

    /// Blur-placeholder image loader driven by IntersectionObserver.
    pub const LQIP_JS: &str = include_str!("scripts/lqip.js");

    /// Idle/interaction loader for `data-tracking-src` placeholders.
    pub const TRACKING_LOADER_JS: &str = include_str!("scripts/tracking-loader.js");

    /// Module preload support probe.
    pub const MODULE_PRELOAD_JS: &str = include_str!("scripts/module-preload.js");

    /// DOMContentLoaded pass that delays trackers and defers scripts.
    pub const SCRIPT_LOADER_JS: &str = include_str!("scripts/script-loader.js");

    /// Staggered critical/high/medium/low resource loader.
    pub const PRIORITY_LOADER_JS: &str = include_str!("scripts/priority-loader.js");

    /// Restores the deferred body of a progressive shell page.
    pub const SHELL_LOADER_JS: &str = include_str!("scripts/shell-loader.js");

    /// One resource handed to the payload loader.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct LoadFile {
        #[serde(rename = "type")]
        pub kind: &'static str,
        pub url: String,
    }

    impl LoadFile {
        pub fn js(url: impl Into<String>) -> Self {
            Self { kind: "js", url: url.into() }
        }

        pub fn css(url: impl Into<String>) -> Self {
            Self { kind: "css", url: url.into() }
        }
    }

    /// Variables for payload-loader.js.
    pub struct PayloadVars<'a> {
        pub files: &'a [LoadFile],
    }

    impl TemplateVars for PayloadVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(content, &[("__FILES_TO_LOAD__", script_json(self.files).as_str())])
        }
    }

    /// Chunked fetch-and-execute loader for removed scripts and stylesheets.
    pub const PAYLOAD_LOADER_JS: Template<PayloadVars<'static>> =
        Template::new(include_str!("scripts/payload-loader.js"));

    /// Variables for analytics-loader.js.
    pub struct AnalyticsVars<'a> {
        pub scripts: &'a [String],
        pub inline: &'a [String],
        pub gtm_id: &'a str,
    }

    impl TemplateVars for AnalyticsVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(
                content,
                &[
                    ("__ANALYTICS_SCRIPTS__", script_json(self.scripts).as_str()),
                    ("__INLINE_SCRIPTS__", script_json(self.inline).as_str()),
                    ("__GTM_ID__", script_json(self.gtm_id).as_str()),
                ],
            )
        }
    }

    /// Deferred analytics / tag manager loader.
    pub const ANALYTICS_LOADER_JS: Template<AnalyticsVars<'static>> =
        Template::new(include_str!("scripts/analytics-loader.js"));

    /// Variables for scripts that fetch one stylesheet.
    pub struct CssUrlVars<'a> {
        pub url: &'a str,
    }

    impl TemplateVars for CssUrlVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(content, &[("__CSS_URL__", script_json(self.url).as_str())])
        }
    }

    /// Critical CSS XHR plus `data-lazy-src` / `data-lazy-html` observers.
    pub const ABOVE_FOLD_JS: Template<CssUrlVars<'static>> =
        Template::new(include_str!("scripts/above-fold.js"));

    /// Fetches the first stylesheet and applies its above-the-fold rules.
    pub const SHELL_CRITICAL_CSS_JS: Template<CssUrlVars<'static>> =
        Template::new(include_str!("scripts/shell-critical-css.js"));

    /// Variables for page-content.js.
    pub struct PageContentVars<'a> {
        pub content: &'a str,
    }

    impl TemplateVars for PageContentVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(content, &[("__CONTENT__", script_json(self.content).as_str())])
        }
    }

    /// `window.fullPageContent = "...";`
    pub const PAGE_CONTENT_JS: Template<PageContentVars<'static>> =
        Template::new(include_str!("scripts/page-content.js"));
}

pub mod styles {
    /// Aspect-ratio rules for containers known to shift.
    pub const LAYOUT_SHIFT_CSS: &str = include_str!("styles/layout-shift.css");

    /// Rules for `image-cls-fix` images and `<picture>` wrappers.
    pub const WEBP_CLS_CSS: &str = include_str!("styles/webp-cls.css");

    /// `id` of the injected WebP style block.
    pub const WEBP_CLS_ID: &str = "cdnify-webp-cls";

    /// Progressive shell page styles.
    pub const SHELL_CSS: &str = include_str!("styles/shell.css");
}
