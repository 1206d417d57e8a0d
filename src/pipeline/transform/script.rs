//! Script deferral, analytics delay and tracking placeholders.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::embed;
use crate::embed::scripts::{
    ANALYTICS_LOADER_JS, AnalyticsVars, MODULE_PRELOAD_JS, SCRIPT_LOADER_JS, TRACKING_LOADER_JS,
};
use crate::pipeline::Transform;
use crate::utils::html;

// =============================================================================
// ScriptDefer
// =============================================================================

/// Script URLs (case-insensitive substrings) that must keep blocking.
const BLOCKING_SCRIPTS: &[&str] = &["require", "jquery", "checkout", "customer", "catalog"];

/// `defer` on ordinary external scripts, plus the module-preload probe and the
/// DOMContentLoaded loader.
pub struct ScriptDefer;

impl Transform for ScriptDefer {
    fn name(&self) -> &'static str {
        "script-defer"
    }

    fn transform(&self, html: String) -> String {
        let html = html::insert_after_head_open(&html, &embed::script(MODULE_PRELOAD_JS));
        let html = html::insert_before_body_close(&html, &embed::script(SCRIPT_LOADER_JS));

        html::rewrite_tags(&html, "script", |tag| {
            let src = tag.attr("src")?;
            let path = src.split(['?', '#']).next().unwrap_or_default();
            if !path.to_ascii_lowercase().ends_with(".js")
                || tag.has_attr("defer")
                || tag.has_attr("async")
                || tag.has_attr("critical")
                || BLOCKING_SCRIPTS.iter().any(|name| html::contains_ci(src, name))
            {
                return None;
            }
            Some(html::add_flag(tag.raw, "defer"))
        })
    }
}

// =============================================================================
// InlineScriptMarker
// =============================================================================

/// Bare inline scripts with a body of at most 50 characters.
static SHORT_INLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script>([^<]{1,50})</script>").unwrap());

/// Tags short attribute-less inline scripts with `data-optimize="inline"`.
pub struct InlineScriptMarker;

impl Transform for InlineScriptMarker {
    fn name(&self) -> &'static str {
        "inline-script-marker"
    }

    fn transform(&self, html: String) -> String {
        SHORT_INLINE_RE
            .replace_all(&html, r#"<script data-optimize="inline">$1</script>"#)
            .into_owned()
    }
}

// =============================================================================
// AnalyticsDefer
// =============================================================================

/// External scripts on analytics hosts.
static ANALYTICS_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<script[^>]*\ssrc=['"]((?:https?:)?//[^/'"]*(?:google|gtag|gtm|analytics|facebook)[^/'"]*[^'"]*)['"][^>]*>\s*</script>"#,
    )
    .unwrap()
});

/// Inline tag-manager bootstraps.
static INLINE_ANALYTICS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<script[^>]*>\s*(?:window\.dataLayer|window\.gtag|!function\(w,d,s,l,i\)|\(function\(w,d,s,l,i\)).*?</script>",
    )
    .unwrap()
});

static GTM_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)GTM-[A-Z0-9]+").unwrap());

/// Only inline snippets mentioning one of these are moved.
const INLINE_MARKERS: &[&str] = &["googletagmanager", "gtag", "dataLayer", "fbq", "google"];

/// Moves analytics scripts into a loader that runs them after interaction,
/// on idle, after a timeout, or right away on conversion events.
pub struct AnalyticsDefer;

impl AnalyticsDefer {
    /// Body of an inline script without its tags.
    fn script_body(script: &str) -> &str {
        let start = script.find('>').map_or(0, |i| i + 1);
        let end = html::rfind_ci(script, "</script>").unwrap_or(script.len());
        script.get(start..end).unwrap_or_default().trim()
    }
}

impl Transform for AnalyticsDefer {
    fn name(&self) -> &'static str {
        "analytics-defer"
    }

    fn transform(&self, html: String) -> String {
        let mut external = Vec::new();
        let html = ANALYTICS_SCRIPT_RE.replace_all(&html, |caps: &Captures<'_>| {
            external.push(caps[1].to_string());
            String::new()
        });

        let mut inline = Vec::new();
        let html = INLINE_ANALYTICS_RE.replace_all(&html, |caps: &Captures<'_>| {
            let script = &caps[0];
            if !INLINE_MARKERS.iter().any(|marker| script.contains(marker)) {
                return script.to_string();
            }
            inline.push(Self::script_body(script).to_string());
            String::new()
        });
        let html = html.into_owned();

        if external.is_empty() && inline.is_empty() {
            return html;
        }

        let gtm_id = external
            .iter()
            .find_map(|src| GTM_ID_RE.find(src))
            .map_or("", |id| id.as_str());
        let loader = ANALYTICS_LOADER_JS.render_script(&AnalyticsVars {
            scripts: &external,
            inline: &inline,
            gtm_id,
        });
        html::insert_before_head_close(&html, &loader)
    }
}

// =============================================================================
// TrackingDefer
// =============================================================================

/// External scripts on tracking hosts.
static TRACKING_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<script[^>]*\ssrc=['"]((?:https?:)?//[^/'"]*(?:google-analytics|googletagmanager|facebook|fbcdn|analytics|pixel|gtm|tag)[^/'"]*[^'"]*)['"][^>]*>\s*</script>"#,
    )
    .unwrap()
});

/// Scripts carrying this marker are never touched.
const NO_OPTIMIZE: &str = "noOptimize";

/// Replaces tracking scripts with inert `data-tracking-src` placeholders.
pub struct TrackingDefer;

impl Transform for TrackingDefer {
    fn name(&self) -> &'static str {
        "tracking-defer"
    }

    fn transform(&self, html: String) -> String {
        let html = TRACKING_SCRIPT_RE
            .replace_all(&html, |caps: &Captures<'_>| {
                if caps[0].contains(NO_OPTIMIZE) {
                    return caps[0].to_string();
                }
                format!(
                    r#"<script data-tracking-src="{}" type="text/plain"></script>"#,
                    &caps[1]
                )
            })
            .into_owned();
        html::insert_before_body_close(&html, &embed::script(TRACKING_LOADER_JS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(head: &str, body: &str) -> String {
        format!("<html><head>{head}</head><body>{body}</body></html>")
    }

    #[test]
    fn test_script_defer() {
        let html = ScriptDefer.apply(page(
            "",
            concat!(
                r#"<script src="/static/theme.js"></script>"#,
                r#"<script src="/static/jquery/ui.js"></script>"#,
                r#"<script src="/static/Magento_Checkout/js/cart.js"></script>"#,
                r#"<script async src="/static/a.js"></script>"#,
                r#"<script critical src="/static/b.js"></script>"#,
                r#"<script src="/static/data.json"></script>"#,
            ),
        ));
        assert!(html.contains(r#"<script src="/static/theme.js" defer></script>"#));
        assert!(html.contains(r#"<script src="/static/jquery/ui.js"></script>"#));
        assert!(html.contains(r#"<script src="/static/Magento_Checkout/js/cart.js"></script>"#));
        assert!(html.contains(r#"<script async src="/static/a.js"></script>"#));
        assert!(html.contains(r#"<script critical src="/static/b.js"></script>"#));
        assert!(html.contains(r#"<script src="/static/data.json"></script>"#));
        assert!(html.starts_with("<html><head><script>"));
        assert!(html.ends_with("</script></body></html>"));
    }

    #[test]
    fn test_inline_script_marker() {
        let long = "x".repeat(51);
        let html = InlineScriptMarker.apply(page(
            "<script>var a = 1;</script>",
            &format!(
                r#"<SCRIPT>b()</SCRIPT><script type="text/x-magento-init">{{}}</script><script>{long}</script><script></script>"#
            ),
        ));
        assert!(html.contains(r#"<script data-optimize="inline">var a = 1;</script>"#));
        assert!(html.contains(r#"<script data-optimize="inline">b()</script>"#));
        assert!(html.contains(r#"<script type="text/x-magento-init">{}</script>"#));
        assert!(html.contains(&format!("<script>{long}</script>")));
        assert!(html.contains("<script></script>"));
        assert_eq!(InlineScriptMarker.apply(html.clone()), html);
    }

    #[test]
    fn test_analytics_defer() {
        let html = AnalyticsDefer.apply(page(
            concat!(
                r#"<script async src="https://www.googletagmanager.com/gtm.js?id=GTM-AB12CD"></script>"#,
                "<script>\n  window.dataLayer = window.dataLayer || [];\n</script>",
                "<script>window.dataLayer.push({page: 1});</script>",
            ),
            r#"<script src="/static/app.js"></script>"#,
        ));
        assert!(!html.contains(r#"src="https://www.googletagmanager.com"#));
        assert!(!html.contains("<script>window.dataLayer.push"));
        assert!(html.contains(r#"["https://www.googletagmanager.com/gtm.js?id=GTM-AB12CD"]"#));
        assert!(html.contains(r#""GTM-AB12CD""#));
        assert!(html.contains(r#"["window.dataLayer = window.dataLayer || [];","window.dataLayer.push({page: 1});"]"#));
        assert!(html.contains(r#"<script src="/static/app.js"></script>"#));
    }

    #[test]
    fn test_analytics_defer_leaves_plain_inline_scripts() {
        let original = page("<script>(function(w,d,s,l,i){ w.x = 1; })();</script>", "");
        assert_eq!(AnalyticsDefer.apply(original.clone()), original);
    }

    #[test]
    fn test_tracking_defer() {
        let html = TrackingDefer.apply(page(
            "",
            concat!(
                r#"<script src="https://connect.facebook.net/en_US/fbevents.js"></script>"#,
                r#"<script noOptimize src="https://pixel.example/p.js"></script>"#,
                r#"<script src="/static/app.js"></script>"#,
            ),
        ));
        assert!(html.contains(
            r#"<script data-tracking-src="https://connect.facebook.net/en_US/fbevents.js" type="text/plain"></script>"#
        ));
        assert!(html.contains(r#"<script noOptimize src="https://pixel.example/p.js"></script>"#));
        assert!(html.contains(r#"<script src="/static/app.js"></script>"#));
        assert!(html.ends_with("</script></body></html>"));
    }
}
