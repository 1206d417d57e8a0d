//! Fixed `<head>` injections.

use crate::embed::{self, scripts, styles};
use crate::pipeline::Transform;
use crate::utils::html;

// =============================================================================
// ScriptShim
// =============================================================================

/// Error-swallowing DOM wrappers and analytics stubs, first thing in `<head>`.
pub struct ScriptShim;

impl Transform for ScriptShim {
    fn name(&self) -> &'static str {
        "script-shim"
    }

    fn transform(&self, html: String) -> String {
        html::insert_after_head_open(&html, &embed::script(scripts::ERROR_SHIM_JS))
    }
}

// =============================================================================
// CspMeta
// =============================================================================

const CONNECT_SRC: &str = "*.google.com *.google-analytics.com *.analytics.google.com \
    *.googletagmanager.com *.doubleclick.net *.facebook.com *.facebook.net *.fbcdn.net \
    connect.facebook.net *.googleapis.com *.gstatic.com *.ccm.collect *.nr-data.net *.newrelic.com";

const IMG_SRC: &str = "*.google.com *.google-analytics.com *.googletagmanager.com \
    *.google.com.eg *.googleapis.com *.gstatic.com *.doubleclick.net *.facebook.com \
    *.facebook.net *.fbcdn.net";

const SCRIPT_SRC: &str = "*.google.com *.google-analytics.com *.googletagmanager.com \
    *.googleapis.com *.gstatic.com *.doubleclick.net *.facebook.com *.facebook.net \
    connect.facebook.net *.fbcdn.net *.tabby.ai *.jsdelivr.net";

const STYLE_SRC: &str = "*.googleapis.com *.gstatic.com *.jsdelivr.net";

const FRAME_SRC: &str = "*.doubleclick.net *.google.com *.facebook.com *.facebook.net";

/// Content-Security-Policy meta tag widening the origins third-party
/// scripts talk to.
pub struct CspMeta;

impl CspMeta {
    pub fn policy() -> String {
        format!(
            "connect-src {CONNECT_SRC} 'self'; \
             img-src {IMG_SRC} data: 'self'; \
             script-src {SCRIPT_SRC} 'unsafe-inline' 'unsafe-eval' 'self'; \
             style-src {STYLE_SRC} 'unsafe-inline' 'self'; \
             frame-src {FRAME_SRC} 'self'; \
             worker-src blob: 'self'; \
             child-src blob: 'self'; \
             font-src * data: 'self'"
        )
    }
}

impl Transform for CspMeta {
    fn name(&self) -> &'static str {
        "csp-meta"
    }

    fn transform(&self, html: String) -> String {
        let meta = format!(
            r#"<meta http-equiv="Content-Security-Policy" content="{}">"#,
            Self::policy()
        );
        html::insert_after_head_open(&html, &meta)
    }
}

// =============================================================================
// StreamingHints
// =============================================================================

/// First-paint swap script in `<head>` and a visibility flush right after it.
pub struct StreamingHints;

impl Transform for StreamingHints {
    fn name(&self) -> &'static str {
        "streaming-hints"
    }

    fn transform(&self, html: String) -> String {
        let html = html::insert_after_head_open(&html, &embed::script(scripts::STREAMING_JS));
        html::insert_after_head_close(&html, &embed::script(scripts::STREAMING_VISIBLE_JS))
    }
}

// =============================================================================
// LayoutShiftFix
// =============================================================================

/// Aspect-ratio rules for containers that shift while loading.
pub struct LayoutShiftFix;

impl Transform for LayoutShiftFix {
    fn name(&self) -> &'static str {
        "layout-shift-fix"
    }

    fn transform(&self, html: String) -> String {
        html::insert_before_head_close(&html, &embed::style(styles::LAYOUT_SHIFT_CSS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><head><title>t</title></head><body><p>x</p></body></html>";

    #[test]
    fn test_script_shim_opens_head() {
        let html = ScriptShim.apply(PAGE.into());
        assert!(html.starts_with("<html><head><script>(function () {"));
        assert!(html.contains("</script><title>t</title>"));
    }

    #[test]
    fn test_csp_meta() {
        let html = CspMeta.apply(PAGE.into());
        assert!(html.starts_with(r#"<html><head><meta http-equiv="Content-Security-Policy" content="connect-src *.google.com"#));
        assert!(html.contains("font-src * data: 'self'\"><title>"));

        let policy = CspMeta::policy();
        assert!(policy.contains("script-src *.google.com"));
        assert!(policy.contains("*.tabby.ai *.jsdelivr.net 'unsafe-inline' 'unsafe-eval' 'self';"));
        assert!(policy.contains("worker-src blob: 'self'; child-src blob: 'self';"));
        assert!(!policy.contains("  "));
    }

    #[test]
    fn test_streaming_hints_positions() {
        let html = StreamingHints.apply(PAGE.into());
        let head_open = html.find("<head><script>").unwrap();
        let visible = html.find("</head><script>").unwrap();
        assert!(head_open < visible);
        assert!(html.contains("</script><body>"));
    }

    #[test]
    fn test_layout_shift_before_head_close() {
        let html = LayoutShiftFix.apply(PAGE.into());
        assert!(html.contains("<title>t</title><style>"));
        assert!(html.contains("</style></head>"));
    }
}
