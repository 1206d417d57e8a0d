//! Preload hints for the critical rendering path.

use regex::Regex;
use std::sync::LazyLock;

use super::stylesheets;
use crate::pipeline::Transform;
use crate::utils::html;

/// Script paths worth preloading: the module loader and jQuery builds.
static CRITICAL_SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:require\.js|jquery[^/]*\.js)$").unwrap());

/// Stylesheets preloaded, counted after print styles are dropped.
const PRELOADED_STYLESHEETS: usize = 2;

/// `<link rel="preload">` for the first stylesheets and the loader scripts.
pub struct CriticalPreload;

impl CriticalPreload {
    /// `(href, as)` pairs to preload, without duplicates.
    fn resources(html: &str) -> Vec<(String, &'static str)> {
        let styles = stylesheets(html)
            .map(|(_, href)| href)
            .filter(|href| !href.contains("print"))
            .take(PRELOADED_STYLESHEETS)
            .map(|href| (href.to_string(), "style"));

        let scripts = html::tags(html, "script").filter_map(|tag| {
            let src = tag.attr("src")?;
            let path = src.split(['?', '#']).next().unwrap_or_default();
            CRITICAL_SCRIPT_RE
                .is_match(path)
                .then(|| (src.to_string(), "script"))
        });

        let mut resources: Vec<(String, &'static str)> = Vec::new();
        for resource in styles.chain(scripts) {
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
        resources
    }
}

impl Transform for CriticalPreload {
    fn name(&self) -> &'static str {
        "critical-preload"
    }

    fn transform(&self, html: String) -> String {
        let tags: String = Self::resources(&html)
            .iter()
            .map(|(href, kind)| {
                format!(
                    "<link rel=\"preload\" href=\"{}\" as=\"{kind}\" crossorigin=\"anonymous\">\n",
                    html::escape_attr(href)
                )
            })
            .collect();
        if tags.is_empty() {
            return html;
        }
        html::insert_before_head_close(&html, &tags)
    }
}

// =============================================================================
// CriticalRequests
// =============================================================================

/// `src` values naming the module loader or jQuery.
static LOADER_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i).(?:require|jquery).").unwrap());

/// Stylesheets preloaded on every response.
const REQUEST_STYLESHEETS: usize = 3;
/// Loader scripts preloaded on every response.
const REQUEST_SCRIPTS: usize = 2;

/// Preloads the first stylesheets and loader scripts on every enabled
/// response. Resources that already carry a preload hint are left alone.
pub struct CriticalRequests;

impl CriticalRequests {
    /// `(href, as)` pairs to preload, in document order.
    fn resources(html: &str) -> Vec<(String, &'static str)> {
        let preloaded: Vec<&str> = html::tags(html, "link")
            .filter(|tag| tag.attr("rel").is_some_and(|rel| rel.trim().eq_ignore_ascii_case("preload")))
            .filter_map(|tag| tag.attr("href"))
            .collect();

        let styles = stylesheets(html)
            .map(|(_, href)| href)
            .take(REQUEST_STYLESHEETS)
            .map(|href| (href, "style"));
        let scripts = html::tags(html, "script")
            .filter_map(|tag| tag.attr("src"))
            .filter(|src| LOADER_SRC_RE.is_match(src))
            .take(REQUEST_SCRIPTS)
            .map(|src| (src, "script"));

        styles
            .chain(scripts)
            .filter(|(href, _)| !preloaded.contains(href))
            .map(|(href, kind)| (href.to_string(), kind))
            .collect()
    }
}

impl Transform for CriticalRequests {
    fn name(&self) -> &'static str {
        "critical-requests"
    }

    fn transform(&self, html: String) -> String {
        let tags: String = Self::resources(&html)
            .iter()
            .map(|(href, kind)| {
                format!(
                    "<link rel=\"preload\" href=\"{}\" as=\"{kind}\" crossorigin=\"anonymous\">\n",
                    html::escape_attr(href)
                )
            })
            .collect();
        if tags.is_empty() {
            return html;
        }
        html::insert_before_head_close(&html, &tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources() {
        let html = concat!(
            "<html><head>",
            r#"<link rel="stylesheet" href="/print.css" media="print">"#,
            r#"<link rel="stylesheet" href="/a.css">"#,
            r#"<link rel="stylesheet" href="/b.css">"#,
            r#"<link rel="stylesheet" href="/c.css">"#,
            r#"<script src="/static/requirejs/require.js"></script>"#,
            r#"<script src="/static/jquery.min.js?v=1"></script>"#,
            r#"<script src="/static/jquery.min.js?v=1"></script>"#,
            r#"<script src="/static/jquery/ui/widget.js"></script>"#,
            "</head><body></body></html>",
        );
        assert_eq!(
            CriticalPreload::resources(html),
            vec![
                ("/a.css".to_string(), "style"),
                ("/b.css".to_string(), "style"),
                ("/static/requirejs/require.js".to_string(), "script"),
                ("/static/jquery.min.js?v=1".to_string(), "script"),
            ]
        );
    }

    #[test]
    fn test_preload_tags() {
        let html = CriticalPreload.apply(
            r#"<html><head><link rel="stylesheet" href="/a.css"></head><body></body></html>"#.into(),
        );
        assert!(html.contains(
            "<link rel=\"preload\" href=\"/a.css\" as=\"style\" crossorigin=\"anonymous\">\n</head>"
        ));
    }

    #[test]
    fn test_nothing_to_preload() {
        let original = "<html><head></head><body></body></html>".to_string();
        assert_eq!(CriticalPreload.apply(original.clone()), original);
    }

    #[test]
    fn test_critical_requests_take_three_styles_and_two_loaders() {
        let html = concat!(
            "<html><head>",
            r#"<link rel="stylesheet" href="/print.css" media="print">"#,
            r#"<link rel="stylesheet" href="/a.css">"#,
            r#"<link rel="stylesheet" href="/b.css">"#,
            r#"<link rel="stylesheet" href="/c.css">"#,
            r#"<script src="/static/requirejs/require.js"></script>"#,
            r#"<script src="/static/app.js"></script>"#,
            r#"<script src="/static/jquery.min.js"></script>"#,
            r#"<script src="/static/jquery/ui/widget.js"></script>"#,
            "</head><body></body></html>",
        );
        assert_eq!(
            CriticalRequests::resources(html),
            vec![
                ("/print.css".to_string(), "style"),
                ("/a.css".to_string(), "style"),
                ("/b.css".to_string(), "style"),
                ("/static/requirejs/require.js".to_string(), "script"),
                ("/static/jquery.min.js".to_string(), "script"),
            ]
        );
    }

    #[test]
    fn test_critical_requests_skip_existing_preloads() {
        let html = concat!(
            "<html><head>",
            r#"<link rel="stylesheet" href="/a.css">"#,
            r#"<link rel="stylesheet" href="/b.css">"#,
            "</head><body></body></html>",
        );
        let html = CriticalPreload.apply(html.to_string());
        let html = CriticalRequests.apply(html);
        assert_eq!(html.matches(r#"<link rel="preload" href="/a.css""#).count(), 1);
        assert_eq!(html.matches(r#"<link rel="preload" href="/b.css""#).count(), 1);

        let again = CriticalRequests.apply(html.clone());
        assert_eq!(again, html);
    }
}
