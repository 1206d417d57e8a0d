//! Progressive shell page.
//!
//! Replaces the whole document with a minimal shell: the original head, the
//! above-the-fold part of the body, and the rest of the body stored in
//! `window.fullPageContent` until the loader restores it.
//!
//! ```text
//! <!DOCTYPE html><html><head>
//!   shell styles, critical CSS fetch, loader, original head
//! </head><body>
//!   above-the-fold markup
//!   <div class="lazy-content" id="remaining-content">spinner</div>
//!   window.fullPageContent = "...remaining body...";
//! </body></html>
//! ```

use super::{PLACEHOLDER_SRC, stylesheets};
use crate::embed::scripts::{
    CssUrlVars, PAGE_CONTENT_JS, PageContentVars, SHELL_CRITICAL_CSS_JS, SHELL_LOADER_JS,
};
use crate::embed::{self, styles};
use crate::pipeline::Transform;
use crate::utils::html;

/// Class or id prefixes where the above-the-fold part ends.
const FOLD_MARKERS: &[&str] = &["footer", "sidebar", "secondary", "menu-footer", "newsletter"];

/// Images narrower than this are loaded eagerly.
const MIN_DEFERRED_WIDTH: u32 = 60;

const REMAINING_CONTENT: &str =
    r#"<div class="lazy-content" id="remaining-content"><div class="loading-spinner"></div></div>"#;

pub struct ProgressiveShell;

impl ProgressiveShell {
    /// Split a body at the first footer-like `<div>`.
    ///
    /// Without such a div nothing is above the fold and the whole body is
    /// deferred.
    fn split_fold(body: &str) -> (&str, &str) {
        let fold = html::tags(body, "div").find(|tag| {
            ["class", "id"].iter().any(|attr| {
                tag.attr(attr).is_some_and(|value| {
                    let value = value.trim_start();
                    FOLD_MARKERS.iter().any(|marker| value.starts_with(marker))
                })
            })
        });
        match fold {
            Some(tag) => body.split_at(tag.start),
            None => ("", body),
        }
    }

    /// Move above-the-fold images to `data-src` behind a placeholder.
    fn defer_images(above_fold: &str) -> String {
        html::rewrite_tags(above_fold, "img", |tag| {
            let src = tag.attr("src").filter(|src| !src.is_empty())?;
            let narrow = tag
                .attr("width")
                .and_then(|width| width.trim().trim_end_matches("px").parse::<u32>().ok())
                .is_some_and(|width| width < MIN_DEFERRED_WIDTH);
            if src.starts_with("data:")
                || tag.raw.contains("logo")
                || tag.raw.contains("icon")
                || narrow
            {
                return None;
            }
            let img = html::set_attr(tag.raw, "src", PLACEHOLDER_SRC);
            Some(html::set_attr(&img, "data-src", src))
        })
    }
}

impl Transform for ProgressiveShell {
    fn name(&self) -> &'static str {
        "progressive-shell"
    }

    fn transform(&self, html: String) -> String {
        let (Some(head), Some(body)) = (html::head_inner(&html), html::body_inner(&html)) else {
            return html;
        };
        let first_css = stylesheets(&html).next().map_or("", |(_, href)| href);
        let (above_fold, remaining) = Self::split_fold(body);

        let mut shell = String::with_capacity(html.len() + 8 * 1024);
        shell.push_str("<!DOCTYPE html><html><head>");
        shell.push_str(&embed::style(styles::SHELL_CSS));
        shell.push_str(&SHELL_CRITICAL_CSS_JS.render_script(&CssUrlVars { url: first_css }));
        shell.push_str(&embed::script(SHELL_LOADER_JS));
        shell.push_str(head);
        shell.push_str("</head><body>");
        shell.push_str(&Self::defer_images(above_fold));
        shell.push_str(REMAINING_CONTENT);
        shell.push_str(&PAGE_CONTENT_JS.render_script(&PageContentVars { content: remaining }));
        shell.push_str("</body></html>");
        shell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = concat!(
        r#"<html lang="en"><head><title>Shop</title><link rel="stylesheet" href="/static/styles-m.css"></head>"#,
        r#"<body class="cms-home"><header><img class="logo" src="/media/logo.png"></header>"#,
        r#"<img src="/media/hero.jpg" width="1200"><img src="/media/dot.png" width="20">"#,
        r#"<div class="footer container"><p>footer</p></div>"#,
        "</body></html>",
    );

    #[test]
    fn test_shell_layout() {
        let html = ProgressiveShell.apply(PAGE.into());
        assert!(html.starts_with("<!DOCTYPE html><html><head><style>"));
        assert!(html.contains(r#""/static/styles-m.css""#));
        assert!(html.contains(r#"<title>Shop</title><link rel="stylesheet" href="/static/styles-m.css"></head><body><header>"#));
        assert!(html.contains(&format!("{REMAINING_CONTENT}<script>")));
        assert!(html.ends_with("</script></body></html>"));
    }

    #[test]
    fn test_above_fold_images() {
        let html = ProgressiveShell.apply(PAGE.into());
        assert!(html.contains(r#"<img class="logo" src="/media/logo.png">"#));
        assert!(html.contains(&format!(
            r#"<img src="{PLACEHOLDER_SRC}" width="1200" data-src="/media/hero.jpg">"#
        )));
        assert!(html.contains(r#"<img src="/media/dot.png" width="20">"#));
    }

    #[test]
    fn test_remaining_content_stored_once() {
        let html = ProgressiveShell.apply(PAGE.into());
        assert!(html.contains(r#"window.fullPageContent = "\u003cdiv class=\"footer container\"\u003e"#));
        assert!(!html.contains(r#"<div class="footer container">"#));
        assert_eq!(html.matches("/media/hero.jpg").count(), 1);
    }

    #[test]
    fn test_split_fold() {
        assert_eq!(
            ProgressiveShell::split_fold(r#"<p>a</p><div id="sidebar-main">b</div>"#),
            ("<p>a</p>", r#"<div id="sidebar-main">b</div>"#)
        );
        assert_eq!(ProgressiveShell::split_fold("<p>a</p>"), ("", "<p>a</p>"));
    }
}
