//! Network payload splitting.
//!
//! CDN-hosted scripts and every stylesheet after the first leave the markup
//! and are handed to a loader that fetches JavaScript in 100 KB chunks.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::stylesheets;
use crate::embed::scripts::{LoadFile, PAYLOAD_LOADER_JS, PayloadVars};
use crate::pipeline::Transform;
use crate::utils::html;

/// External script served from a CDN-like host.
static CDN_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<script[^>]*\ssrc=['"]((?:https?:)?//[^/'"]*(?:jsdelivr|cdn|static|_cache)[^/'"]*/[^'"]*)['"][^>]*>\s*</script>"#,
    )
    .unwrap()
});

/// Stylesheets whose URL contains this marker stay in the markup.
const CRITICAL_MARKER: &str = "critical";

pub struct PayloadSplitter;

impl PayloadSplitter {
    /// Remove CDN scripts, returning the remaining document and their URLs.
    fn take_scripts(html: &str, files: &mut Vec<LoadFile>) -> String {
        CDN_SCRIPT_RE
            .replace_all(html, |caps: &Captures<'_>| {
                files.push(LoadFile::js(&caps[1]));
                String::new()
            })
            .into_owned()
    }

    /// Remove secondary stylesheets, keeping the first and any critical one.
    fn take_stylesheets(html: &str, files: &mut Vec<LoadFile>) -> String {
        let removable: Vec<_> = stylesheets(html)
            .skip(1)
            .filter(|(_, href)| !href.contains(CRITICAL_MARKER))
            .map(|(tag, href)| (tag.start, href.to_string()))
            .collect();
        if removable.is_empty() {
            return html.to_string();
        }

        html::rewrite_tags(html, "link", |tag| {
            let (_, href) = removable.iter().find(|(start, _)| *start == tag.start)?;
            files.push(LoadFile::css(href.as_str()));
            Some(String::new())
        })
    }
}

impl Transform for PayloadSplitter {
    fn name(&self) -> &'static str {
        "payload-splitter"
    }

    fn transform(&self, html: String) -> String {
        let mut files = Vec::new();
        let html = Self::take_scripts(&html, &mut files);
        let html = Self::take_stylesheets(&html, &mut files);
        if files.is_empty() {
            return html;
        }

        let loader = PAYLOAD_LOADER_JS.render_script(&PayloadVars { files: &files });
        html::insert_before_head_close(&html, &loader)
    }
}
