//! Rewriting of static and media URLs to the CDN.
//!
//! # Passes
//!
//! ```text
//! bulk        href/src attributes pointing at .js/.css, one replace_all
//! custom      configured custom URLs, in declared order
//! fallback    any other quoted .js/.css literal
//! config      image URLs inside `var config = {...};` objects
//! webp        <picture> wrappers for CDN images (optional)
//! ttl         long-lived cache query on CDN assets
//! ```
//!
//! Every pass shares one [`ReplacementCache`], so each URL is classified and
//! substituted at most once per document. Running the rewriter on its own
//! output changes nothing.

mod patterns;
mod ttl;
mod webp;

use regex::{Captures, Regex};
use std::sync::LazyLock;
use thiserror::Error;

use self::patterns::{UrlSubstitution, needs_defer};
use super::{CdnTarget, Classification, PathClassifier, ReplacementCache, SkipReason};
use crate::config::CdnConfig;
use crate::{debug, log, warn};

/// Query appended to CDN assets.
pub const TTL_QUERY: &str = "ttl=31536000";

/// `href`/`src` attributes referencing site-relative scripts and stylesheets.
static BULK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:href|src)=['"](/[^"']+\.(?:js|css)(?:\?[^'"]*)?)['"]"#).unwrap()
});

/// Any quoted site-relative script or stylesheet.
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"](/[^"']+\.(?:js|css)(?:\?[^'"]*)?)['"]"#).unwrap());

/// `var config = {...};` style object literals.
static CONFIG_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+(?:config|gallery)(?:Data)?\s*=\s*(\{.*?\});").unwrap()
});

/// Image values inside a config object.
static CONFIG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:img|image|thumbnail|full|large)"\s*:\s*"([^"]+\.(?:jpg|jpeg|png|gif))""#)
        .unwrap()
});

/// Errors raised while rewriting a single URL.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid url `{0}`")]
    InvalidUrl(String),

    #[error("failed to build pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Optional passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Wrap CDN images in `<picture>` elements with WebP sources.
    pub webp_pictures: bool,
}

/// What a rewrite did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Number of substitutions across all passes.
    pub replacements: usize,
    /// `(url, cdn_url)` in the order URLs were rewritten.
    pub replaced: Vec<(String, String)>,
    /// URLs whose processing failed.
    pub failed: Vec<String>,
}

/// Rewritten document plus statistics.
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub html: String,
    pub stats: RewriteStats,
}

/// Result of substituting one URL.
struct Substituted {
    html: String,
    count: usize,
    path: String,
    cdn_url: String,
}

/// Rewrites eligible asset URLs in an HTML document to the CDN.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    target: CdnTarget,
    classifier: PathClassifier,
    base_url: String,
    secure_base_url: String,
    options: RewriteOptions,
}

impl UrlRewriter {
    /// Create a rewriter. Trailing `/` is trimmed from the base URLs.
    pub fn new(
        target: CdnTarget,
        classifier: PathClassifier,
        base_url: &str,
        secure_base_url: &str,
    ) -> Self {
        Self {
            target,
            classifier,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            secure_base_url: secure_base_url.trim().trim_end_matches('/').to_string(),
            options: RewriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn from_config(config: &CdnConfig) -> Self {
        Self::new(
            config.cdn_target(),
            config.classifier(),
            config.store.base_url_trimmed(),
            config.store.secure_base_url_trimmed(),
        )
        .with_options(RewriteOptions {
            webp_pictures: config.convert_to_webp(),
        })
    }

    pub fn target(&self) -> &CdnTarget {
        &self.target
    }

    /// Rewrite with a fresh cache.
    pub fn rewrite(&self, html: String, candidates: &[String]) -> Rewritten {
        self.rewrite_with(html, candidates, &mut ReplacementCache::new())
    }

    /// Rewrite using an explicit cache.
    pub fn rewrite_with(
        &self,
        html: String,
        candidates: &[String],
        cache: &mut ReplacementCache,
    ) -> Rewritten {
        let mut stats = RewriteStats::default();
        if self.target.is_empty() {
            warn!("rewrite"; "CDN base URL is empty, leaving document unchanged");
            return Rewritten { html, stats };
        }

        let html = self.bulk_pass(html, cache, &mut stats);
        let html = self.custom_pass(html, candidates, cache, &mut stats);
        let html = self.fallback_pass(html, cache, &mut stats);
        let html = self.config_object_pass(html, cache, &mut stats);
        let html = if self.options.webp_pictures {
            webp::enhance_images(html, |url| self.is_cdn_url(url))
        } else {
            html
        };
        let html = ttl::add_cache_ttl(html, |url| self.is_cdn_url(url));

        debug!(
            "rewrite";
            "{} replacements, {} failed",
            stats.replacements,
            stats.failed.len()
        );
        Rewritten { html, stats }
    }

    /// True for URLs served from this rewriter's CDN target.
    ///
    /// The scheme is optional, so protocol-relative URLs match too.
    pub fn is_cdn_url(&self, url: &str) -> bool {
        let host_path = self.target.host_path();
        if host_path.is_empty() {
            return false;
        }
        let rest = url
            .strip_prefix("https:")
            .or_else(|| url.strip_prefix("http:"))
            .unwrap_or(url);
        rest.strip_prefix("//")
            .and_then(|rest| rest.strip_prefix(host_path))
            .is_some_and(|rest| rest.starts_with('/'))
    }

    // ------------------------------------------------------------------------
    // passes
    // ------------------------------------------------------------------------

    /// Rewrite every script/stylesheet attribute in one positional pass, then
    /// sweep the remaining contexts of each rewritten URL.
    fn bulk_pass(
        &self,
        html: String,
        cache: &mut ReplacementCache,
        stats: &mut RewriteStats,
    ) -> String {
        let mut eligible: Vec<(String, String, String)> = Vec::new();
        for caps in BULK_RE.captures_iter(&html) {
            let url = &caps[1];
            if eligible.iter().any(|(seen, ..)| seen == url) {
                continue;
            }
            match self.classifier.classify(url) {
                Classification::Eligible(asset) => {
                    if cache.contains(&asset.normalized_path) {
                        continue;
                    }
                    let cdn_url = self.target.url_for(asset.cdn_path());
                    eligible.push((url.to_string(), asset.normalized_path, cdn_url));
                }
                Classification::Skipped { normalized_path, reason } => {
                    if reason != SkipReason::Empty {
                        debug!("rewrite"; "skipping {} ({})", url, reason.as_str());
                        cache.mark_skipped(&normalized_path);
                    }
                }
            }
        }
        if eligible.is_empty() {
            return html;
        }

        let mut count = 0;
        let rewritten = BULK_RE.replace_all(&html, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let (Some(m), Some(url)) = (caps.get(0), caps.get(1)) else {
                return whole.to_string();
            };
            let Some((_, _, cdn_url)) = eligible.iter().find(|(seen, ..)| seen == url.as_str())
            else {
                return whole.to_string();
            };

            count += 1;
            let mut out = format!(
                "{}{}{}",
                &whole[..url.start() - m.start()],
                cdn_url,
                &whole[url.end() - m.start()..]
            );
            if is_deferrable(url.as_str()) && needs_defer(&html, m.start(), m.end()) {
                out.push_str(" defer");
            }
            out
        });
        let mut html = rewritten.into_owned();
        stats.replacements += count;

        for (url, path, cdn_url) in eligible {
            let sweep = UrlSubstitution {
                path: &url,
                cdn_url: &cdn_url,
                base_url: &self.base_url,
                secure_base_url: &self.secure_base_url,
            };
            match sweep.apply(html.clone()) {
                Ok((swept, found)) => {
                    html = swept;
                    stats.replacements += found;
                }
                Err(err) => {
                    log!("rewrite"; "failed to process {}: {}", url, err);
                    stats.failed.push(url.clone());
                }
            }
            cache.mark_replaced(&path);
            stats.replaced.push((url, cdn_url));
        }
        html
    }

    fn custom_pass(
        &self,
        html: String,
        candidates: &[String],
        cache: &mut ReplacementCache,
        stats: &mut RewriteStats,
    ) -> String {
        candidates.iter().fold(html, |html, url| {
            let replaced = PathClassifier::normalize(url).is_some_and(|path| cache.is_replaced(&path));
            if replaced {
                html
            } else {
                self.process_url(html, url, cache, stats)
            }
        })
    }

    fn fallback_pass(
        &self,
        html: String,
        cache: &mut ReplacementCache,
        stats: &mut RewriteStats,
    ) -> String {
        let mut urls: Vec<String> = Vec::new();
        for caps in QUOTED_RE.captures_iter(&html) {
            let url = &caps[1];
            if !urls.iter().any(|seen| seen == url) {
                urls.push(url.to_string());
            }
        }

        urls.into_iter().fold(html, |html, url| {
            let cached = PathClassifier::normalize(&url).is_some_and(|path| cache.contains(&path));
            if cached {
                html
            } else {
                self.process_url(html, &url, cache, stats)
            }
        })
    }

    fn config_object_pass(
        &self,
        html: String,
        cache: &mut ReplacementCache,
        stats: &mut RewriteStats,
    ) -> String {
        let urls: Vec<String> = CONFIG_OBJECT_RE
            .captures_iter(&html)
            .flat_map(|object| {
                CONFIG_IMAGE_RE
                    .captures_iter(&object[1])
                    .map(|image| image[1].to_string())
                    .collect::<Vec<_>>()
            })
            .collect();

        urls.into_iter()
            .fold(html, |html, url| self.process_url(html, &url, cache, stats))
    }

    // ------------------------------------------------------------------------
    // single URL
    // ------------------------------------------------------------------------

    /// Rewrite every occurrence of one URL. Failures are logged and leave the
    /// document unchanged.
    fn process_url(
        &self,
        html: String,
        url: &str,
        cache: &mut ReplacementCache,
        stats: &mut RewriteStats,
    ) -> String {
        match self.try_process_url(&html, url, cache) {
            Ok(Some(done)) => {
                cache.mark_replaced(&done.path);
                stats.replacements += done.count;
                stats.replaced.push((url.to_string(), done.cdn_url));
                done.html
            }
            Ok(None) => html,
            Err(err) => {
                log!("rewrite"; "failed to process {}: {}", url, err);
                stats.failed.push(url.to_string());
                html
            }
        }
    }

    fn try_process_url(
        &self,
        html: &str,
        url: &str,
        cache: &mut ReplacementCache,
    ) -> Result<Option<Substituted>, RewriteError> {
        let asset = match self.classifier.classify(url) {
            Classification::Eligible(asset) => asset,
            Classification::Skipped { reason: SkipReason::Empty, .. } => return Ok(None),
            Classification::Skipped { reason: SkipReason::InvalidUrl, .. } => {
                return Err(RewriteError::InvalidUrl(url.to_string()));
            }
            Classification::Skipped { normalized_path, reason } => {
                debug!("rewrite"; "skipping {} ({})", url, reason.as_str());
                cache.mark_skipped(&normalized_path);
                return Ok(None);
            }
        };
        if cache.contains(&asset.normalized_path) {
            return Ok(None);
        }

        let cdn_url = self.target.url_for(asset.cdn_path());
        let (rewritten, count) = UrlSubstitution {
            path: &asset.normalized_path,
            cdn_url: &cdn_url,
            base_url: &self.base_url,
            secure_base_url: &self.secure_base_url,
        }
        .apply(html.to_string())?;

        if rewritten == html {
            cache.mark_skipped(&asset.normalized_path);
            return Ok(None);
        }
        Ok(Some(Substituted {
            html: rewritten,
            count,
            path: asset.normalized_path,
            cdn_url,
        }))
    }
}

/// `.js` URL matching a defer candidate.
fn is_deferrable(url: &str) -> bool {
    has_extension(url, &["js"]) && super::is_defer_candidate(url)
}

/// Case-insensitive extension check with query and fragment ignored.
fn has_extension(url: &str, extensions: &[&str]) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        extensions.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cdn.test/gh/acme/assets@main/";

    fn rewriter() -> UrlRewriter {
        UrlRewriter::new(
            CdnTarget::with_base_url(BASE),
            PathClassifier::default(),
            "http://shop.test/",
            "https://shop.test/",
        )
    }

    fn rewrite(html: &str, candidates: &[&str]) -> Rewritten {
        let candidates: Vec<String> = candidates.iter().map(|url| url.to_string()).collect();
        rewriter().rewrite(html.to_string(), &candidates)
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("/a/b.JS?v=1", &["js"]));
        assert!(has_extension("/a/b.css#x", &["css"]));
        assert!(!has_extension("/a/b.json", &["js"]));
        assert!(!has_extension("/a/b", &["js"]));
    }

    #[test]
    fn test_is_cdn_url() {
        let rewriter = rewriter();
        assert!(rewriter.is_cdn_url("https://cdn.test/gh/acme/assets@main/frontend/a.js"));
        assert!(rewriter.is_cdn_url("//cdn.test/gh/acme/assets@main/a.css"));
        assert!(rewriter.is_cdn_url("http://cdn.test/gh/acme/assets@main/a.css"));
        assert!(!rewriter.is_cdn_url("https://cdn.test/gh/acme/other@main/a.css"));
        assert!(!rewriter.is_cdn_url("/static/a.css"));
    }

    #[test]
    fn test_bulk_pass_rewrites_every_occurrence() {
        let out = rewrite(
            concat!(
                r#"<link rel="stylesheet" href="/static/frontend/a.css">"#,
                r#"<link rel="stylesheet" href="/static/frontend/a.css">"#,
                r#"<script src="/static/frontend/b.js"></script>"#,
            ),
            &[],
        );
        assert_eq!(
            out.html,
            concat!(
                r#"<link rel="stylesheet" href="https://cdn.test/gh/acme/assets@main/frontend/a.css?ttl=31536000">"#,
                r#"<link rel="stylesheet" href="https://cdn.test/gh/acme/assets@main/frontend/a.css?ttl=31536000">"#,
                r#"<script src="https://cdn.test/gh/acme/assets@main/frontend/b.js?ttl=31536000"></script>"#,
            )
        );
        assert_eq!(out.stats.replacements, 3);
        assert_eq!(out.stats.replaced.len(), 2);
        assert_eq!(out.stats.replaced[0].0, "/static/frontend/a.css");
    }

    #[test]
    fn test_bulk_pass_sweeps_other_contexts() {
        let out = rewrite(
            concat!(
                r#"<link rel="stylesheet" href="/static/frontend/a.css">"#,
                r#"<script>var css = '/static/frontend/a.css';</script>"#,
            ),
            &[],
        );
        assert!(!out.html.contains("'/static/frontend/a.css'"));
        assert!(out.html.contains("'https://cdn.test/gh/acme/assets@main/frontend/a.css'"));
    }

    #[test]
    fn test_critical_files_stay() {
        let html = r#"<script src="/static/frontend/requirejs/require.js"></script><script src="/static/frontend/jquery.min.js"></script>"#;
        let out = rewrite(html, &["/static/frontend/jquery.min.js"]);
        assert_eq!(out.html, html);
        assert_eq!(out.stats.replacements, 0);
    }

    #[test]
    fn test_non_static_paths_stay() {
        let html = r#"<script src="/js/app.js"></script>"#;
        assert_eq!(rewrite(html, &[]).html, html);
    }

    #[test]
    fn test_defer_added_once() {
        let out = rewrite(
            r#"<script src="/static/frontend/Magento_Review/js/review.js"></script><script async src="/static/frontend/js/theme.js"></script>"#,
            &[],
        );
        assert_eq!(out.html.matches(" defer").count(), 1);
        assert!(out.html.contains(r#"review.js?ttl=31536000" defer>"#));
    }

    #[test]
    fn test_custom_urls_processed_once() {
        let out = rewrite(
            r#"<div style="background: url(/media/wysiwyg/bg.png)"></div><img src="/media/wysiwyg/bg.png">"#,
            &["/media/wysiwyg/bg.png", "/media/wysiwyg/bg.png"],
        );
        assert_eq!(out.stats.replaced.len(), 1);
        assert_eq!(out.stats.replacements, 2);
        assert!(out.html.contains("url(https://cdn.test/gh/acme/assets@main/wysiwyg/bg.png)"));
        assert!(out.html.contains(r#"<img src="https://cdn.test/gh/acme/assets@main/wysiwyg/bg.png?ttl=31536000">"#));
    }

    #[test]
    fn test_custom_absolute_url() {
        let out = rewrite(
            r#"<img src="https://shop.test/media/logo.png">"#,
            &["https://shop.test/media/logo.png"],
        );
        assert!(out.html.contains("https://cdn.test/gh/acme/assets@main/logo.png"));
        assert!(!out.html.contains("shop.test"));
        assert_eq!(out.stats.replaced.len(), 1);
        assert_eq!(out.stats.replacements, 0);
    }

    #[test]
    fn test_fallback_quoted_literal() {
        let out = rewrite(r#"<script>require(["/static/frontend/x.js"]);</script>"#, &[]);
        assert!(out.html.contains(r#"["https://cdn.test/gh/acme/assets@main/frontend/x.js"]"#));
    }

    #[test]
    fn test_config_object_images() {
        let out = rewrite(
            r#"<script>var galleryData = {"img": "/media/catalog/p/a.jpg", "full": "/media/catalog/p/a.jpg"};</script>"#,
            &[],
        );
        assert_eq!(out.html.matches("https://cdn.test/gh/acme/assets@main/catalog/p/a.jpg").count(), 2);
        assert_eq!(out.stats.replaced.len(), 1);
    }

    #[test]
    fn test_invalid_custom_url_is_recorded() {
        let html = r#"<img src="/media/a.png">"#;
        let out = rewrite(html, &["https://[::1/media/a.png"]);
        assert_eq!(out.stats.failed, vec!["https://[::1/media/a.png"]);
        assert_eq!(out.html, html);
    }

    #[test]
    fn test_empty_target_is_a_no_op() {
        let rewriter = UrlRewriter::new(CdnTarget::default(), PathClassifier::default(), "", "");
        let html = r#"<script src="/static/a.js"></script>"#;
        let out = rewriter.rewrite(html.to_string(), &[]);
        assert_eq!(out.html, html);
        assert_eq!(out.stats, RewriteStats::default());
    }

    #[test]
    fn test_shared_cache_skips_known_urls() {
        let rewriter = rewriter();
        let mut cache = ReplacementCache::new();
        cache.mark_skipped("/static/frontend/a.css");
        let html = r#"<link href="/static/frontend/a.css">"#;
        let out = rewriter.rewrite_with(html.to_string(), &[], &mut cache);
        assert_eq!(out.html, html);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = concat!(
            "<html><head>",
            r#"<link rel="stylesheet" href="/static/frontend/a.css?v=3">"#,
            r#"<script src="/static/frontend/js/theme.js"></script>"#,
            "</head><body>",
            r#"<img src="/media/banner.jpg"><img src="/media/p.png">"#,
            r#"<script>var configData = {"image": "/media/p.png"};</script>"#,
            "</body></html>",
        );
        let rewriter = rewriter().with_options(RewriteOptions { webp_pictures: true });
        let candidates = vec!["/media/banner.jpg".to_string(), "/media/p.png".to_string()];

        let once = rewriter.rewrite(html.to_string(), &candidates).html;
        let twice = rewriter.rewrite(once.clone(), &candidates).html;
        assert_eq!(once, twice);
        assert!(once.contains("a.css?v=3&ttl=31536000"));
        assert!(once.contains(r#"<source srcset="https://cdn.test/gh/acme/assets@main/p.webp?ttl=31536000""#));
        assert_eq!(once.matches(" defer").count(), 1);
    }
}
