//! Per-response entry point.
//!
//! [`ResponseProcessor`] gates a response, rewrites its asset URLs to the
//! CDN, then runs the performance pipeline and the baseline stages over the
//! result.

use serde_json::json;

use crate::cdn::{RewriteStats, UrlRewriter};
use crate::config::CdnConfig;
use crate::pipeline::TransformPipeline;
use crate::{debug, info, warn};

/// An HTML response body that can be replaced in place.
pub trait HtmlResponse {
    fn html(&self) -> &str;
    fn set_html(&mut self, html: String);
}

impl HtmlResponse for String {
    fn html(&self) -> &str {
        self
    }

    fn set_html(&mut self, html: String) {
        *self = html;
    }
}

/// Application area a request was routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Area {
    #[default]
    Frontend,
    Admin,
}

/// What the processor knows about the request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub uri: String,
    pub area: Area,
}

impl RequestContext {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), area: Area::Frontend }
    }

    pub fn admin(mut self) -> Self {
        self.area = Area::Admin;
        self
    }

    /// Admin area, or a URI under `admin_path`.
    fn is_admin(&self, admin_path: &str) -> bool {
        self.area == Area::Admin || (!admin_path.is_empty() && self.uri.contains(admin_path))
    }
}

/// Outcome of [`ResponseProcessor::process`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Set when the URL rewrite ran.
    pub rewrite: Option<RewriteStats>,
    pub pipeline_ran: bool,
}

impl ProcessReport {
    pub fn replacements(&self) -> usize {
        self.rewrite.as_ref().map_or(0, |stats| stats.replacements)
    }
}

/// Rewrites and optimizes HTML responses according to a [`CdnConfig`].
#[derive(Debug, Clone)]
pub struct ResponseProcessor {
    enabled: bool,
    custom_urls: Vec<String>,
    admin_path: String,
    rewriter: UrlRewriter,
    pipeline: TransformPipeline,
}

impl ResponseProcessor {
    pub fn new(config: &CdnConfig) -> Self {
        Self {
            enabled: config.is_enabled(),
            custom_urls: config.cdn.custom_urls.clone(),
            admin_path: config.store.admin_path.clone(),
            rewriter: UrlRewriter::from_config(config),
            pipeline: TransformPipeline::from_config(config),
        }
    }

    pub fn process(&self, ctx: &RequestContext, response: &mut impl HtmlResponse) -> ProcessReport {
        let mut report = ProcessReport::default();
        if !self.enabled {
            return report;
        }
        if ctx.is_admin(&self.admin_path) {
            debug!("response"; "admin request {}, skipping", ctx.uri);
            return report;
        }

        if let Some(stats) = self.rewrite(response) {
            report.rewrite = Some(stats);
        }

        if self.pipeline.is_enabled() && !response.html().is_empty() {
            let html = self.pipeline.run(response.html().to_string());
            response.set_html(html);
            report.pipeline_ran = true;
        }

        if !response.html().is_empty() {
            let html = self.pipeline.run_baseline(response.html().to_string());
            response.set_html(html);
        }
        report
    }

    /// URL rewrite, when every gate passes.
    fn rewrite(&self, response: &mut impl HtmlResponse) -> Option<RewriteStats> {
        if self.custom_urls.is_empty() {
            debug!("response"; "No custom URLs defined. Skipping replacement.");
            return None;
        }
        if response.html().is_empty() {
            return None;
        }
        if self.rewriter.target().is_empty() {
            warn!("response"; "CDN base URL is empty");
            return None;
        }

        let rewritten = self
            .rewriter
            .rewrite(response.html().to_string(), &self.custom_urls);
        response.set_html(rewritten.html);

        let stats = rewritten.stats;
        info!("response"; "Replaced {} URLs with CDN URLs", stats.replacements);
        debug!("response"; "{}", summary(&stats));
        Some(stats)
    }
}

/// JSON of replaced and failed URLs.
fn summary(stats: &RewriteStats) -> serde_json::Value {
    let replaced: Vec<_> = stats
        .replaced
        .iter()
        .map(|(url, cdn_url)| json!({ "url": url, "cdn_url": cdn_url }))
        .collect();
    json!({ "replaced": replaced, "failed": stats.failed })
}
