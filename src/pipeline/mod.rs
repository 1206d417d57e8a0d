//! HTML transform pipeline.
//!
//! Runs the performance stages over a rewritten document in a fixed order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ScriptShim -> CspMeta                       │
//! ├──────────────────────┬──────────────────────┤
//! │ progressive loading  │ standard             │
//! │  ProgressiveShell    │  PayloadSplitter     │
//! │                      │  StreamingHints      │
//! │                      │  LazyImages?         │
//! │                      │  NativeLazyLoading?  │
//! │                      │  ScriptDefer?        │
//! │                      │  AnalyticsDefer      │
//! │                      │  CriticalPreload?    │
//! │                      │  TrackingDefer       │
//! │                      │  LayoutShiftFix      │
//! │                      │  AboveFoldPriority   │
//! │                      │  PriorityLoader      │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! `?` marks stages gated by a performance flag.
//!
//! [`TransformPipeline::run_baseline`] adds `CriticalRequests` and
//! `InlineScriptMarker`, which run on every enabled response whatever the
//! performance settings.

pub mod transform;

use crate::config::CdnConfig;
use crate::debug;
use crate::utils::html;

pub use transform::{
    AboveFoldPriority, AnalyticsDefer, CriticalPreload, CriticalRequests, CspMeta,
    InlineScriptMarker, LayoutShiftFix, LazyImages, NativeLazyLoading, PayloadSplitter,
    PriorityLoader, ProgressiveShell, ScriptDefer, ScriptShim, StreamingHints, TrackingDefer,
};

// =============================================================================
// Transform
// =============================================================================

/// One document mutation.
pub trait Transform {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Mutate a document known to have a `<head>` and a `<body>`.
    fn transform(&self, html: String) -> String;

    /// Run the stage, passing documents without a head/body shell through.
    fn apply(&self, html: String) -> String {
        if !html::has_document_shell(&html) {
            debug!("pipeline"; "{}: no <head>/<body>, skipped", self.name());
            return html;
        }
        self.transform(html)
    }
}

/// Chains transforms over one value.
///
/// ```ignore
/// let html = Pipeline::new(html)
///     .pipe(ScriptShim)
///     .pipe_if(config.optimize_images(), LazyImages)
///     .into_inner();
/// ```
#[derive(Debug)]
pub struct Pipeline {
    html: String,
}

impl Pipeline {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    pub fn pipe<T: Transform>(self, stage: T) -> Self {
        debug!("pipeline"; "{}", stage.name());
        Self {
            html: stage.apply(self.html),
        }
    }

    pub fn pipe_if<T: Transform>(self, enabled: bool, stage: T) -> Self {
        if enabled { self.pipe(stage) } else { self }
    }

    pub fn into_inner(self) -> String {
        self.html
    }
}

// =============================================================================
// TransformPipeline
// =============================================================================

/// Stage selection derived from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformPipeline {
    enabled: bool,
    progressive_loading: bool,
    optimize_images: bool,
    lazy_load_images: bool,
    optimize_javascript: bool,
    optimize_critical_path: bool,
}

impl TransformPipeline {
    pub fn from_config(config: &CdnConfig) -> Self {
        Self {
            enabled: config.is_performance_enabled(),
            progressive_loading: config.use_progressive_loading(),
            optimize_images: config.optimize_images(),
            lazy_load_images: config.lazy_load_images(),
            optimize_javascript: config.optimize_javascript(),
            optimize_critical_path: config.optimize_critical_path(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Run every selected stage.
    pub fn run(&self, html: String) -> String {
        if !self.enabled || html.is_empty() {
            return html;
        }

        let pipeline = Pipeline::new(html).pipe(ScriptShim).pipe(CspMeta);

        if self.progressive_loading {
            return pipeline.pipe(ProgressiveShell).into_inner();
        }

        pipeline
            .pipe(PayloadSplitter)
            .pipe(StreamingHints)
            .pipe_if(self.optimize_images, LazyImages)
            .pipe_if(self.lazy_load_images, NativeLazyLoading)
            .pipe_if(self.optimize_javascript, ScriptDefer)
            .pipe(AnalyticsDefer)
            .pipe_if(self.optimize_critical_path, CriticalPreload)
            .pipe(TrackingDefer)
            .pipe(LayoutShiftFix)
            .pipe(AboveFoldPriority)
            .pipe(PriorityLoader)
            .into_inner()
    }

    /// Preload hints and inline-script marking, independent of the
    /// performance flags.
    pub fn run_baseline(&self, html: String) -> String {
        if html.is_empty() {
            return html;
        }
        Pipeline::new(html)
            .pipe(CriticalRequests)
            .pipe(InlineScriptMarker)
            .into_inner()
    }
}
