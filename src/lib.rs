//! cdnify - rewrites storefront HTML responses to serve static assets from a
//! GitHub-backed CDN, with an optional front-end performance pipeline.
//!
//! ```text
//! response ──▶ ResponseProcessor
//!                 ├─ UrlRewriter      (cdn)       asset URLs → CDN URLs
//!                 └─ TransformPipeline (pipeline) head/body/script/image stages
//!
//! on demand:  AssetMerger (asset)   ImageConverter (image)
//! ```

pub mod asset;
pub mod cdn;
pub mod config;
pub mod embed;
pub mod image;
pub mod logger;
pub mod pipeline;
pub mod response;
pub mod utils;

pub use config::CdnConfig;
pub use response::{HtmlResponse, ProcessReport, RequestContext, ResponseProcessor};
