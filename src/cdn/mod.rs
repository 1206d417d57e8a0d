//! CDN URL rewriting.
//!
//! # Module Structure
//!
//! ```text
//! cdn/
//! ├── target.rs    # CdnTarget: base URL from [cdn]
//! ├── classify.rs  # PathClassifier: is a path CDN-eligible?
//! ├── cache.rs     # ReplacementCache: per-response Replaced/Skipped map
//! └── rewrite/     # UrlRewriter: the rewrite passes
//! ```

mod cache;
mod classify;
mod rewrite;
mod target;

pub use cache::{CacheState, ReplacementCache};
pub use classify::{
    AssetKind, AssetReference, CRITICAL_FILES, Classification, DEFER_CANDIDATES, PathClassifier,
    SAFE_EXTENSIONS, SkipReason, is_defer_candidate,
};
pub use rewrite::{RewriteError, RewriteOptions, RewriteStats, Rewritten, TTL_QUERY, UrlRewriter};
pub use target::CdnTarget;
