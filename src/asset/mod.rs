//! Asset bundling.
//!
//! - `merge`: concatenates CSS/JS inputs into cached bundles
//! - `fetch`: HTTP source for remote inputs

mod fetch;
mod merge;

pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use merge::{AssetMerger, MergeError, MergeKind};
