//! Configuration section definitions.
//!
//! Each module corresponds to a section in `cdnify.toml`:
//!
//! | Module        | TOML Section    | Purpose                                |
//! |---------------|-----------------|----------------------------------------|
//! | `general`     | `[general]`     | Master switch and debug logging        |
//! | `cdn`         | `[cdn]`         | CDN identity, file types, URL lists    |
//! | `store`       | `[store]`       | Origin base URLs and document root     |
//! | `performance` | `[performance]` | Performance transform flags, cache TTL |

mod cdn;
mod general;
mod performance;
mod store;

pub use cdn::{CdnSectionConfig, DEFAULT_BRANCH, DEFAULT_PROVIDER};
pub use general::GeneralConfig;
pub use performance::PerformanceConfig;
pub use store::StoreConfig;
