//! `[performance]` section configuration.
//!
//! Every flag only takes effect when both `general.enabled` and
//! `performance.enabled` are set. Use the accessors on `CdnConfig`.
//!
//! # Example
//!
//! ```toml
//! [performance]
//! enabled = true
//! optimize_images = true          # LQIP lazy loading
//! lazy_load_images = false        # Native loading="lazy" only
//! optimize_javascript = true      # defer non-critical scripts
//! optimize_critical_path = true   # <link rel="preload"> for critical CSS/JS
//! convert_to_webp = true          # <picture> with WebP sources
//! use_progressive_loading = false # Replace the page with a progressive shell
//! enhance_full_page_cache = true
//! use_varnish = false
//! page_cache_ttl = 86400          # Seconds, at least 3600
//! ```

use serde::Deserialize;

/// Performance feature flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub enabled: bool,
    pub optimize_images: bool,
    pub lazy_load_images: bool,
    pub optimize_javascript: bool,
    pub optimize_critical_path: bool,
    pub convert_to_webp: bool,
    pub use_progressive_loading: bool,
    pub enhance_full_page_cache: bool,
    pub use_varnish: bool,
    /// Raw TTL; see `CdnConfig::page_cache_ttl` for the clamped value.
    pub page_cache_ttl: i64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            optimize_images: false,
            lazy_load_images: false,
            optimize_javascript: false,
            optimize_critical_path: false,
            convert_to_webp: false,
            use_progressive_loading: false,
            enhance_full_page_cache: false,
            use_varnish: false,
            page_cache_ttl: 86400,
        }
    }
}
