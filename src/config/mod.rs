//! Configuration management for `cdnify.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── general    # [general]
//! │   ├── cdn        # [cdn]
//! │   ├── store      # [store]
//! │   └── performance# [performance]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError
//! │   └── list       # Delimited-text lists
//! ├── policy.rs      # Page cache policy
//! └── mod.rs         # CdnConfig (this file)
//! ```
//!
//! Performance flags are only effective when both `general.enabled` and
//! `performance.enabled` are set, so callers go through the `is_*` accessors
//! instead of reading the raw section fields.

mod policy;
pub mod section;
pub mod types;

pub use policy::{CacheApplication, MIN_PAGE_CACHE_TTL, PageCachePolicy};
pub use section::{CdnSectionConfig, GeneralConfig, PerformanceConfig, StoreConfig};
pub use types::ConfigError;

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::cdn::{CdnTarget, PathClassifier};
use crate::log;

/// Default config file name.
pub const CONFIG_FILE: &str = "cdnify.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing cdnify.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdnConfig {
    /// Path the config was loaded from (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Master switch and debug flag
    #[serde(default)]
    pub general: GeneralConfig,

    /// CDN identity and URL lists
    #[serde(default)]
    pub cdn: CdnSectionConfig,

    /// Origin site
    #[serde(default)]
    pub store: StoreConfig,

    /// Performance flags
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl CdnConfig {
    /// Load configuration from a file.
    ///
    /// Unknown fields are reported and ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and collect the paths of fields serde did not recognize.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("config"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cdn.provider.contains("://") {
            return Err(ConfigError::Validation(format!(
                "cdn.provider must be a host name without scheme, got `{}`",
                self.cdn.provider
            )));
        }

        if let Some(url) = self
            .cdn
            .custom_urls
            .iter()
            .find(|url| url.contains(char::is_whitespace))
        {
            return Err(ConfigError::Validation(format!(
                "cdn.custom_urls entry contains whitespace: `{url}`"
            )));
        }

        if !self.store.admin_path.is_empty() && !self.store.admin_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "store.admin_path must start with `/`, got `{}`",
                self.store.admin_path
            )));
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // derived values
    // ------------------------------------------------------------------------

    /// CDN target built from `[cdn]`; empty when identity is incomplete.
    pub fn cdn_target(&self) -> CdnTarget {
        CdnTarget::from_config(&self.cdn)
    }

    /// Path classifier with configured file types and exclusions merged in.
    pub fn classifier(&self) -> PathClassifier {
        PathClassifier::new(&self.cdn.file_types, &self.cdn.excluded_paths)
    }

    /// Full-page-cache TTL in seconds, never below one hour.
    pub fn page_cache_ttl(&self) -> u64 {
        policy::clamp_ttl(self.performance.page_cache_ttl)
    }

    /// Page cache settings, when full-page-cache enhancement is on.
    pub fn page_cache_policy(&self) -> Option<PageCachePolicy> {
        self.is_full_page_cache_enhanced().then(|| PageCachePolicy {
            application: if self.use_varnish() {
                CacheApplication::Varnish
            } else {
                CacheApplication::BuiltIn
            },
            ttl: self.page_cache_ttl(),
        })
    }

    // ------------------------------------------------------------------------
    // flags
    // ------------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.general.enabled
    }

    pub fn is_debug(&self) -> bool {
        self.general.debug
    }

    /// `general.enabled && performance.enabled`
    pub fn is_performance_enabled(&self) -> bool {
        self.general.enabled && self.performance.enabled
    }

    pub fn optimize_images(&self) -> bool {
        self.is_performance_enabled() && self.performance.optimize_images
    }

    pub fn lazy_load_images(&self) -> bool {
        self.is_performance_enabled() && self.performance.lazy_load_images
    }

    pub fn optimize_javascript(&self) -> bool {
        self.is_performance_enabled() && self.performance.optimize_javascript
    }

    pub fn optimize_critical_path(&self) -> bool {
        self.is_performance_enabled() && self.performance.optimize_critical_path
    }

    pub fn convert_to_webp(&self) -> bool {
        self.is_performance_enabled() && self.performance.convert_to_webp
    }

    pub fn use_progressive_loading(&self) -> bool {
        self.is_performance_enabled() && self.performance.use_progressive_loading
    }

    pub fn is_full_page_cache_enhanced(&self) -> bool {
        self.is_performance_enabled() && self.performance.enhance_full_page_cache
    }

    /// Varnish also requires full-page-cache enhancement.
    pub fn use_varnish(&self) -> bool {
        self.is_full_page_cache_enhanced() && self.performance.use_varnish
    }
}

// ============================================================================
// test helpers
// ============================================================================

/// Parse a test config and assert that every field was recognized.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> CdnConfig {
    let (parsed, ignored) = CdnConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn enabled(extra: &str) -> CdnConfig {
        test_parse_config(&format!("[general]\nenabled = true\n{extra}"))
    }

    #[test]
    fn test_ttl_clamp() {
        let config = test_parse_config("[performance]\npage_cache_ttl = 100");
        assert_eq!(config.page_cache_ttl(), 3600);

        let config = test_parse_config("[performance]\npage_cache_ttl = 999999");
        assert_eq!(config.page_cache_ttl(), 999999);
    }

    #[test]
    fn test_flags_require_both_switches() {
        let config = test_parse_config("[performance]\nenabled = true\noptimize_images = true");
        assert!(!config.optimize_images());

        let config = enabled("[performance]\noptimize_images = true");
        assert!(!config.optimize_images());

        let config = enabled("[performance]\nenabled = true\noptimize_images = true");
        assert!(config.optimize_images());
        assert!(!config.optimize_javascript());
    }

    #[test]
    fn test_varnish_requires_page_cache() {
        let config = enabled("[performance]\nenabled = true\nuse_varnish = true");
        assert!(!config.use_varnish());
        assert!(config.page_cache_policy().is_none());

        let config = enabled(
            "[performance]\nenabled = true\nuse_varnish = true\nenhance_full_page_cache = true\npage_cache_ttl = 10",
        );
        let policy = config.page_cache_policy().unwrap();
        assert_eq!(policy.application, CacheApplication::Varnish);
        assert_eq!(policy.ttl, 3600);
    }

    #[test]
    fn test_builtin_cache_policy() {
        let config = enabled("[performance]\nenabled = true\nenhance_full_page_cache = true");
        let policy = config.page_cache_policy().unwrap();
        assert_eq!(policy.application, CacheApplication::BuiltIn);
        assert_eq!(policy.ttl, 86400);
    }

    #[test]
    fn test_validate_provider_scheme() {
        let err = CdnConfig::from_str("[cdn]\nprovider = \"https://cdn.example\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validate_admin_path() {
        let err = CdnConfig::from_str("[store]\nadmin_path = \"admin\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[general]\nenabled = true\n[cdn]\nusername = \"acme\"\nrepository = \"assets\"\nunknown = 1\n",
        )
        .unwrap();

        let config = CdnConfig::load(&path).unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.config_path, path);
        assert_eq!(
            config.cdn_target().base_url(),
            "https://cdn.jsdelivr.net/gh/acme/assets@main/"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = CdnConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_parse_error() {
        let err = CdnConfig::from_str("[general\nenabled = true").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
