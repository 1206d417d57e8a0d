//! `[cdn]` section configuration.
//!
//! CDN identity and URL selection.
//!
//! # Example
//!
//! ```toml
//! [cdn]
//! username = "acme"              # Repository owner
//! repository = "storefront"      # Repository holding the static tree
//! branch = "main"                # Defaults to "main" when empty
//! provider = "cdn.jsdelivr.net"  # CDN host serving /gh/{user}/{repo}@{branch}/
//! file_types = "css,js"          # Extra CDN-eligible extensions
//! excluded_paths = """
//! mage/cookies.js
//! """
//! custom_urls = """
//! /static/frontend/Acme/theme/en_US/css/styles-m.css
//! /static/frontend/Acme/theme/en_US/js/theme.js
//! """
//! ```

use serde::Deserialize;

use crate::config::types::list;

/// Default CDN host.
pub const DEFAULT_PROVIDER: &str = "cdn.jsdelivr.net";

/// Default repository branch.
pub const DEFAULT_BRANCH: &str = "main";

/// CDN identity and URL lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CdnSectionConfig {
    /// Repository owner.
    pub username: String,

    /// Repository name.
    pub repository: String,

    /// Branch or tag; empty means `main`.
    pub branch: String,

    /// Access token. Not sent to the CDN; kept for tooling that syncs the repository.
    pub token: String,

    /// CDN host.
    pub provider: String,

    /// Extensions eligible for the CDN, on top of the built-in safe set.
    #[serde(deserialize_with = "list::comma_list")]
    pub file_types: Vec<String>,

    /// Path substrings never sent to the CDN, on top of the built-in critical set.
    #[serde(deserialize_with = "list::line_list")]
    pub excluded_paths: Vec<String>,

    /// URLs to rewrite, in load order.
    #[serde(deserialize_with = "list::line_list")]
    pub custom_urls: Vec<String>,
}

impl Default for CdnSectionConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            repository: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            token: String::new(),
            provider: DEFAULT_PROVIDER.to_string(),
            file_types: vec!["css".to_string(), "js".to_string()],
            excluded_paths: Vec::new(),
            custom_urls: Vec::new(),
        }
    }
}

impl CdnSectionConfig {
    /// Branch with the `main` fallback applied.
    pub fn effective_branch(&self) -> &str {
        match self.branch.trim() {
            "" => DEFAULT_BRANCH,
            branch => branch,
        }
    }

    /// Provider host with the default fallback applied.
    pub fn effective_provider(&self) -> &str {
        match self.provider.trim().trim_end_matches('/') {
            "" => DEFAULT_PROVIDER,
            provider => provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_cdn_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.cdn.branch, "main");
        assert_eq!(config.cdn.provider, "cdn.jsdelivr.net");
        assert_eq!(config.cdn.file_types, vec!["css", "js"]);
        assert!(config.cdn.custom_urls.is_empty());
    }

    #[test]
    fn test_cdn_lists_from_text() {
        let config = test_parse_config(
            "[cdn]\nfile_types = \"css, js, woff2\"\ncustom_urls = \"/static/b.js\\r\\n/static/a.css\\n\"",
        );
        assert_eq!(config.cdn.file_types, vec!["css", "js", "woff2"]);
        assert_eq!(config.cdn.custom_urls, vec!["/static/b.js", "/static/a.css"]);
    }

    #[test]
    fn test_cdn_lists_from_arrays() {
        let config = test_parse_config(
            "[cdn]\nexcluded_paths = [\" mage/cookies.js \", \"\"]\ncustom_urls = [\"/static/a.css\"]",
        );
        assert_eq!(config.cdn.excluded_paths, vec!["mage/cookies.js"]);
        assert_eq!(config.cdn.custom_urls, vec!["/static/a.css"]);
    }

    #[test]
    fn test_empty_branch_falls_back() {
        let config = test_parse_config("[cdn]\nbranch = \"  \"");
        assert_eq!(config.cdn.effective_branch(), "main");
    }
}
