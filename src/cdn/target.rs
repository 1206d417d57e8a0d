//! CDN base URL.

use crate::config::CdnSectionConfig;

/// The CDN origin asset URLs are redirected to.
///
/// Empty unless username, repository and branch are all known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CdnTarget {
    base_url: String,
}

impl CdnTarget {
    /// Build `https://{provider}/gh/{username}/{repository}@{branch}/`.
    pub fn from_config(cdn: &CdnSectionConfig) -> Self {
        let username = cdn.username.trim();
        let repository = cdn.repository.trim();
        if username.is_empty() || repository.is_empty() {
            return Self::default();
        }

        Self {
            base_url: format!(
                "https://{}/gh/{}/{}@{}/",
                cdn.effective_provider(),
                username,
                repository,
                cdn.effective_branch()
            ),
        }
    }

    /// Target with an explicit base URL; a trailing `/` is added when missing.
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Self::default();
        }
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
        }
    }

    /// Base URL with trailing `/`, or `""`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_empty(&self) -> bool {
        self.base_url.is_empty()
    }

    /// CDN URL for a prefix-stripped path.
    pub fn url_for(&self, cdn_path: &str) -> String {
        format!("{}{}", self.base_url, cdn_path.trim_start_matches('/'))
    }

    /// `base_url` without scheme or trailing `/`, e.g. `cdn.jsdelivr.net/gh/u/r@main`.
    pub fn host_path(&self) -> &str {
        let url = self.base_url.trim_end_matches('/');
        url.split_once("://").map_or(url, |(_, rest)| rest)
    }
}
