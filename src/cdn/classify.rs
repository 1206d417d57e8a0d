//! CDN eligibility of asset paths.
//!
//! A path is eligible when it lives under `/static/` or `/media/`, carries a
//! safe extension, and contains none of the critical-file substrings.
//! Merged and minified cache bundles skip the extension check.

use rustc_hash::FxHashSet;
use url::Url;

/// Path substrings that must stay same-origin and synchronous.
pub const CRITICAL_FILES: &[&str] = &[
    "requirejs/require.js",
    "requirejs-config.js",
    "mage/requirejs/mixins.js",
    "mage/polyfill.js",
    "mage/bootstrap.js",
    "jquery.js",
    "jquery.min.js",
    "jquery-migrate.js",
    "jquery-migrate.min.js",
    "jquery-ui.js",
    "jquery-ui.min.js",
    "require.js",
    "underscore.js",
    "knockout.js",
    "mage/translate.js",
    "mage/common.js",
    "mage/mage.js",
    "Magento_Ui/js/core/app.js",
    "Magento_Customer/js/customer-data.js",
    "Magento_Customer/js/section-config.js",
    "Magento_Checkout/js/sidebar.js",
];

/// Extensions that may be served from the CDN.
pub const SAFE_EXTENSIONS: &[&str] = &[
    "css", "png", "jpg", "jpeg", "gif", "svg", "webp", "js", "woff", "woff2", "ttf", "eot",
];

/// Script paths (case-insensitive substrings) that may load with `defer`.
pub const DEFER_CANDIDATES: &[&str] = &[
    "js-translation.json",
    "Magento_Ui/js/grid/",
    "Magento_Ui/js/form/",
    "js/theme",
    "Magento_Swatches/js/",
    "Magento_Catalog/js/price-box.js",
    "Magento_Catalog/js/catalog-add-to-cart",
    "Magento_Review/js/",
    "Magento_Theme/js/view/breadcrumbs",
    "Magento_Theme/js/responsive",
    "Magento_Search/js/form-mini",
];

/// Bundle directories that are eligible regardless of extension.
const BUNDLE_DIRS: &[&str] = &["/_cache/merged/", "/_cache/minified/"];

/// Check whether a script URL may be deferred.
pub fn is_defer_candidate(url: &str) -> bool {
    DEFER_CANDIDATES
        .iter()
        .any(|candidate| crate::utils::html::contains_ci(url, candidate))
}

// ============================================================================
// Types
// ============================================================================

/// Which public tree an asset lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Static,
    Media,
}

impl AssetKind {
    /// Leading path segment including both slashes.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Static => "/static/",
            Self::Media => "/media/",
        }
    }

    fn of(path: &str) -> Option<Self> {
        [Self::Static, Self::Media]
            .into_iter()
            .find(|kind| path.starts_with(kind.prefix()))
    }
}

/// An eligible asset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// URL as found in the document.
    pub raw_url: String,
    /// Site-relative path with leading `/`, query kept.
    pub normalized_path: String,
    pub kind: AssetKind,
    /// Lowercase extension without the dot.
    pub extension: String,
}

impl AssetReference {
    /// Path relative to the CDN root (`/static/` or `/media/` stripped).
    pub fn cdn_path(&self) -> &str {
        &self.normalized_path[self.kind.prefix().len()..]
    }

    pub fn is_script(&self) -> bool {
        self.extension == "js"
    }
}

/// Why a URL stays on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Blank input.
    Empty,
    /// Absolute URL that could not be parsed.
    InvalidUrl,
    NotStaticOrMedia,
    Critical,
    UnsafeExtension,
    /// Nothing left once the prefix is stripped.
    EmptyPath,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::InvalidUrl => "invalid url",
            Self::NotStaticOrMedia => "not static or media",
            Self::Critical => "critical file",
            Self::UnsafeExtension => "unsafe extension",
            Self::EmptyPath => "empty path",
        }
    }
}

/// Result of [`PathClassifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Eligible(AssetReference),
    Skipped {
        normalized_path: String,
        reason: SkipReason,
    },
}

impl Classification {
    pub fn normalized_path(&self) -> &str {
        match self {
            Self::Eligible(asset) => &asset.normalized_path,
            Self::Skipped { normalized_path, .. } => normalized_path,
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Decides whether a path may be served from the CDN.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    extensions: FxHashSet<String>,
    critical: Vec<String>,
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

impl PathClassifier {
    /// Built-in sets extended with configured file types and exclusions.
    pub fn new(file_types: &[String], excluded_paths: &[String]) -> Self {
        let extensions = SAFE_EXTENSIONS
            .iter()
            .map(|ext| (*ext).to_string())
            .chain(
                file_types
                    .iter()
                    .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty()),
            )
            .collect();

        let critical = CRITICAL_FILES
            .iter()
            .map(|path| (*path).to_string())
            .chain(
                excluded_paths
                    .iter()
                    .map(|path| path.trim().to_string())
                    .filter(|path| !path.is_empty()),
            )
            .collect();

        Self { extensions, critical }
    }

    /// Site-relative form of `url`: scheme and host dropped, leading `/` ensured.
    ///
    /// Returns `None` for absolute URLs that fail to parse.
    pub fn normalize(url: &str) -> Option<String> {
        let url = url.trim();
        let absolute = if url.starts_with("//") {
            Some(format!("https:{url}"))
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Some(url.to_string())
        } else {
            None
        };

        let path = match absolute {
            Some(absolute) => {
                let parsed = Url::parse(&absolute).ok()?;
                match parsed.query() {
                    Some(query) => format!("{}?{}", parsed.path(), query),
                    None => parsed.path().to_string(),
                }
            }
            None => url.to_string(),
        };

        Some(if path.starts_with('/') { path } else { format!("/{path}") })
    }

    pub fn is_critical(&self, path: &str) -> bool {
        self.critical.iter().any(|critical| path.contains(critical.as_str()))
    }

    pub fn is_safe_extension(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Classify one URL.
    pub fn classify(&self, url: &str) -> Classification {
        let skipped = |normalized_path: String, reason| Classification::Skipped {
            normalized_path,
            reason,
        };

        if url.trim().is_empty() {
            return skipped(String::new(), SkipReason::Empty);
        }
        let Some(path) = Self::normalize(url) else {
            return skipped(url.to_string(), SkipReason::InvalidUrl);
        };

        let Some(kind) = AssetKind::of(&path) else {
            return skipped(path, SkipReason::NotStaticOrMedia);
        };
        if self.is_critical(&path) {
            return skipped(path, SkipReason::Critical);
        }

        let extension = extension_of(&path);
        let is_bundle = BUNDLE_DIRS.iter().any(|dir| path.contains(dir));
        if !is_bundle && !self.is_safe_extension(&extension) {
            return skipped(path, SkipReason::UnsafeExtension);
        }
        if path.len() == kind.prefix().len() {
            return skipped(path, SkipReason::EmptyPath);
        }

        Classification::Eligible(AssetReference {
            raw_url: url.to_string(),
            normalized_path: path,
            kind,
            extension,
        })
    }
}

/// Lowercase extension of the last path segment, query and fragment ignored.
fn extension_of(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit('/').next().unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PathClassifier {
        PathClassifier::default()
    }

    fn reason(url: &str) -> Option<SkipReason> {
        match classifier().classify(url) {
            Classification::Skipped { reason, .. } => Some(reason),
            Classification::Eligible(_) => None,
        }
    }

    #[test]
    fn test_static_and_media_eligible() {
        let Classification::Eligible(asset) =
            classifier().classify("/static/frontend/Acme/theme/en_US/css/styles.css")
        else {
            panic!("expected eligible");
        };
        assert_eq!(asset.kind, AssetKind::Static);
        assert_eq!(asset.extension, "css");
        assert_eq!(asset.cdn_path(), "frontend/Acme/theme/en_US/css/styles.css");

        let Classification::Eligible(asset) = classifier().classify("/media/catalog/a.JPG") else {
            panic!("expected eligible");
        };
        assert_eq!(asset.kind, AssetKind::Media);
        assert_eq!(asset.extension, "jpg");
        assert_eq!(asset.cdn_path(), "catalog/a.JPG");
    }

    #[test]
    fn test_absolute_urls_normalized() {
        let result = classifier().classify("https://shop.test/static/a.js?v=2");
        assert_eq!(result.normalized_path(), "/static/a.js?v=2");
        assert!(result.is_eligible());

        let result = classifier().classify("//shop.test/media/b.png");
        assert_eq!(result.normalized_path(), "/media/b.png");
        assert!(result.is_eligible());
    }

    #[test]
    fn test_leading_slash_added() {
        assert_eq!(classifier().classify("static/a.css").normalized_path(), "/static/a.css");
    }

    #[test]
    fn test_skip_reasons() {
        assert_eq!(reason(""), Some(SkipReason::Empty));
        assert_eq!(reason("/pub/a.css"), Some(SkipReason::NotStaticOrMedia));
        assert_eq!(
            reason("/static/frontend/Magento_Theme/requirejs/require.js"),
            Some(SkipReason::Critical)
        );
        assert_eq!(reason("/static/a.php"), Some(SkipReason::UnsafeExtension));
        assert_eq!(reason("/static/readme"), Some(SkipReason::UnsafeExtension));
        assert_eq!(reason("http://[bad/static/a.css"), Some(SkipReason::InvalidUrl));
    }

    #[test]
    fn test_critical_beats_bundle_bypass() {
        assert_eq!(reason("/static/_cache/merged/abc.map"), None);
        assert_eq!(reason("/static/_cache/merged/jquery.js"), Some(SkipReason::Critical));
    }

    #[test]
    fn test_configured_sets_are_merged() {
        let classifier = PathClassifier::new(
            &["json".to_string(), " .MJS ".to_string()],
            &["mage/cookies.js".to_string()],
        );
        assert!(classifier.classify("/static/a.json").is_eligible());
        assert!(classifier.classify("/static/a.mjs").is_eligible());
        assert!(classifier.classify("/static/a.css").is_eligible());
        assert!(!classifier.classify("/static/mage/cookies.js").is_eligible());
        assert!(!classifier.classify("/static/require.js").is_eligible());
    }

    #[test]
    fn test_query_ignored_for_extension() {
        let Classification::Eligible(asset) = classifier().classify("/static/a.css?v=1#x") else {
            panic!("expected eligible");
        };
        assert_eq!(asset.extension, "css");
        assert_eq!(asset.cdn_path(), "a.css?v=1#x");
    }

    #[test]
    fn test_defer_candidates() {
        assert!(is_defer_candidate("/static/frontend/Magento_Ui/js/grid/x.js"));
        assert!(is_defer_candidate("/static/frontend/magento_review/js/r.js"));
        assert!(!is_defer_candidate("/static/frontend/Magento_Checkout/js/a.js"));
    }
}
