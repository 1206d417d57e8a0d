//! `[store]` section configuration.
//!
//! Describes the origin site whose HTML is rewritten.
//!
//! # Example
//!
//! ```toml
//! [store]
//! base_url = "http://shop.test/"          # Unsecure base URL
//! secure_base_url = "https://shop.test/"  # Secure base URL
//! document_root = "/var/www/shop"         # Filesystem root (pub/ lives here)
//! admin_path = "/admin/"                  # Requests under this path are never rewritten
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Origin site settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub secure_base_url: String,
    /// Root for merged assets and local merge inputs.
    pub document_root: PathBuf,
    pub admin_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            secure_base_url: String::new(),
            document_root: PathBuf::from("."),
            admin_path: "/admin/".to_string(),
        }
    }
}

impl StoreConfig {
    /// Base URL without the trailing slash.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Secure base URL without the trailing slash.
    pub fn secure_base_url_trimmed(&self) -> &str {
        self.secure_base_url.trim().trim_end_matches('/')
    }
}
