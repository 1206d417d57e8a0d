//! `[general]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [general]
//! enabled = true    # Master switch for rewriting and optimization
//! debug = false     # Emit info/warning/debug logs (errors are always logged)
//! ```

use serde::Deserialize;

/// Master switches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable CDN rewriting and performance transforms.
    pub enabled: bool,

    /// Enable non-error logging.
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_general_defaults() {
        let config = test_parse_config("");
        assert!(!config.general.enabled);
        assert!(!config.general.debug);
    }

    #[test]
    fn test_general_config() {
        let config = test_parse_config("[general]\nenabled = true\ndebug = true");
        assert!(config.general.enabled);
        assert!(config.general.debug);
    }
}
