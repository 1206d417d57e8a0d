//! Configuration error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading `cdnify.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid setting: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ConfigError::Io(
            PathBuf::from("cdnify.toml"),
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "cannot read `cdnify.toml`: not found");

        let err = ConfigError::Validation("store.admin_path must start with `/`".into());
        assert_eq!(err.to_string(), "invalid setting: store.admin_path must start with `/`");
    }
}
