//! Remote source fetching for merged assets.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

/// Whole-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read `{}`: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    #[error("`{}` is outside the document root", .0.display())]
    OutsideRoot(PathBuf),
}

/// Source of remote asset bodies.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher.
///
/// Redirects are followed and certificate validation is off, since merge
/// inputs commonly live on staging hosts with self-signed certificates.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "https://cdn.test/a.css".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://cdn.test/a.css answered with status 404");
    }

    #[test]
    fn test_path_error_messages() {
        let err = FetchError::Io(
            PathBuf::from("pub/a.css"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "failed to read `pub/a.css`: gone");

        let err = FetchError::OutsideRoot(PathBuf::from("/srv/secret.css"));
        assert_eq!(err.to_string(), "`/srv/secret.css` is outside the document root");
    }
}
