//! Merged CSS/JS bundles.
//!
//! A bundle is keyed by the MD5 of its concatenated input list and written
//! once to `{document_root}/pub/static/merged/{css|js}/merged_{key}.{ext}`.
//! Existing bundles are reused as-is and never invalidated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fetch::{FetchError, Fetcher, HttpFetcher};
use crate::config::CdnConfig;
use crate::utils::hash;
use crate::{debug, info, log};

/// Bundle directory relative to the document root.
const MERGED_DIR: &str = "pub/static/merged";

/// Kind of bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MergeKind {
    Css,
    Js,
}

impl MergeKind {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to write `{}`: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),
}

/// Concatenates local and remote assets into cached bundles.
#[derive(Debug)]
pub struct AssetMerger<F = HttpFetcher> {
    document_root: PathBuf,
    base_url: String,
    fetcher: F,
}

impl AssetMerger<HttpFetcher> {
    /// Merger over the configured document root and store base URL.
    pub fn from_config(config: &CdnConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            &config.store.document_root,
            config.store.base_url_trimmed(),
            HttpFetcher::new()?,
        ))
    }
}

impl<F: Fetcher> AssetMerger<F> {
    pub fn new(document_root: &Path, base_url: &str, fetcher: F) -> Self {
        Self {
            document_root: document_root.to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    /// Merge `files` in order, returning the bundle URL.
    ///
    /// Inputs that fail to load are logged and left out. Returns `Ok(None)`
    /// for an empty list.
    pub fn merge(&self, files: &[String], kind: MergeKind) -> Result<Option<String>, MergeError> {
        if files.is_empty() {
            return Ok(None);
        }

        let ext = kind.extension();
        let name = format!("merged_{}.{ext}", hash::md5_hex(&files.concat()));
        let dir = self.document_root.join(MERGED_DIR).join(ext);
        let path = dir.join(&name);
        let url = format!("{}/static/merged/{ext}/{name}", self.base_url);

        if path.exists() {
            debug!("merge"; "reusing {}", name);
            return Ok(Some(url));
        }

        fs::create_dir_all(&dir).map_err(|err| MergeError::Io(dir.clone(), err))?;

        let mut merged = String::new();
        for file in files {
            let source = file.split('?').next().unwrap_or_default();
            match self.load(source) {
                Ok(content) if !content.is_empty() => {
                    merged.push_str(&format!("/* Source: {source} */\n{content}\n"));
                }
                Ok(_) => {}
                Err(err) => log!("merge"; "failed to load {}: {}", file, err),
            }
        }

        fs::write(&path, merged).map_err(|err| MergeError::Io(path.clone(), err))?;
        info!("merge"; "merged {} files into {}", files.len(), name);
        Ok(Some(url))
    }

    /// Body of one query-less input.
    ///
    /// Local paths must resolve inside the document root.
    fn load(&self, url: &str) -> Result<String, FetchError> {
        if let Some(rest) = url.strip_prefix("//") {
            return self.fetcher.fetch(&format!("https://{rest}"));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetcher.fetch(url);
        }

        let root = self
            .document_root
            .canonicalize()
            .map_err(|err| FetchError::Io(self.document_root.clone(), err))?;
        let joined = root.join(url.trim_start_matches('/'));
        let path = joined.canonicalize().map_err(|err| FetchError::Io(joined, err))?;
        if !path.starts_with(&root) {
            return Err(FetchError::OutsideRoot(path));
        }
        fs::read_to_string(&path).map_err(|err| FetchError::Io(path, err))
    }
}
