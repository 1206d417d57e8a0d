//! `cdnify merge`: bundle CSS/JS inputs.

use anyhow::{Context, Result};

use cdnify::asset::{AssetMerger, MergeKind};
use cdnify::config::CdnConfig;

pub fn merge_files(files: &[String], kind: MergeKind, config: &CdnConfig) -> Result<()> {
    let merger = AssetMerger::from_config(config).context("failed to create HTTP client")?;
    match merger.merge(files, kind)? {
        Some(url) => println!("{url}"),
        None => eprintln!("nothing to merge"),
    }
    Ok(())
}
