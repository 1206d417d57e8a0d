//! cdnify command-line tool.

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

use cdnify::config::CdnConfig;
use cdnify::{debug, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_debug(cli.debug);
    let config = load_config(&cli.config)?;
    logger::set_debug(cli.debug || config.is_debug());

    match &cli.command {
        Commands::Rewrite { args } => cli::rewrite::rewrite_file(args, &config),
        Commands::Merge { kind, files } => cli::merge::merge_files(files, *kind, &config),
        Commands::Webp { images } => cli::webp::convert_images(images),
        Commands::Config => {
            cli::config::show_config(&config);
            Ok(())
        }
    }
}

/// Load `path`, falling back to defaults when it does not exist.
fn load_config(path: &Path) -> Result<CdnConfig> {
    if !path.exists() {
        debug!("config"; "{} not found, using defaults", path.display());
        return Ok(CdnConfig::default());
    }
    CdnConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}
