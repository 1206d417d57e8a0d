//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use cdnify::asset::MergeKind;
use cdnify::config::CONFIG_FILE;

/// Rewrite storefront HTML to serve static assets from a CDN
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path; defaults are used when it does not exist
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable debug logging regardless of `general.debug`
    #[arg(long, global = true)]
    pub debug: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rewrite an HTML file as if it were a storefront response
    #[command(visible_alias = "r")]
    Rewrite {
        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Merge CSS or JS files into one cached bundle
    #[command(visible_alias = "m")]
    Merge {
        /// Bundle kind
        #[arg(short, long, value_enum)]
        kind: MergeKind,

        /// Local paths (relative to `store.document_root`) or URLs, in order
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,
    },

    /// Write a lossy WebP copy next to each image
    #[command(visible_alias = "w")]
    Webp {
        #[arg(required = true, value_name = "IMAGE", value_hint = clap::ValueHint::FilePath)]
        images: Vec<PathBuf>,
    },

    /// Show the effective configuration
    #[command(visible_alias = "c")]
    Config,
}

/// Rewrite command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct RewriteArgs {
    /// HTML file to process
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Write output to file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Request URI the document was served for
    #[arg(long, default_value = "/")]
    pub uri: String,

    /// Treat the request as an admin area request
    #[arg(long)]
    pub admin: bool,
}
