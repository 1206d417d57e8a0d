//! Command-line interface module.

mod args;
pub mod config;
pub mod merge;
pub mod rewrite;
pub mod webp;

pub use args::{Cli, Commands, RewriteArgs};
