//! `cdnify rewrite`: run the response processor over an HTML file.

use std::fs;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::RewriteArgs;
use cdnify::config::CdnConfig;
use cdnify::response::{RequestContext, ResponseProcessor};

pub fn rewrite_file(args: &RewriteArgs, config: &CdnConfig) -> Result<()> {
    let mut html = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let mut ctx = RequestContext::new(args.uri.as_str());
    if args.admin {
        ctx = ctx.admin();
    }
    let report = ResponseProcessor::new(config).process(&ctx, &mut html);

    match &args.output {
        Some(output) => {
            fs::write(output, &html)
                .with_context(|| format!("failed to write {}", output.display()))?;
            eprintln!(
                "{} {} ({} replacements{})",
                "wrote".green().bold(),
                output.display(),
                report.replacements(),
                if report.pipeline_ran { ", optimized" } else { "" }
            );
        }
        None => print!("{html}"),
    }

    if let Some(stats) = &report.rewrite
        && !stats.failed.is_empty()
    {
        eprintln!("{} {}", "failed:".yellow().bold(), stats.failed.join(", "));
    }
    Ok(())
}
