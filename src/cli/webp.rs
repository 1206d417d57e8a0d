//! `cdnify webp`: convert images to WebP.

use std::path::PathBuf;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use cdnify::image::ImageConverter;
use cdnify::utils::size::format_bytes;

pub fn convert_images(images: &[PathBuf]) -> Result<()> {
    let converter = ImageConverter::new();
    let mut failed = 0;

    for image in images {
        match converter.try_convert(image) {
            Ok(done) if done.output == *image => {
                println!("{} {}", "skip".dimmed(), image.display());
            }
            Ok(done) => println!(
                "{} {} -> {} ({} -> {})",
                "ok".green().bold(),
                image.display(),
                done.output.display(),
                format_bytes(done.original_size),
                format_bytes(done.webp_size)
            ),
            Err(err) => {
                failed += 1;
                eprintln!("{} {}: {}", "fail".red().bold(), image.display(), err);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} images could not be converted", failed, images.len());
    }
    Ok(())
}
