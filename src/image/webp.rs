//! Lossy WebP conversion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use thiserror::Error;

use crate::utils::size::{format_bytes, savings_percent};
use crate::{debug, info};

/// Encoder quality, 0-100.
const QUALITY: f32 = 80.0;

/// Extensions the converter decodes.
const CONVERTIBLE: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("`{}` does not exist", .0.display())]
    Missing(PathBuf),

    #[error("unsupported image type `{0}`")]
    Unsupported(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode WebP: {0}")]
    Encode(String),

    #[error("failed to write `{}`: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),
}

/// Result of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebpConversion {
    pub output: PathBuf,
    /// Source and output sizes; both zero when the source already was WebP.
    pub original_size: u64,
    pub webp_size: u64,
}

/// Writes a `.webp` sibling next to raster images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageConverter;

impl ImageConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert `path`, returning the WebP path or `None` on failure.
    pub fn convert(&self, path: &Path) -> Option<PathBuf> {
        match self.try_convert(path) {
            Ok(conversion) => Some(conversion.output),
            Err(err) => {
                debug!("webp"; "{}: {}", path.display(), err);
                None
            }
        }
    }

    pub fn try_convert(&self, path: &Path) -> Result<WebpConversion, ConvertError> {
        let ext = extension(path);
        if ext == "webp" {
            return Ok(WebpConversion {
                output: path.to_path_buf(),
                original_size: 0,
                webp_size: 0,
            });
        }
        if !path.is_file() {
            return Err(ConvertError::Missing(path.to_path_buf()));
        }
        if !CONVERTIBLE.contains(&ext.as_str()) {
            return Err(ConvertError::Unsupported(ext));
        }

        let encoded = encode(image::open(path)?)?;
        let output = path.with_extension("webp");
        fs::write(&output, &encoded).map_err(|err| ConvertError::Io(output.clone(), err))?;

        let original_size = fs::metadata(path)
            .map_err(|err| ConvertError::Io(path.to_path_buf(), err))?
            .len();
        let webp_size = encoded.len() as u64;
        info!(
            "webp";
            "Converted {} to WebP. Size reduced from {} to {} ({}% saved)",
            path.display(),
            format_bytes(original_size),
            format_bytes(webp_size),
            savings_percent(original_size, webp_size)
        );

        Ok(WebpConversion { output, original_size, webp_size })
    }
}

/// Whether `path` names a raster image by extension.
pub fn is_image_file(path: &Path) -> bool {
    matches!(extension(path).as_str(), "jpg" | "jpeg" | "png" | "gif")
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Palette and grayscale inputs are widened to truecolor first.
fn encode(img: DynamicImage) -> Result<Vec<u8>, ConvertError> {
    let (width, height) = (img.width(), img.height());
    let memory = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(false, QUALITY)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, QUALITY)
    }
    .map_err(|err| ConvertError::Encode(format!("{err:?}")))?;
    Ok(memory.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_png_with_alpha() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("logo.png");
        RgbaImage::from_pixel(100, 100, Rgba([200, 30, 30, 128])).save(&src).unwrap();

        let conversion = ImageConverter.try_convert(&src).unwrap();
        assert_eq!(conversion.output, dir.path().join("logo.webp"));
        assert!(conversion.webp_size > 0);

        let decoded = image::open(&conversion.output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn test_opaque_png() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("banner.png");
        RgbImage::from_pixel(100, 100, Rgb([30, 160, 90])).save(&src).unwrap();

        let conversion = ImageConverter.try_convert(&src).unwrap();
        assert_eq!(conversion.output, dir.path().join("banner.webp"));
        assert!(conversion.original_size > 0);
        assert!(conversion.webp_size > 0);

        let decoded = image::open(&conversion.output).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn test_jpeg_converted() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("Hero.JPG");
        RgbImage::from_pixel(64, 32, Rgb([10, 120, 240]))
            .save_with_format(&src, image::ImageFormat::Jpeg)
            .unwrap();

        assert_eq!(ImageConverter.convert(&src), Some(dir.path().join("Hero.webp")));
    }

    #[test]
    fn test_webp_returns_itself() {
        let path = Path::new("/nowhere/banner.webp");
        assert_eq!(ImageConverter.convert(path), Some(path.to_path_buf()));
    }

    #[test]
    fn test_failures() {
        let dir = TempDir::new().unwrap();
        let gif = dir.path().join("anim.gif");
        fs::write(&gif, b"GIF89a").unwrap();

        assert!(matches!(
            ImageConverter.try_convert(&gif),
            Err(ConvertError::Unsupported(ext)) if ext == "gif"
        ));
        assert_eq!(ImageConverter.convert(&dir.path().join("missing.png")), None);
        assert!(!dir.path().join("anim.webp").exists());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a/b.PNG")));
        assert!(is_image_file(Path::new("a.gif")));
        assert!(!is_image_file(Path::new("a.webp")));
        assert!(!is_image_file(Path::new("README")));
    }
}
