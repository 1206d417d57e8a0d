//! Image conversion.
//!
//! - `webp`: lossy WebP copies of JPEG/PNG files

mod webp;

pub use webp::{ConvertError, ImageConverter, WebpConversion, is_image_file};
