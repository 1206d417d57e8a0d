//! `<picture>` wrappers offering WebP copies of CDN images.

use super::{TTL_QUERY, has_extension, ttl::with_ttl};
use crate::embed::{self, styles};
use crate::utils::html;

const PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Source fragments that mark a probable LCP image.
const LCP_HINTS: &[&str] = &["home-main", "hero", "banner", "slider"];

const CLS_CLASS: &str = "image-cls-fix";

/// Inject the CLS style block and upgrade CDN images.
///
/// Each image gets the TTL query, the `image-cls-fix` class and native lazy
/// loading unless it looks like the LCP image. Non-WebP images are wrapped in
/// a `<picture>` with a `.webp` source. Images already carrying the class are
/// left alone, so a second run changes nothing.
pub(super) fn enhance_images(html: String, is_cdn_url: impl Fn(&str) -> bool) -> String {
    let html = if html.contains(styles::WEBP_CLS_ID) {
        html
    } else {
        html::insert_after_head_open(
            &html,
            &embed::style_with_id(styles::WEBP_CLS_ID, styles::WEBP_CLS_CSS),
        )
    };

    let mut found_main_image = false;
    html::rewrite_tags(&html, "img", |tag| {
        let src = tag.attr("src")?;
        if !is_cdn_url(src) || !has_extension(src, PICTURE_EXTENSIONS) {
            return None;
        }
        let class = tag.attr("class").unwrap_or_default();
        if class.split_whitespace().any(|c| c == CLS_CLASS) {
            return None;
        }

        let other_attrs = html::remove_attr(tag.raw, "src");
        let is_lcp = LCP_HINTS.iter().any(|hint| src.contains(hint))
            || (!found_main_image && other_attrs.contains("home-"));
        if is_lcp {
            found_main_image = true;
        }

        let mut img = html::set_attr(tag.raw, "src", &with_ttl(src));
        let class = match class.trim() {
            "" => CLS_CLASS.to_string(),
            existing => format!("{existing} {CLS_CLASS}"),
        };
        img = html::set_attr(&img, "class", &class);
        if !is_lcp && !tag.has_attr("loading") {
            img = html::set_attr(&img, "loading", "lazy");
        }

        if has_extension(src, &["webp"]) {
            return Some(img);
        }
        Some(format!(
            r#"<picture><source srcset="{}" type="image/webp">{img}</picture>"#,
            webp_source(src)
        ))
    })
}

/// `{stem}.webp?ttl=...` for an image URL.
fn webp_source(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or_default();
    let stem = path.rsplit_once('.').map_or(path, |(stem, _)| stem);
    format!("{stem}.webp?{TTL_QUERY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_cdn(url: &str) -> bool {
        url.starts_with("https://cdn.test/")
    }

    fn page(body: &str) -> String {
        format!("<html><head><title>t</title></head><body>{body}</body></html>")
    }

    #[test]
    fn test_wraps_raster_images() {
        let out = enhance_images(page(r#"<img src="https://cdn.test/p/a.jpg?v=1" alt="a">"#), is_cdn);
        assert!(out.contains(concat!(
            r#"<picture><source srcset="https://cdn.test/p/a.webp?ttl=31536000" type="image/webp">"#,
            r#"<img src="https://cdn.test/p/a.jpg?v=1&ttl=31536000" alt="a" class="image-cls-fix" loading="lazy"></picture>"#
        )));
        assert!(out.contains(r#"<head><style id="cdnify-webp-cls">"#));
    }

    #[test]
    fn test_webp_not_wrapped() {
        let out = enhance_images(page(r#"<img class="x" src="https://cdn.test/a.webp">"#), is_cdn);
        assert!(!out.contains("<picture>"));
        assert!(out.contains(
            r#"<img class="x image-cls-fix" src="https://cdn.test/a.webp?ttl=31536000" loading="lazy">"#
        ));
    }

    #[test]
    fn test_lcp_images_stay_eager() {
        let out = enhance_images(
            page(concat!(
                r#"<img src="https://cdn.test/hero.png">"#,
                r#"<img class="home-a" src="https://cdn.test/b.png">"#,
                r#"<img src="https://cdn.test/c.png" loading="eager">"#,
            )),
            is_cdn,
        );
        assert_eq!(out.matches(r#"loading="lazy""#).count(), 1);
        assert!(out.contains(
            r#"<img class="home-a image-cls-fix" src="https://cdn.test/b.png?ttl=31536000" loading="lazy">"#
        ));
        assert!(out.contains(r#"<img src="https://cdn.test/hero.png?ttl=31536000" class="image-cls-fix">"#));
        assert!(out.contains(r#"loading="eager""#));
    }

    #[test]
    fn test_non_cdn_images_untouched() {
        let html = page(r#"<img src="/media/a.png">"#);
        let out = enhance_images(html.clone(), is_cdn);
        assert!(out.ends_with(r#"<img src="/media/a.png"></body></html>"#));
    }

    #[test]
    fn test_idempotent() {
        let once = enhance_images(page(r#"<img src="https://cdn.test/a.png">"#), is_cdn);
        let twice = enhance_images(once.clone(), is_cdn);
        assert_eq!(once, twice);
    }
}
