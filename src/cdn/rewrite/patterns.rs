//! The ordered substitution chain applied to one URL.
//!
//! Sub-patterns run in a fixed order and are not mutually exclusive; a later
//! one sees the output of the earlier ones. Each relative-path match bumps the
//! counter; absolute-base replacements are not counted.

use regex::{Captures, Regex};

use super::RewriteError;
use crate::cdn::is_defer_candidate;
use crate::utils::html;

/// Attributes used by product galleries and lazy loaders.
const DATA_ATTRIBUTES: &[&str] = &["data-src", "data-large-image", "data-medium-image", "data-thumb"];

/// One URL's substitution inputs.
pub(super) struct UrlSubstitution<'a> {
    /// Site-relative path as it appears in the document.
    pub path: &'a str,
    pub cdn_url: &'a str,
    /// Store base URLs without trailing `/`; empty when unknown.
    pub base_url: &'a str,
    pub secure_base_url: &'a str,
}

impl UrlSubstitution<'_> {
    /// Apply every sub-pattern in order, returning the new document and the
    /// number of replacements made.
    pub fn apply(&self, html: String) -> Result<(String, usize), RewriteError> {
        if self.path.is_empty() || !html.contains(self.path) {
            return Ok((html, 0));
        }

        let mut count = 0;
        let path = regex::escape(self.path);
        let cdn = self.cdn_url;

        // Absolute URLs on either base
        let mut html = html;
        for base in [self.base_url, self.secure_base_url] {
            if !base.is_empty() {
                html = html.replace(&format!("{base}{}", self.path), cdn);
            }
        }
        if !html.contains(self.path) {
            return Ok((html, 0));
        }

        html = substitute(html, &format!(r#"(\shref=["'])({path})(["'])"#), &mut count, |_, caps| {
            Some(format!("{}{cdn}{}", &caps[1], &caps[3]))
        })?;

        let defer = self.is_deferrable_script();
        html = substitute(html, &format!(r#"(\ssrc=["'])({path})(["'])"#), &mut count, |doc, caps| {
            let mut out = format!("{}{cdn}{}", &caps[1], &caps[3]);
            if defer {
                if let Some(whole) = caps.get(0) {
                    if needs_defer(doc, whole.start(), whole.end()) {
                        out.push_str(" defer");
                    }
                }
            }
            Some(out)
        })?;

        for pattern in [
            format!(r#"url\(['"]?{path}['"]?\)"#),
            format!(r#"url\(['"]{path}['"]?\)"#),
            format!(r#"url\({path}\)"#),
        ] {
            html = substitute(html, &pattern, &mut count, |_, _| Some(format!("url({cdn})")))?;
        }

        // Quoted literals, only when both quotes agree
        html = substitute(html, &format!(r#"(["'])({path})(["'])"#), &mut count, |_, caps| {
            (caps[1] == caps[3]).then(|| format!("{}{cdn}{}", &caps[1], &caps[3]))
        })?;

        // JSON image keys; the whole value becomes the CDN URL
        html = substitute(
            html,
            &format!(
                r#"(?i)("(?:img|image|thumbnail|small_image|large_image|full)":\s*")([^"]*?{path}[^"]*?)(")"#
            ),
            &mut count,
            |_, caps| Some(format!("{}{cdn}{}", &caps[1], &caps[3])),
        )?;

        for attr in DATA_ATTRIBUTES {
            html = substitute(
                html,
                &format!(r#"(?i)({})=(["']){path}(["'])"#, regex::escape(attr)),
                &mut count,
                |_, caps| Some(format!("{}={}{cdn}{}", &caps[1], &caps[2], &caps[3])),
            )?;
        }

        // Font preloads
        html = substitute(
            html,
            &format!(
                r#"(?i)(<link[^>]*rel=['"]preload['"][^>]*as=['"]font['"][^>]*href=['"]){path}(['"][^>]*>)"#
            ),
            &mut count,
            |_, caps| Some(format!("{}{cdn}{}", &caps[1], &caps[2])),
        )?;

        // Gallery attributes
        html = substitute(
            html,
            &format!(r#"(?i)(data-(?:full|img|thumb|large_image))=(["']){path}(["'])"#),
            &mut count,
            |_, caps| Some(format!("{}={}{cdn}{}", &caps[1], &caps[2], &caps[3])),
        )?;

        Ok((html, count))
    }

    fn is_deferrable_script(&self) -> bool {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        path.to_ascii_lowercase().ends_with(".js") && is_defer_candidate(self.path)
    }
}

/// Regex substitution where the callback may decline a match by returning
/// `None`. Only accepted matches are counted.
pub(super) fn substitute<F>(
    html: String,
    pattern: &str,
    count: &mut usize,
    mut rewrite: F,
) -> Result<String, RewriteError>
where
    F: FnMut(&str, &Captures<'_>) -> Option<String>,
{
    let re = Regex::new(pattern)?;
    if !re.is_match(&html) {
        return Ok(html);
    }

    let out = re.replace_all(&html, |caps: &Captures<'_>| match rewrite(&html, caps) {
        Some(replacement) => {
            *count += 1;
            replacement
        }
        None => caps[0].to_string(),
    });
    Ok(out.into_owned())
}

/// Raw text of the tag enclosing byte range `start..end`, if any.
pub(super) fn enclosing_tag(doc: &str, start: usize, end: usize) -> Option<&str> {
    let open = doc[..start].rfind('<')?;
    if doc[open..start].contains('>') {
        return None;
    }
    let close = end + doc[end..].find('>')?;
    Some(&doc[open..=close])
}

/// True when the match sits in a `<script>` tag without `defer` or `async`.
pub(super) fn needs_defer(doc: &str, start: usize, end: usize) -> bool {
    enclosing_tag(doc, start, end).is_some_and(|tag| {
        tag.get(..7).is_some_and(|name| name.eq_ignore_ascii_case("<script"))
            && !html::has_attr(tag, "defer")
            && !html::has_attr(tag, "async")
    })
}
