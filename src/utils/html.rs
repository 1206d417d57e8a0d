//! HTML text utilities.
//!
//! Nothing here builds a DOM. Documents are treated as text with
//! regex-matchable tag boundaries:
//! - `escape_attr()` - entity escaping for attribute values
//! - `tags()` / `rewrite_tags()` - scan start tags by name
//! - `get_attr()` / `set_attr()` / `remove_attr()` - edit one raw tag
//! - `insert_*()` - splice snippets at `<head>` / `<body>` anchors
//! - `script_json()` - JSON safe to embed inside `<script>`

use serde::Serialize;
use std::borrow::Cow;
use std::ops::Range;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape a string for use inside a quoted attribute value.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Quote an attribute value with double quotes.
///
/// Only `"` is escaped; URLs keep their raw `&`.
fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "&quot;"))
}

// =============================================================================
// Case-insensitive search
// =============================================================================

/// Find the first ASCII case-insensitive occurrence of `needle`.
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    find_ci_from(haystack, needle, 0)
}

/// Find the first ASCII case-insensitive occurrence of `needle` at or after `from`.
pub fn find_ci_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() || from > hay.len() - pat.len() {
        return None;
    }
    (from..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

/// Find the last ASCII case-insensitive occurrence of `needle`.
pub fn rfind_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() {
        return None;
    }
    (0..=hay.len() - pat.len())
        .rev()
        .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

/// ASCII case-insensitive `contains`.
#[inline]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle).is_some()
}

// =============================================================================
// Tag Scanning
// =============================================================================

/// A start tag located in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Tag name as written in the source.
    pub name: &'a str,
    /// Byte offset of `<`.
    pub start: usize,
    /// Byte offset just past `>`.
    pub end: usize,
    /// Raw tag text, `<` through `>`.
    pub raw: &'a str,
}

impl<'a> Tag<'a> {
    /// Attribute value, `Some("")` for boolean attributes.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        get_attr(self.raw, name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        has_attr(self.raw, name)
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterator over start tags with a given name (ASCII case-insensitive).
pub struct Tags<'a> {
    html: &'a str,
    name: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Tag<'a>> {
        let bytes = self.html.as_bytes();
        let name = self.name.as_bytes();

        while let Some(offset) = self.html[self.pos..].find('<') {
            let start = self.pos + offset;
            let name_start = start + 1;
            let name_end = name_start + name.len();
            self.pos = name_start;

            if name_end > bytes.len() || !bytes[name_start..name_end].eq_ignore_ascii_case(name) {
                continue;
            }
            match bytes.get(name_end) {
                Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {}
                _ => continue,
            }

            let close = self.html[name_end..].find('>')?;
            let end = name_end + close + 1;
            self.pos = end;
            return Some(Tag {
                name: &self.html[name_start..name_end],
                start,
                end,
                raw: &self.html[start..end],
            });
        }
        None
    }
}

/// Scan all start tags named `name`.
pub fn tags<'a>(html: &'a str, name: &'a str) -> Tags<'a> {
    Tags { html, name, pos: 0 }
}

/// Rewrite start tags named `name`.
///
/// The callback returns the replacement text, or `None` to keep the tag.
/// Text between tags is copied unchanged.
pub fn rewrite_tags<F>(html: &str, name: &str, mut f: F) -> String
where
    F: FnMut(&Tag<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(html.len() + 256);
    let mut last = 0;
    for tag in tags(html, name) {
        if let Some(replacement) = f(&tag) {
            out.push_str(&html[last..tag.start]);
            out.push_str(&replacement);
            last = tag.end;
        }
    }
    out.push_str(&html[last..]);
    out
}

// =============================================================================
// Attribute Editing
// =============================================================================

/// Byte ranges of one attribute inside a raw tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpan {
    /// Attribute name.
    pub name: Range<usize>,
    /// Value without quotes, if present.
    pub value: Option<Range<usize>>,
    /// Whole attribute including its leading whitespace.
    pub span: Range<usize>,
}

/// Locate attributes in a raw start tag such as `<img src="a" alt='b' hidden>`.
pub fn attr_spans(tag: &str) -> Vec<AttrSpan> {
    let bytes = tag.as_bytes();
    let len = bytes.len();
    let mut attrs = Vec::new();

    // Skip `<` and the tag name
    let mut i = 1;
    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }

    loop {
        let ws_start = i;
        while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' {
            break;
        }

        let name_start = i;
        while i < len
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
        {
            i += 1;
        }
        let name = name_start..i;

        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let value = if j < len && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let quote = bytes[j];
                let value_start = j + 1;
                let value_end = tag[value_start..]
                    .bytes()
                    .position(|b| b == quote)
                    .map_or(len.saturating_sub(1).max(value_start), |p| value_start + p);
                i = (value_end + 1).min(len);
                value_start..value_end
            } else {
                let value_start = j;
                while j < len && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
                i = j;
                value_start..j
            };
            attrs.push(AttrSpan { name, value: Some(value), span: ws_start..i });
        } else {
            attrs.push(AttrSpan { name, value: None, span: ws_start..i });
        }
    }

    attrs
}

fn find_attr(tag: &str, name: &str) -> Option<AttrSpan> {
    attr_spans(tag)
        .into_iter()
        .find(|attr| tag[attr.name.clone()].eq_ignore_ascii_case(name))
}

/// Value of attribute `name`, `Some("")` for boolean attributes.
pub fn get_attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    find_attr(tag, name).map(|attr| match attr.value {
        Some(value) => &tag[value],
        None => "",
    })
}

/// Check whether a raw tag carries attribute `name`.
#[inline]
pub fn has_attr(tag: &str, name: &str) -> bool {
    find_attr(tag, name).is_some()
}

/// Set attribute `name` to `value` (double quoted).
///
/// An existing attribute is replaced in place; a new one is appended after
/// the last attribute.
pub fn set_attr(tag: &str, name: &str, value: &str) -> String {
    let rendered = format!("{name}={}", quote_value(value));
    let attrs = attr_spans(tag);

    if let Some(attr) = attrs
        .iter()
        .find(|attr| tag[attr.name.clone()].eq_ignore_ascii_case(name))
    {
        return format!("{}{}{}", &tag[..attr.name.start], rendered, &tag[attr.span.end..]);
    }

    let insert_at = attrs.last().map_or_else(|| tag_name_end(tag), |attr| attr.span.end);
    format!("{} {}{}", &tag[..insert_at], rendered, &tag[insert_at..])
}

/// Add a boolean attribute (e.g. `defer`) unless present.
pub fn add_flag(tag: &str, name: &str) -> String {
    if has_attr(tag, name) {
        return tag.to_string();
    }
    let insert_at = attr_spans(tag)
        .last()
        .map_or_else(|| tag_name_end(tag), |attr| attr.span.end);
    format!("{} {}{}", &tag[..insert_at], name, &tag[insert_at..])
}

/// Remove attribute `name` with its leading whitespace.
pub fn remove_attr(tag: &str, name: &str) -> String {
    match find_attr(tag, name) {
        Some(attr) => format!("{}{}", &tag[..attr.span.start], &tag[attr.span.end..]),
        None => tag.to_string(),
    }
}

fn tag_name_end(tag: &str) -> usize {
    tag.bytes()
        .enumerate()
        .skip(1)
        .find(|(_, b)| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
        .map_or(tag.len(), |(i, _)| i)
}

// =============================================================================
// Document Anchors
// =============================================================================

/// True when the document has both a `<head>...</head>` and a
/// `<body>...</body>` pair.
pub fn has_document_shell(html: &str) -> bool {
    tags(html, "head").next().is_some()
        && find_ci(html, "</head>").is_some()
        && tags(html, "body").next().is_some()
        && find_ci(html, "</body>").is_some()
}

fn splice(html: &str, at: Option<usize>, snippet: &str) -> String {
    match at {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + snippet.len());
            out.push_str(&html[..at]);
            out.push_str(snippet);
            out.push_str(&html[at..]);
            out
        }
        None => html.to_string(),
    }
}

/// Insert right after the first `<head ...>` tag.
pub fn insert_after_head_open(html: &str, snippet: &str) -> String {
    splice(html, tags(html, "head").next().map(|tag| tag.end), snippet)
}

/// Insert right before the first `</head>`.
pub fn insert_before_head_close(html: &str, snippet: &str) -> String {
    splice(html, find_ci(html, "</head>"), snippet)
}

/// Insert right after the first `</head>`.
pub fn insert_after_head_close(html: &str, snippet: &str) -> String {
    splice(html, find_ci(html, "</head>").map(|i| i + "</head>".len()), snippet)
}

/// Insert right after the first `<body ...>` tag.
pub fn insert_after_body_open(html: &str, snippet: &str) -> String {
    splice(html, tags(html, "body").next().map(|tag| tag.end), snippet)
}

/// Insert right before the last `</body>`.
pub fn insert_before_body_close(html: &str, snippet: &str) -> String {
    splice(html, rfind_ci(html, "</body>"), snippet)
}

/// Inner text of the first `<head>` element.
pub fn head_inner(html: &str) -> Option<&str> {
    let open = tags(html, "head").next()?;
    let close = find_ci_from(html, "</head>", open.end)?;
    Some(&html[open.end..close])
}

/// Inner text of the `<body>` element, up to the last `</body>`.
pub fn body_inner(html: &str) -> Option<&str> {
    let open = tags(html, "body").next()?;
    let close = rfind_ci(html, "</body>")?;
    (close >= open.end).then(|| &html[open.end..close])
}

// =============================================================================
// Script JSON
// =============================================================================

/// Serialize `value` as JSON that can sit inside a `<script>` element.
///
/// `<`, `>` and `&` are written as unicode escapes so the payload can never
/// close the surrounding script or open a comment.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| String::from("null"));
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
