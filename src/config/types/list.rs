//! List-valued settings.
//!
//! Admin-style config stores lists as delimited text. Both forms are accepted:
//!
//! ```toml
//! file_types = "css, js"
//! file_types = ["css", "js"]
//! custom_urls = """
//! /static/frontend/a.css
//! /static/frontend/b.js
//! """
//! ```
//!
//! Entries are trimmed and empty entries dropped. Order is preserved.

use serde::{Deserialize, Deserializer};

/// Raw list input: delimited text or a TOML array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListInput {
    Text(String),
    Items(Vec<String>),
}

impl ListInput {
    fn into_entries(self, split: fn(&str) -> Vec<String>) -> Vec<String> {
        match self {
            Self::Text(text) => split(&text),
            Self::Items(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Split comma-separated text.
pub fn split_comma(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split newline-separated text (`\r\n`, `\r` or `\n`).
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deserialize a comma-separated list.
pub fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ListInput::deserialize(deserializer)?.into_entries(split_comma))
}

/// Deserialize a newline-separated list.
pub fn line_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ListInput::deserialize(deserializer)?.into_entries(split_lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comma() {
        assert_eq!(split_comma(" css, js ,,woff2"), vec!["css", "js", "woff2"]);
        assert!(split_comma("").is_empty());
    }

    #[test]
    fn test_split_lines_all_endings() {
        let text = "/static/a.css\r\n/static/b.js\r/static/c.js\n\n  /static/d.css  ";
        assert_eq!(
            split_lines(text),
            vec!["/static/a.css", "/static/b.js", "/static/c.js", "/static/d.css"]
        );
    }
}
