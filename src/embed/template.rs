//! Template types for typed variable injection.

use std::marker::PhantomData;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `__NAME__` placeholder token.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__[A-Z0-9]+(?:_[A-Z0-9]+)*__").unwrap());

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }

    pub const fn content(&self) -> &'static str {
        self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }

    /// Render wrapped in `<script>...</script>`.
    pub fn render_script(&self, vars: &V) -> String {
        super::script(&self.render(vars))
    }
}

/// Substitute every placeholder in one pass.
///
/// Inserted values are never scanned again, so a value that itself contains
/// a placeholder token comes through verbatim. Unknown tokens are kept.
pub fn fill(content: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures<'_>| {
            let token = &caps[0];
            vars.iter()
                .find(|(name, _)| *name == token)
                .map_or_else(|| token.to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting<'a> {
        name: &'a str,
    }

    impl TemplateVars for Greeting<'_> {
        fn apply(&self, content: &str) -> String {
            fill(content, &[("__NAME__", self.name)])
        }
    }

    #[test]
    fn test_render() {
        const HELLO: Template<Greeting<'static>> = Template::new("hello __NAME__");
        assert_eq!(HELLO.render(&Greeting { name: "cdn" }), "hello cdn");
        assert_eq!(HELLO.content(), "hello __NAME__");
        assert_eq!(
            HELLO.render_script(&Greeting { name: "x" }),
            "<script>hello x</script>"
        );
    }

    #[test]
    fn test_fill_single_pass() {
        let out = fill(
            "a=__A__; b=__B__; c=__C__;",
            &[("__A__", "\"__B__\""), ("__B__", "2")],
        );
        assert_eq!(out, "a=\"__B__\"; b=2; c=__C__;");
    }
}
