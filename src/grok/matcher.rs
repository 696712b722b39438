use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::ast::{CompiledTemplate, Semantic};
use super::compiler::GrokCompiler;
use super::library::MacroLibrary;

/// Captured substrings of one successful match, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawMatch {
    values: Vec<(String, String)>,
}

impl RawMatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.values.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.values.push((property, value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<P: Into<String>, V: Into<String>> FromIterator<(P, V)> for RawMatch {
    fn from_iter<T: IntoIterator<Item = (P, V)>>(iter: T) -> Self {
        let mut raw = RawMatch::new();
        for (property, value) in iter {
            raw.insert(property, value);
        }
        raw
    }
}

/// Matches lines against a compiled grok template.
///
/// Construction never fails. When the template does not compile, or the
/// composed expression is rejected by the regex engine, the matcher falls
/// back to matching the template text literally and reports
/// [`GrokMatcher::compilation_failed`].
#[derive(Debug, Clone)]
pub struct GrokMatcher {
    regex: Option<Regex>,
    template: String,
    schema: Vec<Semantic>,
    compilation_failed: bool,
}

impl GrokMatcher {
    pub fn new(grok: &str, library: &MacroLibrary) -> Self {
        Self::with_compiler(grok, &GrokCompiler::new(library))
    }

    pub fn with_compiler(grok: &str, compiler: &GrokCompiler<'_>) -> Self {
        match compiler.compile(grok) {
            Ok(compiled) => Self::from_compiled(grok, compiled),
            Err(e) => Self::degraded(grok, &e),
        }
    }

    /// Build a matcher from an already compiled template
    pub fn from_compiled(grok: &str, compiled: CompiledTemplate) -> Self {
        match Regex::new(compiled.regex()) {
            Ok(regex) => Self {
                regex: Some(regex),
                template: compiled.regex().to_string(),
                schema: compiled.schema().to_vec(),
                compilation_failed: false,
            },
            Err(e) => Self::degraded(grok, &e),
        }
    }

    fn degraded(grok: &str, error: &dyn std::error::Error) -> Self {
        warn!(template = grok, error = %error, "grok compilation failed, matching template text literally");
        Self {
            regex: Regex::new(&regex::escape(grok)).ok(),
            template: grok.to_string(),
            schema: Vec::new(),
            compilation_failed: true,
        }
    }

    /// Effective pattern: the compiled regex, or the raw template text as
    /// given when compilation failed. The literal match escapes it.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn compilation_failed(&self) -> bool {
        self.compilation_failed
    }

    pub fn schema(&self) -> &[Semantic] {
        &self.schema
    }

    /// Whether the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(text))
    }

    /// Extract every schema property from `text`.
    ///
    /// Groups that did not participate in the match yield an empty string.
    pub fn parse(&self, text: &str) -> Option<RawMatch> {
        let captures = self.regex.as_ref()?.captures(text)?;
        Some(
            self.schema
                .iter()
                .map(|semantic| {
                    let value = captures
                        .name(&semantic.property)
                        .map_or("", |m| m.as_str());
                    (semantic.property.as_str(), value)
                })
                .collect(),
        )
    }
}
