use crate::message::LogLevel;
use serde::Serialize;

/// Casting rule pattern that acts as the fallback when no other rule matches
pub const DEFAULT_PATTERN: &str = "*";

/// How a captured substring is converted into a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ParserKind {
    #[default]
    PlainString,
    Integer,
    Datetime,
    LogLevel,
}

impl ParserKind {
    /// Resolve a cast name from a template. Unknown names are plain strings.
    pub fn from_name(name: &str) -> ParserKind {
        match name.to_lowercase().as_str() {
            "int" | "integer" | "long" => ParserKind::Integer,
            "datetime" | "date" | "timestamp" => ParserKind::Datetime,
            "loglevel" | "level" => ParserKind::LogLevel,
            _ => ParserKind::PlainString,
        }
    }
}

/// A single casting rule attached to a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastingRule {
    /// Literal substring to look for, or [`DEFAULT_PATTERN`]
    pub pattern: String,
    pub kind: ParserKind,
    /// Level assigned when the rule is selected (level rules only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
}

impl CastingRule {
    pub fn new(pattern: impl Into<String>, kind: ParserKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            level: None,
        }
    }

    /// A level rule selected when `pattern` occurs in the captured text
    pub fn level(pattern: impl Into<String>, level: LogLevel) -> Self {
        Self {
            pattern: pattern.into(),
            kind: ParserKind::LogLevel,
            level: Some(level),
        }
    }

    /// The fallback level rule
    pub fn default_level(level: LogLevel) -> Self {
        Self::level(DEFAULT_PATTERN, level)
    }

    pub fn is_default(&self) -> bool {
        self.pattern == DEFAULT_PATTERN
    }
}

/// Schema entry describing one named capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Semantic {
    pub property: String,
    pub kind: ParserKind,
    pub rules: Vec<CastingRule>,
}

impl Semantic {
    pub fn new(property: impl Into<String>, kind: ParserKind) -> Self {
        Self {
            property: property.into(),
            kind,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: CastingRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn default_rule(&self) -> Option<&CastingRule> {
        self.rules.iter().find(|rule| rule.is_default())
    }

    /// Whether the property carries user-defined level rules rather than
    /// relying on the built-in level vocabulary
    pub fn has_custom_rules(&self) -> bool {
        self.rules.len() > 1
    }
}

/// Parsed grok template
#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    /// Regular expression text emitted unchanged
    Literal(String),
    /// `%{NAME}`, `%{NAME:property}` or `%{NAME:property:casts}`
    MacroReference {
        name: String,
        binding: Option<Semantic>,
    },
    Sequence(Vec<PatternNode>),
}

impl PatternNode {
    /// Number of property bindings in this subtree
    pub fn binding_count(&self) -> usize {
        match self {
            PatternNode::Literal(_) => 0,
            PatternNode::MacroReference { binding, .. } => usize::from(binding.is_some()),
            PatternNode::Sequence(nodes) => nodes.iter().map(PatternNode::binding_count).sum(),
        }
    }
}

/// Result of compiling a grok template: a regular expression with named
/// capture groups and the ordered schema of those captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledTemplate {
    regex: String,
    schema: Vec<Semantic>,
}

impl CompiledTemplate {
    pub(crate) fn new(regex: String, schema: Vec<Semantic>) -> Self {
        Self { regex, schema }
    }

    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn schema(&self) -> &[Semantic] {
        &self.schema
    }

    pub fn semantic(&self, property: &str) -> Option<&Semantic> {
        self.schema.iter().find(|s| s.property == property)
    }

    pub fn has_property(&self, kind: ParserKind) -> bool {
        self.property_of(kind).is_some()
    }

    /// Name of the first property cast to `kind`
    pub fn property_of(&self, kind: ParserKind) -> Option<&str> {
        property_of(&self.schema, kind)
    }
}

pub(crate) fn property_of(schema: &[Semantic], kind: ParserKind) -> Option<&str> {
    schema
        .iter()
        .find(|s| s.kind == kind)
        .map(|s| s.property.as_str())
}
