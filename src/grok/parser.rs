//! Recursive descent parser for grok templates.

use super::ast::{CastingRule, DEFAULT_PATTERN, ParserKind, PatternNode, Semantic};
use super::error::GrokError;
use super::library::MacroLibrary;
use crate::message::LogLevel;
use tracing::debug;

const END_OF_INPUT: &str = "<end of input>";

/// Parse a grok template into a [`PatternNode`] tree.
///
/// The library is consulted only to decide whether a reference can consume
/// its property binding; macro bodies are not expanded here.
pub fn parse(input: &str, library: &MacroLibrary) -> Result<PatternNode, GrokError> {
    let mut parser = Parser {
        input,
        pos: 0,
        library,
        state: ParseState::default(),
    };
    let root = parser.parse_template()?;
    parser.state.finish()?;
    Ok(root)
}

/// Scratch state of one parse invocation.
///
/// Casting rules are pushed as they are read and drained into the property
/// they annotate; the property binding then waits on its own stack until the
/// macro reference consumes it.
#[derive(Debug, Default)]
struct ParseState {
    rules: Vec<CastingRule>,
    properties: Vec<Semantic>,
}

impl ParseState {
    fn add_rule(&mut self, rule: CastingRule) {
        self.rules.push(rule);
    }

    fn on_semantic(&mut self, property: String) -> Result<(), GrokError> {
        let rules: Vec<CastingRule> = self.rules.drain(..).collect();
        let kind = rules.first().map(|r| r.kind).unwrap_or_default();

        if rules.iter().any(|r| r.kind != kind) {
            return Err(GrokError::ConflictingCasts(property));
        }

        if kind == ParserKind::LogLevel && rules.len() > 1 {
            match rules.iter().filter(|r| r.is_default()).count() {
                0 => return Err(GrokError::MissingDefaultRule(property)),
                1 => {}
                _ => return Err(GrokError::DuplicateDefaultRule(property)),
            }
            if let Some(rule) = rules.iter().find(|r| r.level.is_none()) {
                if rule.is_default() {
                    return Err(GrokError::MissingDefaultRule(property));
                }
                return Err(GrokError::RuleWithoutLevel {
                    property,
                    pattern: rule.pattern.clone(),
                });
            }
        }

        if let [rule] = rules.as_slice() {
            if let (ParserKind::LogLevel, Some(level)) = (rule.kind, rule.level) {
                debug!(
                    property = %property,
                    level = %level,
                    "single level rule; level is ignored and the vocabulary is used"
                );
            }
        }

        self.properties.push(Semantic {
            property,
            kind,
            rules,
        });
        Ok(())
    }

    fn on_pattern(&mut self, name: String, bound: bool, library: &MacroLibrary) -> PatternNode {
        // An unknown macro is passed through verbatim and leaves its
        // binding on the stack.
        let binding = if bound && library.contains(&name) {
            self.properties.pop()
        } else {
            None
        };
        PatternNode::MacroReference { name, binding }
    }

    fn finish(self) -> Result<(), GrokError> {
        if let Some(semantic) = self.properties.into_iter().next() {
            return Err(GrokError::DanglingProperty(semantic.property));
        }
        if let Some(rule) = self.rules.into_iter().next() {
            return Err(GrokError::DanglingRule(rule.pattern));
        }
        Ok(())
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    library: &'a MacroLibrary,
    state: ParseState,
}

impl<'a> Parser<'a> {
    fn parse_template(&mut self) -> Result<PatternNode, GrokError> {
        let mut nodes = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            if self.rest().starts_with("%{") {
                if !literal.is_empty() {
                    nodes.push(PatternNode::Literal(std::mem::take(&mut literal)));
                }
                nodes.push(self.parse_reference()?);
            } else {
                literal.push(c);
                self.pos += c.len_utf8();
            }
        }

        if !literal.is_empty() {
            nodes.push(PatternNode::Literal(literal));
        }
        Ok(PatternNode::Sequence(nodes))
    }

    fn parse_reference(&mut self) -> Result<PatternNode, GrokError> {
        self.pos += 2; // consume "%{"

        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if name.is_empty() {
            return Err(self.error("expected macro name after '%{'"));
        }

        let mut bound = false;
        if self.eat(':') {
            let property = self.parse_property()?;
            if self.eat(':') {
                loop {
                    let rule = self.parse_cast()?;
                    self.state.add_rule(rule);
                    self.skip_space();
                    if !self.eat(',') {
                        break;
                    }
                }
            }
            self.state.on_semantic(property)?;
            bound = true;
        }

        self.skip_space();
        if !self.eat('}') {
            return Err(self.error("expected '}' to close macro reference"));
        }

        Ok(self.state.on_pattern(name.to_string(), bound, self.library))
    }

    fn parse_property(&mut self) -> Result<String, GrokError> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return Err(self.error("expected property name")),
        }
        let property = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        Ok(property.to_string())
    }

    /// Parse `KIND`, `"pattern" -> KIND` or `* -> KIND`.
    fn parse_cast(&mut self) -> Result<CastingRule, GrokError> {
        self.skip_space();

        let pattern = match self.peek() {
            Some('"') => Some(self.parse_quoted()?),
            Some('*') => {
                self.pos += 1;
                Some(DEFAULT_PATTERN.to_string())
            }
            _ => None,
        };

        if pattern.is_some() {
            self.skip_space();
            if !self.rest().starts_with("->") {
                return Err(self.error("expected '->' after casting rule pattern"));
            }
            self.pos += 2;
            self.skip_space();
        }

        let kind_start = self.pos;
        let kind_name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if kind_name.is_empty() {
            return Err(self.error("expected parser kind"));
        }

        let pattern = pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string());
        let (head, tail) = match kind_name.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (kind_name, None),
        };

        match (ParserKind::from_name(head), tail) {
            (ParserKind::LogLevel, Some(level)) => {
                let level = LogLevel::from_vocabulary(level)
                    .ok_or_else(|| GrokError::UnknownLevel(level.to_string()))?;
                Ok(CastingRule::level(pattern, level))
            }
            (ParserKind::LogLevel, None) => Ok(CastingRule::new(pattern, ParserKind::LogLevel)),
            (kind, None) => Ok(CastingRule::new(pattern, kind)),
            (_, Some(_)) => Err(GrokError::syntax(
                "only LogLevel accepts a level suffix",
                kind_name,
                kind_start,
            )),
        }
    }

    fn parse_quoted(&mut self) -> Result<String, GrokError> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                Some(c) => value.push(c),
                None => break,
            }
        }
        Err(GrokError::syntax(
            "unterminated string in casting rule",
            END_OF_INPUT,
            start,
        ))
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_space(&mut self) {
        self.take_while(|c| c == ' ' || c == '\t');
    }

    fn error(&self, message: &str) -> GrokError {
        let token = self
            .peek()
            .map(String::from)
            .unwrap_or_else(|| END_OF_INPUT.to_string());
        GrokError::syntax(message, token, self.pos)
    }
}
