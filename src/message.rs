use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::grok::{ParserKind, RawMatch, Semantic};

mod casting;
mod level;

pub use casting::{cast_datetime, cast_integer, cast_level, from_file_time, parse_datetime, to_file_time};
pub use level::{LevelParseError, LogLevel};

/// A message being assembled from consecutive lines.
///
/// The first line becomes the header, every following line is appended to
/// the body. Call [`LogMessage::finalize`] once the message is complete.
#[derive(Debug, Clone, Default)]
pub struct LogMessage {
    header: Option<String>,
    body: String,
    raw: Option<RawMatch>,
}

impl LogMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: &str) {
        if self.header.is_none() {
            self.header = Some(line.to_string());
        } else {
            self.body.push_str(line);
            self.body.push('\n');
        }
    }

    /// Attach the properties the header matcher extracted
    pub fn add_properties(&mut self, raw: RawMatch) {
        self.raw = Some(raw);
    }

    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or_default()
    }

    /// Body lines so far, each terminated by a newline
    pub fn body(&self) -> &str {
        if self.body == "\n" { "" } else { &self.body }
    }

    pub fn has_header(&self) -> bool {
        self.raw.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.header().trim().is_empty() && self.body.is_empty()
    }

    /// Fix header and body and apply the schema's casts to the extracted
    /// properties.
    ///
    /// Properties that are not in the schema, and values that cannot be
    /// converted to their kind, are left out of the record.
    pub fn finalize(self, schema: &[Semantic], default_level: LogLevel) -> LogRecord {
        let mut record = LogRecord {
            header: self.header.unwrap_or_default(),
            body: self.body,
            has_header: self.raw.is_some(),
            integer_properties: BTreeMap::new(),
            string_properties: BTreeMap::new(),
        };
        if record.body.ends_with('\n') {
            record.body.pop();
        }

        let Some(raw) = self.raw else {
            return record;
        };

        for (property, value) in raw.iter() {
            let Some(semantic) = schema.iter().find(|s| s.property == property) else {
                continue;
            };
            match semantic.kind {
                ParserKind::PlainString => {
                    record.string_properties.insert(property.to_string(), value.to_string());
                }
                ParserKind::Integer => {
                    if let Some(n) = cast_integer(value) {
                        record.integer_properties.insert(property.to_string(), n);
                    }
                }
                ParserKind::Datetime => {
                    if let Some(ticks) = cast_datetime(value) {
                        record.integer_properties.insert(property.to_string(), ticks);
                    }
                }
                ParserKind::LogLevel => {
                    let level = cast_level(value, semantic, default_level);
                    record
                        .integer_properties
                        .insert(property.to_string(), level.as_i64());
                }
            }
        }
        record
    }
}

/// A finalized message with typed properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    header: String,
    body: String,
    has_header: bool,
    integer_properties: BTreeMap<String, i64>,
    string_properties: BTreeMap<String, String>,
}

impl LogRecord {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Integer, timestamp or level value of `property`, 0 when absent
    pub fn integer_property(&self, property: &str) -> i64 {
        self.integer_properties.get(property).copied().unwrap_or_default()
    }

    /// String value of `property`, empty when absent
    pub fn string_property(&self, property: &str) -> &str {
        self.string_properties
            .get(property)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn integer_properties(&self) -> &BTreeMap<String, i64> {
        &self.integer_properties
    }

    pub fn string_properties(&self) -> &BTreeMap<String, String> {
        &self.string_properties
    }

    pub fn level(&self, property: &str) -> Option<LogLevel> {
        self.integer_properties
            .get(property)
            .and_then(|&v| LogLevel::from_i64(v))
    }

    pub fn timestamp(&self, property: &str) -> Option<DateTime<Utc>> {
        self.integer_properties
            .get(property)
            .and_then(|&ticks| from_file_time(ticks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulating_body_keeps_newline() {
        let mut message = LogMessage::new();
        message.add_line("h");
        message.add_line("b");
        assert!(!message.is_empty());
        assert_eq!(message.header(), "h");
        assert_eq!(message.body(), "b\n");

        let record = message.finalize(&[], LogLevel::Trace);
        assert_eq!(record.header(), "h");
        assert_eq!(record.body(), "b");
        assert!(!record.has_header());
    }

    #[test]
    fn test_empty_lines_are_not_empty_message() {
        let mut message = LogMessage::new();
        assert!(message.is_empty());
        message.add_line("");
        message.add_line("");
        assert!(!message.is_empty());
        assert_eq!(message.header(), "");
        assert_eq!(message.body(), "");
    }

    #[test]
    fn test_unparseable_integer_is_omitted() {
        let schema = vec![Semantic::new("n", ParserKind::Integer)];
        let mut message = LogMessage::new();
        message.add_line("h");
        message.add_properties([("n", "x1")].into_iter().collect());
        let record = message.finalize(&schema, LogLevel::Trace);
        assert!(record.has_header());
        assert!(record.integer_properties().is_empty());
        assert_eq!(record.integer_property("n"), 0);
    }
}
