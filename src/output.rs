//! Text and JSON rendering for the command-line front end.

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::grok::{CompiledTemplate, MacroLibrary, ParserKind, Semantic};
use crate::message::{LogLevel, LogRecord};

const HEADER_WIDTH: usize = 80;

/// Lines of a file in which at least one keyword was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHit {
    pub line: usize,
    pub keywords: Vec<String>,
    pub text: String,
}

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

pub fn colorize_level(level: LogLevel) -> ColoredString {
    let name = level.name();
    match level {
        LogLevel::Fatal => name.red().bold().reversed(),
        LogLevel::Error => name.red().bold(),
        LogLevel::Warn => name.yellow().bold(),
        LogLevel::Info => name.green(),
        LogLevel::Debug => name.blue(),
        LogLevel::Trace => name.dimmed(),
    }
}

fn describe_rules(semantic: &Semantic) -> String {
    semantic
        .rules
        .iter()
        .map(|rule| {
            let pattern = if rule.is_default() {
                rule.pattern.clone()
            } else {
                format!("\"{}\"", rule.pattern)
            };
            match rule.level {
                Some(level) => format!("{pattern} -> {level}"),
                None => pattern,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_compiled_text(grok: &str, compiled: &CompiledTemplate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Template:".bold(), grok);
    let _ = writeln!(out, "{} {}", "Regex:".bold(), compiled.regex());

    if compiled.schema().is_empty() {
        let _ = writeln!(out, "No properties captured");
        return out;
    }

    let mut table = create_styled_table(&["#", "Property", "Kind", "Rules"]);
    for (ix, semantic) in compiled.schema().iter().enumerate() {
        table.add_row(vec![
            Cell::new(ix + 1),
            Cell::new(&semantic.property),
            Cell::new(format!("{:?}", semantic.kind)),
            Cell::new(describe_rules(semantic)),
        ]);
    }
    let _ = writeln!(out, "{table}");
    out
}

pub fn format_compiled_json(grok: &str, compiled: &CompiledTemplate) -> String {
    let value = serde_json::json!({
        "template": grok,
        "regex": compiled.regex(),
        "schema": compiled.schema(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

fn property_cell(record: &LogRecord, semantic: &Semantic) -> Cell {
    match semantic.kind {
        ParserKind::PlainString => Cell::new(record.string_property(&semantic.property)),
        ParserKind::Integer => match record.integer_properties().get(&semantic.property) {
            Some(value) => Cell::new(value),
            None => Cell::new(""),
        },
        ParserKind::Datetime => match record.timestamp(&semantic.property) {
            Some(ts) => Cell::new(ts.format("%Y-%m-%d %H:%M:%S%.3f")),
            None => Cell::new(""),
        },
        ParserKind::LogLevel => match record.level(&semantic.property) {
            Some(level) => Cell::new(colorize_level(level)),
            None => Cell::new(""),
        },
    }
}

/// Render records as a table with one column per schema property
pub fn format_records_text(records: &[LogRecord], schema: &[Semantic]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(HEADER_WIDTH).cyan());
    let _ = writeln!(out, "{}", format!("MESSAGES ({})", records.len()).cyan().bold());
    let _ = writeln!(out, "{}", "=".repeat(HEADER_WIDTH).cyan());

    if records.is_empty() {
        let _ = writeln!(out, "No messages found");
        return out;
    }

    let mut headers = vec!["#"];
    headers.extend(schema.iter().map(|s| s.property.as_str()));
    headers.push("Header");
    headers.push("Body lines");

    let mut table = create_styled_table(&headers);
    for (ix, record) in records.iter().enumerate() {
        let mut row = vec![Cell::new(ix + 1)];
        row.extend(schema.iter().map(|semantic| property_cell(record, semantic)));
        row.push(Cell::new(truncate_string(record.header(), 60)));
        let body_lines = if record.body().is_empty() {
            0
        } else {
            record.body().lines().count()
        };
        row.push(Cell::new(body_lines));
        table.add_row(row);
    }
    let _ = writeln!(out, "{table}");
    out
}

/// JSON view of a record with timestamps and levels decoded
#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a LogRecord,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    timestamps: BTreeMap<&'a str, DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    levels: BTreeMap<&'a str, LogLevel>,
}

pub fn format_records_json(records: &[LogRecord], schema: &[Semantic]) -> String {
    let views: Vec<RecordView<'_>> = records
        .iter()
        .map(|record| {
            let mut view = RecordView {
                record,
                timestamps: BTreeMap::new(),
                levels: BTreeMap::new(),
            };
            for semantic in schema {
                let property = semantic.property.as_str();
                match semantic.kind {
                    ParserKind::Datetime => {
                        if let Some(ts) = record.timestamp(property) {
                            view.timestamps.insert(property, ts);
                        }
                    }
                    ParserKind::LogLevel => {
                        if let Some(level) = record.level(property) {
                            view.levels.insert(property, level);
                        }
                    }
                    _ => {}
                }
            }
            view
        })
        .collect();
    serde_json::to_string_pretty(&views).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_keyword_hits_text(hits: &[KeywordHit]) -> String {
    let mut out = String::new();
    if hits.is_empty() {
        let _ = writeln!(out, "No keywords found");
        return out;
    }

    let mut table = create_styled_table(&["Line", "Keywords", "Text"]);
    for hit in hits {
        table.add_row(vec![
            Cell::new(hit.line),
            Cell::new(hit.keywords.join(", ").yellow()),
            Cell::new(truncate_string(&hit.text, 80)),
        ]);
    }
    let _ = writeln!(out, "{table}");
    let _ = writeln!(out, "{} matching lines", hits.len());
    out
}

pub fn format_keyword_hits_json(hits: &[KeywordHit]) -> String {
    serde_json::to_string_pretty(hits).unwrap_or_else(|_| "[]".to_string())
}

fn filtered_macros<'a>(library: &'a MacroLibrary, filter: Option<&str>) -> Vec<(&'a str, &'a str)> {
    let filter = filter.map(str::to_uppercase);
    library
        .names()
        .into_iter()
        .filter(|name| filter.as_deref().is_none_or(|f| name.to_uppercase().contains(f)))
        .filter_map(|name| library.get(name).map(|fragment| (name, fragment)))
        .collect()
}

pub fn format_macros_text(library: &MacroLibrary, filter: Option<&str>) -> String {
    let macros = filtered_macros(library, filter);
    let mut table = create_styled_table(&["Macro", "Fragment"]);
    for (name, fragment) in &macros {
        table.add_row(vec![Cell::new(name.bold()), Cell::new(fragment)]);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{table}");
    let _ = writeln!(out, "{} of {} macros", macros.len(), library.len());
    out
}

pub fn format_macros_json(library: &MacroLibrary, filter: Option<&str>) -> String {
    let macros: serde_json::Map<String, serde_json::Value> = filtered_macros(library, filter)
        .into_iter()
        .map(|(name, fragment)| (name.to_string(), serde_json::Value::from(fragment)))
        .collect();
    serde_json::to_string_pretty(&macros).unwrap_or_else(|_| "{}".to_string())
}
