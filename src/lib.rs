pub mod cli;
pub mod config;
pub mod grok;
pub mod message;
pub mod output;
pub mod reader;
pub mod strings;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, IsTerminal};
use std::path::Path;
use tracing::{debug, warn};

pub use cli::{Cli, ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{ConfigError, GrokConfig};
pub use grok::{
    CastingRule, CompiledTemplate, GrokCompiler, GrokError, GrokMatcher, MacroLibrary, ParserKind,
    RawMatch, Semantic,
};
pub use message::{LogLevel, LogMessage, LogRecord};
pub use reader::MessageReader;
pub use strings::AhoCorasickTree;

use crate::output::KeywordHit;

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    // A subscriber may already be installed when run() is called twice
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn write_output_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    if let Some(path) = output {
        write_output_file(path, content)?;
    }
    Ok(())
}

fn open_input(path: &Path, show_progress: bool) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    if !show_progress {
        return Ok(Box::new(BufReader::new(file)));
    }

    let len = file.metadata().map(|m| m.len()).unwrap_or_default();
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {bytes}/{total_bytes}")
    {
        bar.set_style(style);
    }
    Ok(Box::new(BufReader::new(bar.wrap_read(file))))
}

/// Records that pass the level range, keyword and text filters of `parse`
struct RecordFilter<'a> {
    level_property: Option<&'a str>,
    default_level: LogLevel,
    min_level: Option<LogLevel>,
    max_level: Option<LogLevel>,
    keywords: Option<AhoCorasickTree>,
    text: Option<Regex>,
}

impl RecordFilter<'_> {
    fn accepts(&self, record: &LogRecord) -> bool {
        if self.min_level.is_some() || self.max_level.is_some() {
            let level = self
                .level_property
                .and_then(|property| record.level(property))
                .unwrap_or(self.default_level);
            if self.min_level.is_some_and(|min| level < min)
                || self.max_level.is_some_and(|max| level > max)
            {
                return false;
            }
        }

        if let Some(tree) = &self.keywords {
            if !tree.contains(record.header()) && !tree.contains(record.body()) {
                return false;
            }
        }

        match &self.text {
            Some(regex) => regex.is_match(record.header()) || regex.is_match(record.body()),
            None => true,
        }
    }
}

fn scan_keywords(path: &Path, keywords: &[String], starts_with: bool) -> Result<Vec<KeywordHit>> {
    let tree = AhoCorasickTree::new(keywords);
    let file =
        File::open(path).with_context(|| format!("Failed to open file '{}'", path.display()))?;

    let mut hits = Vec::new();
    for (ix, line) in reader::lossy_lines(BufReader::new(file)).enumerate() {
        let line = line.with_context(|| format!("Failed to read '{}'", path.display()))?;
        let found: Vec<String> = if starts_with {
            if !tree.contains_that_start(&line) {
                continue;
            }
            tree.keywords()
                .iter()
                .filter(|k| line.starts_with(k.as_str()))
                .cloned()
                .collect()
        } else {
            if !tree.contains(&line) {
                continue;
            }
            let mut found: Vec<String> = Vec::new();
            for keyword in tree.find_all(&line) {
                if !found.iter().any(|k| k == keyword) {
                    found.push(keyword.to_string());
                }
            }
            found
        };
        hits.push(KeywordHit {
            line: ix + 1,
            keywords: found,
            text: line,
        });
    }
    Ok(hits)
}

pub fn run() -> Result<()> {
    let cli = cli_parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let config = config::resolve_config(cli.config.as_deref(), cli.profile.as_deref())
        .context("Failed to load config")?;
    debug!(profile = %config.profile_name, config = ?cli.config, "loaded profile");

    let library = config
        .build_library()
        .context("Failed to build macro library")?;
    let format = cli.format;
    let output = cli.output.as_deref();

    match &cli.command {
        Commands::Compile { template } => {
            let grok = template.as_deref().unwrap_or(&config.template);
            let compiled = config
                .compiler(&library)
                .compile(grok)
                .with_context(|| format!("Failed to compile template '{grok}'"))?;
            let text = match format {
                OutputFormat::Text => output::format_compiled_text(grok, &compiled),
                OutputFormat::Json => output::format_compiled_json(grok, &compiled),
            };
            emit(&text, output)?;
        }
        Commands::Parse {
            file,
            template,
            limit,
            min_level,
            max_level,
            keywords,
            filter: text_filter,
        } => {
            if let (Some(min), Some(max)) = (min_level, max_level) {
                if min > max {
                    bail!("Minimum level {min} is greater than maximum level {max}");
                }
            }
            let text = text_filter
                .as_deref()
                .map(Regex::new)
                .transpose()
                .context("Invalid --filter regular expression")?;

            let matcher = config.matcher(&library, template.as_deref());
            if matcher.compilation_failed() {
                warn!(
                    template = matcher.template(),
                    "template did not compile; message headers are matched literally"
                );
            }

            let filter = RecordFilter {
                level_property: grok::ast::property_of(matcher.schema(), ParserKind::LogLevel),
                default_level: config.default_level,
                min_level: *min_level,
                max_level: *max_level,
                keywords: (!keywords.is_empty()).then(|| AhoCorasickTree::new(keywords)),
                text,
            };

            let show_progress = !cli.quiet && std::io::stderr().is_terminal();
            let input = open_input(file, show_progress)?;

            let mut records = Vec::new();
            let total = MessageReader::new(&matcher, config.default_level)
                .read(input, |record| {
                    if limit.is_none_or(|limit| records.len() < limit) && filter.accepts(&record) {
                        records.push(record);
                    }
                })
                .with_context(|| format!("Failed to read log file '{}'", file.display()))?;
            debug!(total, kept = records.len(), "parsed messages");

            let text = match format {
                OutputFormat::Text => output::format_records_text(&records, matcher.schema()),
                OutputFormat::Json => output::format_records_json(&records, matcher.schema()),
            };
            emit(&text, output)?;
        }
        Commands::Keywords {
            file,
            keywords,
            starts_with,
        } => {
            let hits = scan_keywords(file, keywords, *starts_with)?;
            let text = match format {
                OutputFormat::Text => output::format_keyword_hits_text(&hits),
                OutputFormat::Json => output::format_keyword_hits_json(&hits),
            };
            emit(&text, output)?;
        }
        Commands::Macros { filter } => {
            let text = match format {
                OutputFormat::Text => output::format_macros_text(&library, filter.as_deref()),
                OutputFormat::Json => output::format_macros_json(&library, filter.as_deref()),
            };
            emit(&text, output)?;
        }
    }

    if cli.verbose > 0 && !cli.quiet && format == OutputFormat::Text {
        eprintln!("{} {}", "Profile:".dimmed(), config.profile_name);
    }
    Ok(())
}
