use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::message::LogLevel;

/// Compile grok templates and extract typed fields from log files
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML profile with the template, macros and pattern files
    #[arg(long, global = true, env = "LOG_GROK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in profile to use when no config file is given (nlog, apache, syslog)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the output to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// When to colorize output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a grok template and show the regex and schema
    Compile {
        /// Template to compile; defaults to the profile template
        template: Option<String>,
    },
    /// Split a log file into messages and extract their properties
    Parse {
        /// Log file to read
        file: PathBuf,

        /// Header template; defaults to the profile template
        #[arg(short, long)]
        template: Option<String>,

        /// Stop after this many messages
        #[arg(short, long)]
        limit: Option<usize>,

        /// Drop messages below this level
        #[arg(long, value_parser = parse_level)]
        min_level: Option<LogLevel>,

        /// Drop messages above this level
        #[arg(long, value_parser = parse_level)]
        max_level: Option<LogLevel>,

        /// Keep only messages whose header or body contains one of these keywords
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Keep only messages whose header or body matches this regular expression
        #[arg(long, value_name = "REGEX")]
        filter: Option<String>,
    },
    /// Find lines containing any of the given keywords
    Keywords {
        /// File to scan
        file: PathBuf,

        /// Keyword to look for (repeatable)
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,

        /// Only report lines that start with a keyword
        #[arg(long)]
        starts_with: bool,
    },
    /// List the macros available to templates
    Macros {
        /// Case-insensitive substring of the macro name
        #[arg(long)]
        filter: Option<String>,
    },
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    s.parse::<LogLevel>().map_err(|e| e.to_string())
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
