use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Message severity, ordered from the least to the most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i64)]
pub enum LogLevel {
    #[default]
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

#[derive(Debug, Error)]
#[error("Unknown log level '{0}'. Valid levels are: trace, debug, info, warn, error, fatal")]
pub struct LevelParseError(pub String);

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Match a level name or one of its common synonyms, ignoring case
    pub fn from_vocabulary(s: &str) -> Option<LogLevel> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Some(LogLevel::Trace),
            "DEBUG" | "DEBUGGING" => Some(LogLevel::Debug),
            "INFO" | "NOTICE" | "INFORMATIONAL" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" | "ERR" | "CRITICAL" => Some(LogLevel::Error),
            "FATAL" | "SEVERE" | "EMERG" | "EMERGENCY" | "PANIC" | "ALERT" => {
                Some(LogLevel::Fatal)
            }
            _ => None,
        }
    }

    /// Numeric encoding stored in integer message properties
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<LogLevel> {
        LogLevel::ALL.into_iter().find(|level| level.as_i64() == value)
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::from_vocabulary(s).ok_or_else(|| LevelParseError(s.to_string()))
    }
}
