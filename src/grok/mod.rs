//! Grok template compilation and matching
//!
//! A grok template mixes regular-expression text with references to named
//! macros from a [`MacroLibrary`]. Compiling a template expands every
//! reference into one regular expression and records a typed schema entry
//! for each property a reference binds.
//!
//! # Syntax
//!
//! ```text
//! %{NAME}                          Expand macro NAME without capturing
//! %{NAME:prop}                     Capture into `prop` as a plain string
//! %{NAME:prop:Integer}             Capture and cast (Integer, DateTime, LogLevel)
//! %{NAME:prop:"E"->LogLevel.Error,*->LogLevel.Info}
//!                                  Level casting rules, first substring hit wins
//! ```
//!
//! # Examples
//!
//! ```text
//! ^%{TIMESTAMP_ISO8601:Occured:DateTime}%{DATA}%{LOGLEVEL:Level:LogLevel}%{DATA}
//! %{IPORHOST:client} %{NUMBER:status:Integer}
//! ```
//!
//! References to macros missing from the library are kept as the literal
//! text `%{NAME}`. A matcher whose template fails to compile degrades to
//! matching its template text literally instead of failing.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod library;
pub mod matcher;
pub mod parser;

pub use ast::{CastingRule, CompiledTemplate, DEFAULT_PATTERN, ParserKind, PatternNode, Semantic};
pub use compiler::{DEFAULT_MAX_DEPTH, GrokCompiler};
pub use error::GrokError;
pub use library::MacroLibrary;
pub use matcher::{GrokMatcher, RawMatch};
