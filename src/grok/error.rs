use thiserror::Error;

/// Errors that can occur when compiling a grok template
#[derive(Debug, Error)]
pub enum GrokError {
    #[error("Syntax error at position {position}: {message} (current token: '{token}')")]
    Syntax {
        message: String,
        token: String,
        position: usize,
    },

    #[error("Syntax error in macro '{name}': {source}")]
    MacroSyntax {
        name: String,
        #[source]
        source: Box<GrokError>,
    },

    #[error("Unused property detected: '{0}' is never consumed by a known macro")]
    DanglingProperty(String),

    #[error("Unused casting rule detected: '{0}'")]
    DanglingRule(String),

    #[error("Property '{0}' is declared more than once")]
    DuplicateProperty(String),

    #[error("Property '{0}' mixes casting rules of different parser kinds")]
    ConflictingCasts(String),

    #[error("Property '{0}' has custom level rules but no '*' default rule")]
    MissingDefaultRule(String),

    #[error("Property '{0}' declares more than one '*' default rule")]
    DuplicateDefaultRule(String),

    #[error("Casting rule \"{pattern}\" of property '{property}' does not name a level")]
    RuleWithoutLevel { property: String, pattern: String },

    #[error("Unknown log level '{0}' in casting rule")]
    UnknownLevel(String),

    #[error("Macro '{name}' references itself through {}", .chain.join(" -> "))]
    RecursiveMacro { name: String, chain: Vec<String> },

    #[error("Macro '{name}' exceeds the maximum expansion depth of {limit}")]
    RecursionTooDeep { name: String, limit: usize },
}

impl GrokError {
    pub(crate) fn syntax(message: impl Into<String>, token: impl Into<String>, position: usize) -> Self {
        GrokError::Syntax {
            message: message.into(),
            token: token.into(),
            position,
        }
    }
}
