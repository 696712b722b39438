use crate::grok::{DEFAULT_MAX_DEPTH, GrokCompiler, GrokMatcher, MacroLibrary};
use crate::message::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Header template of NLog-style logs: `[timestamp] ... LEVEL ...`
pub const DEFAULT_TEMPLATE: &str =
    r"^\[?%{TIMESTAMP_ISO8601:Occured:DateTime}\]?%{DATA}%{LOGLEVEL:Level:LogLevel}%{DATA}";

const BUILTIN_PROFILES: &[(&str, &str)] = &[
    (
        "nlog",
        r#"
profile_name = "nlog"
template = '^\[?%{TIMESTAMP_ISO8601:Occured:DateTime}\]?%{DATA}%{LOGLEVEL:Level:LogLevel}%{DATA}'
default_level = "TRACE"
"#,
    ),
    (
        "apache",
        r#"
profile_name = "apache"
template = '^%{COMMONAPACHELOG}'
default_level = "INFO"
"#,
    ),
    (
        "syslog",
        r#"
profile_name = "syslog"
template = '^%{SYSLOGTIMESTAMP:timestamp} %{IPORHOST:host} %{SYSLOGPROG}:'
default_level = "INFO"

[macros]
SYSLOGPROG = '%{PROG:program}(?:\[%{POSINT:pid:Integer}\])?'
PROG = '[\w._/%-]+'
"#,
    ),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to read pattern file '{path}': {source}")]
    PatternFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown profile '{name}'. Built-ins: {available}")]
    UnknownProfile { name: String, available: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrokConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    /// Grok template matching the first line of every message
    pub template: String,
    /// Level used when a level capture is not recognized
    pub default_level: LogLevel,
    pub max_depth: usize,
    /// Start from the built-in macro set before adding pattern files
    pub use_builtin_macros: bool,
    /// Files of `NAME fragment` definitions, loaded in order
    pub pattern_files: Vec<PathBuf>,
    /// Inline macro definitions, applied after the pattern files
    pub macros: BTreeMap<String, String>,
}

impl Default for GrokConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
            default_level: LogLevel::Trace,
            max_depth: DEFAULT_MAX_DEPTH,
            use_builtin_macros: true,
            pattern_files: Vec::new(),
            macros: BTreeMap::new(),
        }
    }
}

impl GrokConfig {
    /// Assemble the macro library this profile describes
    pub fn build_library(&self) -> Result<MacroLibrary, ConfigError> {
        let mut library = if self.use_builtin_macros {
            MacroLibrary::with_defaults()
        } else {
            MacroLibrary::new()
        };

        for path in &self.pattern_files {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::PatternFile {
                path: path.display().to_string(),
                source,
            })?;
            library.extend(MacroLibrary::parse_definitions(&text));
        }

        library.extend(self.macros.clone());
        Ok(library)
    }

    pub fn compiler<'a>(&self, library: &'a MacroLibrary) -> GrokCompiler<'a> {
        GrokCompiler::new(library).with_max_depth(self.max_depth)
    }

    /// Matcher for `template`, or for the profile's template when `None`
    pub fn matcher(&self, library: &MacroLibrary, template: Option<&str>) -> GrokMatcher {
        let template = template.unwrap_or(&self.template);
        GrokMatcher::with_compiler(template, &self.compiler(library))
    }
}

pub fn load_config(path: Option<&Path>) -> Result<GrokConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

/// Load a profile from a TOML file. Relative pattern files are resolved
/// against the directory of the config file.
pub fn load_config_from_path(path: &Path) -> Result<GrokConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let mut config = toml::from_str::<GrokConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })?;

    if let Some(base) = path.parent() {
        for file in &mut config.pattern_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }
    Ok(config)
}

pub fn default_config() -> &'static GrokConfig {
    static DEFAULT_CONFIG: LazyLock<GrokConfig> = LazyLock::new(GrokConfig::default);
    &DEFAULT_CONFIG
}

pub fn builtin_profile_names() -> Vec<&'static str> {
    BUILTIN_PROFILES.iter().map(|(name, _)| *name).collect()
}

/// Look up a built-in profile by case-insensitive name
pub fn load_builtin_profile(name: &str) -> Result<GrokConfig, ConfigError> {
    let (profile, raw) = BUILTIN_PROFILES
        .iter()
        .find(|(profile, _)| profile.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownProfile {
            name: name.to_string(),
            available: builtin_profile_names().join(", "),
        })?;
    parse_profile(profile, raw)
}

fn parse_profile(name: &str, raw: &str) -> Result<GrokConfig, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: format!("<built-in profile {name}>"),
        source,
    })
}

/// Resolve the effective profile: a config file wins over a built-in
/// profile name, and the default profile is used when neither is given.
pub fn resolve_config(path: Option<&Path>, profile: Option<&str>) -> Result<GrokConfig, ConfigError> {
    match (path, profile) {
        (None, Some(name)) => load_builtin_profile(name),
        _ => load_config(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_parse() {
        for name in builtin_profile_names() {
            let config = load_builtin_profile(name).expect("built-in profile should parse");
            assert_eq!(config.profile_name, name);
            assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
            let library = config.build_library().unwrap();
            let matcher = config.matcher(&library, None);
            assert!(!matcher.compilation_failed(), "profile {name} failed to compile");
        }
    }

    #[test]
    fn test_unknown_profile() {
        let err = resolve_config(None, Some("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { .. }));
        assert!(err.to_string().contains("nlog"));
    }

    #[test]
    fn test_broken_profile_reports_parse_error() {
        let err = parse_profile("broken", "template = [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.contains("broken")));
    }
}
