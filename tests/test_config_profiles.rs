use log_grok::config::{
    ConfigError, GrokConfig, builtin_profile_names, default_config, load_builtin_profile,
    load_config, load_config_from_path, resolve_config,
};
use log_grok::grok::DEFAULT_MAX_DEPTH;
use log_grok::message::LogLevel;
use log_grok::reader::MessageReader;
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

#[test]
fn test_default_config_matches_nlog_layout() {
    let config = default_config();
    assert_eq!(config.profile_name, "base");
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert!(config.use_builtin_macros);

    let library = config.build_library().unwrap();
    let matcher = config.matcher(&library, None);
    assert!(!matcher.compilation_failed());
    assert!(matcher.is_match("2024-05-01 10:00:00.123 INFO started"));
}

#[test]
fn test_load_config_without_path_is_default() {
    let config = load_config(None).unwrap();
    assert_eq!(config.profile_name, default_config().profile_name);
}

#[test]
fn test_builtin_profiles() {
    assert_eq!(builtin_profile_names(), vec!["nlog", "apache", "syslog"]);
    assert!(load_builtin_profile("APACHE").is_ok());
    assert!(matches!(
        load_builtin_profile("log4j"),
        Err(ConfigError::UnknownProfile { .. })
    ));
}

#[test]
fn test_syslog_profile_uses_inline_macros() {
    let config = load_builtin_profile("syslog").unwrap();
    let library = config.build_library().unwrap();
    let matcher = config.matcher(&library, None);
    assert!(!matcher.compilation_failed());

    let raw = matcher
        .parse("Oct 11 22:14:15 mymachine su[230]: 'su root' failed for lonvick")
        .unwrap();
    assert_eq!(raw.get("host"), Some("mymachine"));
    assert_eq!(raw.get("program"), Some("su"));
    assert_eq!(raw.get("pid"), Some("230"));
}

#[test]
fn test_partial_config_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.toml");
    fs::write(
        &path,
        "profile_name = \"custom\"\ntemplate = '^%{INT:id:Integer} %{LOGLEVEL:lvl:LogLevel}'\ndefault_level = \"WARN\"\n",
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.profile_name, "custom");
    assert_eq!(config.default_level, LogLevel::Warn);
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert!(config.use_builtin_macros);
    assert!(config.pattern_files.is_empty());
}

#[test]
fn test_pattern_files_resolve_relative_to_config() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("patterns")).unwrap();
    fs::write(
        dir.path().join("patterns").join("app.grok"),
        "# application patterns\nREQID req-[0-9a-f]+\nAPPLINE %{REQID:request} %{GREEDYDATA:text}\n",
    )
    .unwrap();
    let path = dir.path().join("app.toml");
    fs::write(
        &path,
        "template = '^%{APPLINE}'\npattern_files = [\"patterns/app.grok\"]\n\n[macros]\nREQID = 'req-[0-9]+'\n",
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.pattern_files, vec![dir.path().join("patterns/app.grok")]);

    let library = config.build_library().unwrap();
    // inline macros override pattern files
    assert_eq!(library.get("REQID"), Some("req-[0-9]+"));

    let matcher = config.matcher(&library, None);
    let records = MessageReader::new(&matcher, config.default_level)
        .read_all(Cursor::new("req-42 hello\nreq-ab nope\n"))
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].string_property("request"), "req-42");
    assert_eq!(records[0].body(), "req-ab nope");
}

#[test]
fn test_custom_library_without_builtins() {
    let config = GrokConfig {
        use_builtin_macros: false,
        macros: [("DIGITS".to_string(), "[0-9]+".to_string())].into(),
        ..GrokConfig::default()
    };
    let library = config.build_library().unwrap();
    assert_eq!(library.len(), 1);
    // the default template references macros that are now missing
    assert!(config.matcher(&library, None).compilation_failed());
    assert!(!config.matcher(&library, Some("%{DIGITS:n}")).compilation_failed());
}

#[test]
fn test_errors_name_the_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = load_config_from_path(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("missing.toml"));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "max_depth = \"deep\"\n").unwrap();
    assert!(matches!(
        load_config_from_path(&broken),
        Err(ConfigError::Parse { .. })
    ));

    let config = GrokConfig {
        pattern_files: vec![dir.path().join("nope.grok")],
        ..GrokConfig::default()
    };
    assert!(matches!(
        config.build_library(),
        Err(ConfigError::PatternFile { .. })
    ));
}

#[test]
fn test_config_file_wins_over_profile() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mine.toml");
    fs::write(&path, "profile_name = \"mine\"\n").unwrap();
    let config = resolve_config(Some(path.as_path()), Some("apache")).unwrap();
    assert_eq!(config.profile_name, "mine");
    assert_eq!(resolve_config(None, Some("apache")).unwrap().profile_name, "apache");
}
