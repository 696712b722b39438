use log_grok::grok::{
    CastingRule, DEFAULT_PATTERN, GrokCompiler, GrokError, MacroLibrary, ParserKind, Semantic,
};
use log_grok::message::LogLevel;

const NLOG_TEMPLATE: &str =
    r"^\[?%{TIMESTAMP_ISO8601:Occured:DateTime}\]?%{DATA}%{LOGLEVEL:Level:LogLevel}%{DATA}";

#[test]
fn test_compilation_is_deterministic() {
    let library = MacroLibrary::with_defaults();
    let compiler = GrokCompiler::new(&library);

    let first = compiler.compile(NLOG_TEMPLATE).unwrap();
    let second = compiler.compile(NLOG_TEMPLATE).unwrap();

    assert_eq!(first.regex(), second.regex());
    assert_eq!(first.schema(), second.schema());
}

#[test]
fn test_resolved_regex_has_no_references_left() {
    let library = MacroLibrary::with_defaults();
    let compiled = GrokCompiler::new(&library)
        .compile("%{COMMONAPACHELOG}")
        .unwrap();
    assert!(!compiled.regex().contains("%{"));
}

#[test]
fn test_nlog_schema() {
    let library = MacroLibrary::with_defaults();
    let compiled = GrokCompiler::new(&library).compile(NLOG_TEMPLATE).unwrap();

    let properties: Vec<&str> = compiled
        .schema()
        .iter()
        .map(|s| s.property.as_str())
        .collect();
    assert_eq!(properties, vec!["Occured", "Level"]);
    assert_eq!(compiled.semantic("Occured").unwrap().kind, ParserKind::Datetime);
    assert!(compiled.has_property(ParserKind::LogLevel));
    assert_eq!(compiled.property_of(ParserKind::LogLevel), Some("Level"));
    assert!(!compiled.has_property(ParserKind::Integer));
}

#[test]
fn test_schema_is_depth_first_outer_before_inner() {
    let library = MacroLibrary::load([
        ("PAIR", "%{WORD:key}=%{WORD:value}"),
        ("WORD", r"\w+"),
    ]);
    let compiled = GrokCompiler::new(&library)
        .compile("%{WORD:first} %{PAIR:pair} %{WORD:last}")
        .unwrap();
    let properties: Vec<&str> = compiled
        .schema()
        .iter()
        .map(|s| s.property.as_str())
        .collect();
    assert_eq!(properties, vec!["first", "pair", "key", "value", "last"]);
}

#[test]
fn test_level_rules_are_attached_in_order() {
    let library = MacroLibrary::with_defaults();
    let compiled = GrokCompiler::new(&library)
        .compile(r#"%{WORD:level:"E"->LogLevel.Error,"W"->LogLevel.Warn,*->LogLevel.Info}"#)
        .unwrap();

    let expected = Semantic::new("level", ParserKind::LogLevel)
        .with_rule(CastingRule::level("E", LogLevel::Error))
        .with_rule(CastingRule::level("W", LogLevel::Warn))
        .with_rule(CastingRule::level(DEFAULT_PATTERN, LogLevel::Info));
    assert_eq!(compiled.schema(), [expected]);
}

#[test]
fn test_unknown_macro_passes_through_literally() {
    let library = MacroLibrary::with_defaults();
    let compiled = GrokCompiler::new(&library)
        .compile("%{WORD:name} %{NOT_A_MACRO}")
        .unwrap();

    let regex = regex::Regex::new(compiled.regex()).unwrap();
    assert!(regex.is_match("alice %{NOT_A_MACRO}"));
    assert!(!regex.is_match("alice NOT_A_MACRO"));
    assert_eq!(compiled.schema().len(), 1);
}

#[test]
fn test_unknown_macro_with_binding_is_dangling() {
    let library = MacroLibrary::with_defaults();
    let err = GrokCompiler::new(&library)
        .compile("%{NOT_A_MACRO:prop}")
        .unwrap_err();
    assert!(matches!(err, GrokError::DanglingProperty(ref p) if p == "prop"));
}

#[test]
fn test_duplicate_property_is_rejected() {
    let library = MacroLibrary::with_defaults();
    let err = GrokCompiler::new(&library)
        .compile("%{WORD:a} %{INT:a}")
        .unwrap_err();
    assert!(matches!(err, GrokError::DuplicateProperty(ref p) if p == "a"));
}

#[test]
fn test_syntax_error_reports_token_and_position() {
    let library = MacroLibrary::with_defaults();
    match GrokCompiler::new(&library).compile("abc %{WORD:x:}") {
        Err(GrokError::Syntax {
            token, position, ..
        }) => {
            assert_eq!(token, "}");
            assert_eq!(position, 13);
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_level_rule_validation() {
    let library = MacroLibrary::with_defaults();
    let compiler = GrokCompiler::new(&library);

    assert!(matches!(
        compiler.compile(r#"%{WORD:l:"E"->LogLevel.Error,"W"->LogLevel.Warn}"#),
        Err(GrokError::MissingDefaultRule(_))
    ));
    assert!(matches!(
        compiler.compile(r#"%{WORD:l:*->LogLevel.Error,*->LogLevel.Warn}"#),
        Err(GrokError::DuplicateDefaultRule(_))
    ));
    assert!(matches!(
        compiler.compile(r#"%{WORD:l:"E"->LogLevel,*->LogLevel.Warn}"#),
        Err(GrokError::RuleWithoutLevel { .. })
    ));
    assert!(matches!(
        compiler.compile(r#"%{WORD:l:"E"->Integer,*->LogLevel.Warn}"#),
        Err(GrokError::ConflictingCasts(_))
    ));
    assert!(matches!(
        compiler.compile(r#"%{WORD:l:*->LogLevel.Loud}"#),
        Err(GrokError::UnknownLevel(ref l)) if l == "Loud"
    ));
}

#[test]
fn test_library_definitions_extend_defaults() {
    let mut library = MacroLibrary::with_defaults();
    let before = library.len();
    library.extend(MacroLibrary::parse_definitions(
        "# custom\nTHREAD \\[%{POSINT:thread:Integer}\\]\nWORD [a-z]+\n",
    ));
    assert_eq!(library.len(), before + 1);
    assert_eq!(library.get("WORD"), Some("[a-z]+"));

    let compiled = GrokCompiler::new(&library).compile("%{THREAD}").unwrap();
    assert_eq!(compiled.semantic("thread").unwrap().kind, ParserKind::Integer);
}
