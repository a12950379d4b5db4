//! Compile-time and render-time failures.

use templite::test_utils::init_test_logging;
use templite::templating::BlockKind;
use templite::{Context, FilterError, RenderError, SyntaxErrorKind, Templite, Value, filters};

fn syntax_kind(text: &str) -> SyntaxErrorKind {
    Templite::new(text).unwrap_err().kind
}

#[test]
fn test_malformed_tags() {
    init_test_logging(None);
    assert!(matches!(syntax_kind("{% if a b %}{% endif %}"), SyntaxErrorKind::MalformedIf { .. }));
    assert!(matches!(syntax_kind("{% if %}{% endif %}"), SyntaxErrorKind::MalformedIf { .. }));
    assert!(matches!(syntax_kind("{% for x of xs %}{% endfor %}"), SyntaxErrorKind::MalformedFor { .. }));
    assert!(matches!(syntax_kind("{% for x in %}{% endfor %}"), SyntaxErrorKind::MalformedFor { .. }));
    assert!(matches!(syntax_kind("{% if a %}{% endif now %}"), SyntaxErrorKind::MalformedEnd { .. }));
}

#[test]
fn test_block_structure_errors() {
    assert_eq!(
        syntax_kind("{% if c %}{% endfor %}"),
        SyntaxErrorKind::MismatchedEnd {
            open: BlockKind::If,
            found: "for".into(),
        }
    );
    assert!(matches!(syntax_kind("{% endif %}"), SyntaxErrorKind::TooManyEnds { .. }));
    assert_eq!(
        syntax_kind("{% for x in xs %}"),
        SyntaxErrorKind::UnclosedBlock {
            kind: BlockKind::For
        }
    );
}

#[test]
fn test_unsupported_constructs() {
    assert_eq!(
        syntax_kind("{% if a %}x{% else %}y{% endif %}"),
        SyntaxErrorKind::UnknownTag {
            word: "else".into()
        }
    );
    assert_eq!(
        syntax_kind("{{ a | upper }}"),
        SyntaxErrorKind::InvalidIdentifier {
            name: "a ".into()
        }
    );
    assert!(matches!(syntax_kind("{{ 2x }}"), SyntaxErrorKind::InvalidIdentifier { .. }));
}

#[test]
fn test_syntax_errors_report_lines() {
    let text = "first\nsecond {{ ok }}\n{% while x %}\nlast";
    let err = Templite::new(text).unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.to_string(), format!("{} (line 3)", err.kind));

    let report = err.format_with_context(text);
    assert!(report.contains(">    3 | {% while x %}"));
    assert!(report.contains("     2 | second {{ ok }}"));
}

#[test]
fn test_missing_variable_fails_before_output() {
    let templite = Templite::new("{% if never %}{{ hidden }}{% endif %}ok").unwrap();
    let context = Context::new().with("never", false);
    let err = templite.render(Some(&context)).unwrap_err();
    assert!(matches!(err, RenderError::MissingVariable { ref name, .. } if name == "hidden"));
}

#[test]
fn test_missing_variable_suggestions() {
    let templite = Templite::new("{{ usernme }}").unwrap();
    let context = Context::new().with("username", "ada").with("zzz", 1);
    let err = templite.render(Some(&context)).unwrap_err();

    let report = err.format_with_context();
    assert!(report.contains("Variable: usernme"));
    assert!(report.contains("Did you mean one of these?\n  - username\n"));
    assert!(!report.contains("  - zzz"));
}

#[test]
fn test_loop_variable_outside_its_loop() {
    let templite = Templite::new("{% for x in xs %}{% endfor %}{{ x }}").unwrap();
    let context = Context::new().with("xs", vec![1]);
    assert_eq!(
        templite.render(Some(&context)).unwrap_err(),
        RenderError::Unbound {
            name: "x".into()
        }
    );
}

#[test]
fn test_runtime_type_errors() {
    let templite = Templite::with_contexts("{{ n.size }}", [Context::new().with("n", 3)]).unwrap();
    assert_eq!(
        templite.render(None).unwrap_err(),
        RenderError::LookupFailed {
            name: "size".into(),
            kind: "int",
        }
    );

    let templite = Templite::new("{% for i in n %}{% endfor %}").unwrap();
    let context = Context::new().with("n", 3);
    assert_eq!(
        templite.render(Some(&context)).unwrap_err(),
        RenderError::NotIterable {
            kind: "int"
        }
    );

    let templite = Templite::new("{{ a|b }}").unwrap();
    let context = Context::new().with("a", 1).with("b", "text");
    assert_eq!(
        templite.render(Some(&context)).unwrap_err(),
        RenderError::NotAFilter {
            name: "b".into(),
            kind: "string",
        }
    );
}

#[test]
fn test_filter_failures_propagate() {
    let templite = Templite::with_contexts("{{ n|length }}", [filters::builtins()]).unwrap();
    let err = templite.render(Some(&Context::new().with("n", 1))).unwrap_err();
    assert!(matches!(err, RenderError::FilterFailed { ref name, .. } if name == "length"));

    let strict = Value::filter(|_| Err(FilterError::new("nope")));
    let templite = Templite::with_contexts("{{ a|strict }}", [Context::new().with("strict", strict)])
        .unwrap();
    let err = templite.render(Some(&Context::new().with("a", 1))).unwrap_err();
    assert_eq!(err.to_string(), "Filter 'strict' failed: nope");
    assert_eq!(std::error::Error::source(&err).map(ToString::to_string), Some("nope".into()));
}
