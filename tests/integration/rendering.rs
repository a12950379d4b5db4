//! Rendering behavior through the public API.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use templite::test_utils::{init_test_logging, sample_context};
use templite::{Context, DotResolver, RenderError, Templite, Value, filters};

fn render(text: &str, context: &Context) -> String {
    Templite::with_contexts(text, [filters::builtins()])
        .unwrap()
        .render(Some(context))
        .unwrap()
}

#[test]
fn test_literal_text_is_unchanged() {
    init_test_logging(None);
    let text = "No tags here.\n  Just {text} with } braces and % signs {\n";
    assert_eq!(Templite::new(text).unwrap().render(None).unwrap(), text);
}

#[test]
fn test_variables_and_dotted_lookups() {
    let context = sample_context();
    assert_eq!(render("{{ user.name }} on {{ site.title }}", &context), "Ada on Notes");
    assert_eq!(render("{{site.pages.1}}", &context), "about");
    assert_eq!(render("{{ user.langs }}", &context), r#"["rust", "python"]"#);
}

#[test]
fn test_readme_example() {
    let templite = Templite::with_contexts(
        "<h1>Hello {{name|upper}}!</h1>\n\
         {% for topic in topics %}\n    <p>You are interested in {{topic}}.</p>\n{% endfor %}\n",
        [Context::new().with("upper", Value::filter(|v| Ok(v.to_string().to_uppercase().into())))],
    )
    .unwrap();
    let context = Context::new()
        .with("name", "Ned")
        .with("topics", vec!["Python", "Geometry", "Juggling"]);

    assert_eq!(
        templite.render(Some(&context)).unwrap(),
        "<h1>Hello NED!</h1>\n\n    <p>You are interested in Python.</p>\n\n    \
         <p>You are interested in Geometry.</p>\n\n    <p>You are interested in Juggling.</p>\n\n"
    );
}

#[test]
fn test_loops() {
    let context = Context::new().with("xs", vec![1, 2, 3]).with("none", Vec::<i64>::new());
    assert_eq!(render("{% for x in xs %}{{x}}{% endfor %}", &context), "123");
    assert_eq!(render("{% for x in none %}{{x}}{% endfor %}", &context), "");
}

#[test]
fn test_loop_over_map_keys_and_string_chars() {
    let context = Context::new()
        .with("m", Value::from_json(serde_json::json!({"b": 2, "a": 1})))
        .with("s", "héy");
    assert_eq!(render("{% for k in m %}{{k}}={{m.b}} {% endfor %}", &context), "a=2 b=2 ");
    assert_eq!(render("{% for c in s %}[{{c}}]{% endfor %}", &context), "[h][é][y]");
}

#[test]
fn test_conditionals_follow_truthiness() {
    let cases = [
        (Value::None, ""),
        (Value::Bool(false), ""),
        (Value::Int(0), ""),
        (Value::Float(0.0), ""),
        (Value::from(""), ""),
        (Value::List(Vec::new()), ""),
        (Value::Bool(true), "A"),
        (Value::Int(-1), "A"),
        (Value::from("0"), "A"),
        (Value::from(vec![0]), "A"),
    ];
    for (value, expected) in cases {
        let context = Context::new().with("cond", value.clone());
        assert_eq!(render("{% if cond %}A{% endif %}", &context), expected, "cond = {value:?}");
    }
}

#[test]
fn test_nested_blocks_filter_falsy_items_in_order() {
    let context = Context::new().with(
        "items",
        Value::from_json(serde_json::json!([3, 0, "x", "", null, [], [1], false, 2.5])),
    );
    assert_eq!(
        render("{% for i in items %}{% if i %}{{ i }},{% endif %}{% endfor %}", &context),
        "3,x,[1],2.5,"
    );
}

#[test]
fn test_inner_loop_shadows_outer_loop_variable() {
    let context =
        Context::new().with("rows", Value::from_json(serde_json::json!([["a", "b"], ["c"]])));
    assert_eq!(
        render(
            "{% for x in rows %}{% for x in x %}{{x}}{% endfor %}{{x|length}};{% endfor %}",
            &context
        ),
        "ab2;c1;"
    );
}

#[test]
fn test_filters_chain_after_dots() {
    let context = sample_context();
    assert_eq!(render("{{ site.title|reverse|upper }}", &context), "SETON");
    assert_eq!(render("{{ site.pages|first|capitalize }}", &context), "Home");
    assert_eq!(render("{{ user.langs|length }}", &context), "2");
}

#[test]
fn test_comments_render_nothing() {
    let context = Context::new().with("a", 1);
    assert_eq!(render("x{# {{ a }} {% if %} #}y{{a}}", &context), "xy1");
}

#[test]
fn test_render_context_overrides_compile_context() {
    let contexts = [Context::new().with("who", "first"), Context::new().with("who", "second")];
    let templite = Templite::with_contexts("{{ who }}", contexts).unwrap();
    assert_eq!(templite.render(None).unwrap(), "second");
    assert_eq!(templite.render(Some(&Context::new().with("who", "third"))).unwrap(), "third");
    // The compile-time context is left untouched.
    assert_eq!(templite.render(None).unwrap(), "second");
}

#[test]
fn test_display_formats() {
    let context = Context::new()
        .with("n", Value::None)
        .with("t", true)
        .with("f", 1.5)
        .with("w", 2.0)
        .with("m", Value::from_json(serde_json::json!({"k": "v", "n": null})));
    assert_eq!(
        render("[{{n}}][{{t}}][{{f}}][{{w}}][{{m}}]", &context),
        r#"[][true][1.5][2.0][{"k": "v", "n": none}]"#
    );
}

#[test]
fn test_recompiling_gives_identical_output() {
    let text = "{% for u in users %}{% if u.admin %}{{ u.name|title }}\n{% endif %}{% endfor %}";
    let context = Context::new().with(
        "users",
        Value::from_json(serde_json::json!([
            {"name": "ada lovelace", "admin": true},
            {"name": "bob", "admin": false},
            {"name": "grace hopper", "admin": true},
        ])),
    );
    let first = render(text, &context);
    for _ in 0..5 {
        assert_eq!(render(text, &context), first);
    }
    assert_eq!(first, "Ada Lovelace\nGrace Hopper\n");
}

#[test]
fn test_callables_are_invoked_by_dotted_lookup() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut clock = BTreeMap::new();
    clock.insert(
        "now".to_string(),
        Value::callable(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Value::from("tick")
        }),
    );
    let context = Context::new().with("clock", Value::Map(clock));

    assert_eq!(render("{{clock.now}}{{clock.now}}", &context), "ticktick");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

struct UppercaseKeys;

impl DotResolver for UppercaseKeys {
    fn resolve(&self, value: Value, names: &[String]) -> Result<Value, RenderError> {
        let Value::Map(map) = &value else {
            return Err(RenderError::LookupFailed {
                name: names.join("."),
                kind: value.kind(),
            });
        };
        Ok(map.get(&names.join(".").to_uppercase()).cloned().unwrap_or_default())
    }
}

#[test]
fn test_custom_resolver() {
    let templite = Templite::new("{{ env.home }}|{{ env.missing }}|").unwrap();
    let context = Context::new().with("env", Value::from_json(serde_json::json!({"HOME": "/root"})));
    assert_eq!(templite.render_with(Some(&context), &UppercaseKeys).unwrap(), "/root||");
}
