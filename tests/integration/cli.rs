//! The `templite` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch directory used as the working directory, so no user
/// configuration leaks into the run.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) -> &Self {
        std::fs::write(self.dir.path().join(name), content).unwrap();
        self
    }

    fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("templite").unwrap();
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_render_with_vars_and_context_files() {
    let ws = Workspace::new();
    ws.write("page.txt", "{{ greeting }}, {{ name|title }}! {% for t in tags %}#{{t}} {% endfor %}")
        .write("site.json", r#"{"greeting": "Hello", "tags": ["a", "b"]}"#)
        .write("override.toml", "greeting = \"Hi\"\n");

    ws.cmd()
        .args(["render", "page.txt", "--context", "site.json", "--context", "override.toml"])
        .args(["--var", "name=ada lovelace"])
        .assert()
        .success()
        .stdout("Hi, Ada Lovelace! #a #b ");
}

#[test]
fn test_render_from_stdin_to_file() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["render", "-", "--var", "n=3", "-o", "out.txt"])
        .write_stdin("n={{ n }}")
        .assert()
        .success()
        .stdout("");
    assert_eq!(ws.read("out.txt"), "n=3");
}

#[test]
fn test_project_config_supplies_context() {
    let ws = Workspace::new();
    ws.write("templite.toml", "[context]\nsite = \"notes\"\n").write("t.txt", "{{ site|upper }}");

    ws.cmd().args(["render", "t.txt"]).assert().success().stdout("NOTES");
}

#[test]
fn test_config_can_disable_builtin_filters() {
    let ws = Workspace::new();
    ws.write("conf.toml", "builtin_filters = false\n").write("t.txt", "{{ x|upper }}");

    ws.cmd()
        .args(["--config", "conf.toml", "render", "t.txt", "--var", "x=a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template variable not found: 'upper'"));
}

#[test]
fn test_missing_variable_is_reported() {
    let ws = Workspace::new();
    ws.write("t.txt", "{{ usrname }}");

    ws.cmd()
        .args(["render", "t.txt", "--var", "username=x"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Failed to render t.txt"))
        .stderr(predicate::str::contains("- username"))
        .stderr(predicate::str::contains("--var NAME=VALUE"));
}

#[test]
fn test_syntax_error_quotes_template() {
    let ws = Workspace::new();
    ws.write("t.txt", "one\n{% if a %}two{% endfor %}\n");

    ws.cmd()
        .args(["check", "t.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template syntax error in t.txt"))
        .stderr(predicate::str::contains("(line 2)"))
        .stderr(predicate::str::contains("{% if a %}two{% endfor %}"));
}

#[test]
fn test_invalid_var_argument() {
    let ws = Workspace::new();
    ws.write("t.txt", "x");

    ws.cmd()
        .args(["render", "t.txt", "--var", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid variable 'novalue'"));
}

#[test]
fn test_unsupported_context_file() {
    let ws = Workspace::new();
    ws.write("t.txt", "x").write("ctx.yaml", "a: 1");

    ws.cmd()
        .args(["render", "t.txt", "--context", "ctx.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported context file format"));
}

#[test]
fn test_missing_template_file() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["render", "absent.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read template absent.txt"));
}

#[test]
fn test_check_json_report() {
    let ws = Workspace::new();
    ws.write("t.txt", "{{ title|upper }}{% for p in posts %}{{ p.name }}{% endfor %}");

    let output = ws.cmd().args(["check", "t.txt", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["template"], "t.txt");
    assert_eq!(report["variables"], serde_json::json!(["posts", "title"]));
    assert_eq!(report["loop_variables"], serde_json::json!(["p"]));
    assert_eq!(report["filters"], serde_json::json!(["upper"]));
    assert_eq!(report["unresolved"], serde_json::json!(["posts", "title"]));
}

#[test]
fn test_render_warns_when_variable_is_a_builtin_filter() {
    let ws = Workspace::new();
    ws.write("t.txt", "{{ title }}");

    ws.cmd()
        .args(["render", "t.txt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("'title' is used as a variable but is only defined as a filter"));

    ws.cmd()
        .args(["render", "t.txt", "--var", "title=Home"])
        .assert()
        .success()
        .stdout("Home")
        .stderr(predicate::str::contains("only defined as a filter").not());
}

#[test]
fn test_check_text_report() {
    let ws = Workspace::new();
    ws.write("t.txt", "{% for x in xs %}{{ x }}{% endfor %}");

    ws.cmd()
        .env("NO_COLOR", "1")
        .args(["check", "t.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("variables:      xs"))
        .stdout(predicate::str::contains("loop variables: x"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let ws = Workspace::new();
    ws.write("t.txt", "plain");

    ws.cmd()
        .args(["--verbose", "render", "t.txt"])
        .assert()
        .success()
        .stdout("plain")
        .stderr(predicate::str::contains("Compiled template"));
}
