use serde_json::json;
use std::sync::Arc;
use ycompose_core::{ErrorKind, LoadOptions, load};
use ycompose_runtime::VirtualRuntime;

fn options(runtime: VirtualRuntime) -> LoadOptions {
    LoadOptions::new().with_runtime(Arc::new(runtime))
}

fn family() -> VirtualRuntime {
    VirtualRuntime::new()
        .with_file(
            "test.yml",
            r#"
_directives:
  include:
    - child.yml
test:
  value: 10
  c1: 99
  value2:
    - 20
"#,
        )
        .with_file(
            "child.yml",
            r#"
_directives:
  include:
    - grand-child.yml
    - grand-child2.yml
child:
  c2: 100
  value3:
    - 30
    - 40
test:
  c1: 999
  value2:
    - 40
"#,
        )
        .with_file(
            "grand-child.yml",
            r#"
grand:
  value4: aaa
child:
  c3: 777
  value3:
    - 30
    - 60
test:
  value2:
    - 70
"#,
        )
        .with_file(
            "grand-child2.yml",
            r#"
grand:
  value4: bbb
  value5: ccc
"#,
        )
}

#[test]
fn includes_merge_depth_first() {
    let doc = load("test.yml", &options(family())).unwrap();

    assert_eq!(
        doc.to_json_value(),
        json!({
            "child": {"c2": 100, "c3": 777, "value3": [30, 60, 30, 40]},
            "grand": {"value4": "bbb", "value5": "ccc"},
            "test": {"c1": 99, "value": 10, "value2": [70, 40, 20]}
        })
    );

    // existing keys keep their place, new keys are inserted in sorted order
    let top: Vec<_> = doc.entries().iter().map(|e| e.key.value()).collect();
    assert_eq!(top, ["grand", "child", "test"]);
    let test: Vec<_> = doc.get("test").unwrap().entries().iter().map(|e| e.key.value()).collect();
    assert_eq!(test, ["c1", "value", "value2"]);
}

#[test]
fn including_file_wins_with_its_own_provenance() {
    let doc = load("test.yml", &options(family())).unwrap();
    let c1 = doc.find_by_pointer("/test/c1").unwrap();
    assert_eq!(c1.source_info.to_string(), "test.yml(line:7)");

    let c3 = doc.find_by_pointer("/child/c3").unwrap();
    assert_eq!(c3.source_info.to_string(), "grand-child.yml(line:5)");

    assert_eq!(doc.source_info.file.as_deref(), Some("test.yml"));
}

#[test]
fn include_globs_are_relative_and_sorted() {
    let rt = VirtualRuntime::new()
        .with_file(
            "app/main.yml",
            "_directives:\n  include:\n    - conf.d/*.yml\n    - ../shared/base.yml\nname: main\n",
        )
        .with_file("app/conf.d/20-b.yml", "order: [b]\n")
        .with_file("app/conf.d/10-a.yml", "order: [a]\n")
        .with_file("shared/base.yml", "order: [base]\nname: base\n");

    let doc = load("app/main.yml", &options(rt)).unwrap();
    assert_eq!(
        doc.to_json_value(),
        json!({"order": ["a", "b", "base"], "name": "main"})
    );
    let base = doc.find_by_pointer("/order/2").unwrap();
    assert_eq!(base.source_info.file.as_deref(), Some("shared/base.yml"));
}

#[test]
fn absolute_includes() {
    let rt = VirtualRuntime::new()
        .with_file("/etc/app/defaults.yml", "port: 80\n")
        .with_file("app.yml", "_directives:\n  include: [/etc/app/defaults.yml]\n");
    let doc = load("app.yml", &options(rt)).unwrap();
    assert_eq!(doc.get("port").unwrap().value(), "80");
}

#[test]
fn include_without_matches_fails() {
    let rt = VirtualRuntime::new()
        .with_file("test.yml", "_directives:\n  include:\n    - missing/*.yml\na: 1\n");
    let err = load("test.yml", &options(rt)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(
        err.to_string(),
        "io error: test.yml: failed to find a included file missing/*.yml"
    );
}

#[test]
fn unreadable_and_malformed_files() {
    let rt = VirtualRuntime::new()
        .with_file("bad.yml", "a: b: c\n")
        .with_file("list.yml", "- 1\n")
        .with_file("directives.yml", "_directives: 1\n");

    let err = load("nope.yml", &options(rt.clone())).unwrap_err();
    assert_eq!(err.to_string(), "io error: nope.yml: failed to load given file");

    let err = load("bad.yml", &options(rt.clone())).unwrap_err();
    assert_eq!(err.to_string(), "yaml error: bad.yml: failed to parse given YAML file");
    assert!(std::error::Error::source(&err).is_some());

    let err = load("list.yml", &options(rt.clone())).unwrap_err();
    assert_eq!(
        err.to_string(),
        "yaml error: list.yml: root node must be a mapping node(sequence)"
    );

    let err = load("directives.yml", &options(rt)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "directive error: directives.yml: _directives must be a mapping node"
    );
}

#[test]
fn custom_directive_key() {
    let rt = VirtualRuntime::new()
        .with_file("a.yml", "$:\n  include: [b.yml]\n_directives: kept\n")
        .with_file("b.yml", "b: 1\n");
    let doc = load("a.yml", &options(rt).with_directive_key("$")).unwrap();
    assert_eq!(doc.to_json_value(), json!({"b": 1, "_directives": "kept"}));
}

#[test]
fn remove_block_comments() {
    let rt = VirtualRuntime::new().with_file("a.yml", "# about a\na: 1\n");
    let kept = load("a.yml", &options(rt.clone())).unwrap();
    assert_eq!(kept.entries()[0].key.head_comment, "# about a");

    let stripped = load("a.yml", &options(rt).with_remove_block_comments(true)).unwrap();
    assert!(stripped.entries()[0].key.head_comment.is_empty());
}
