use serde_json::json;
use std::sync::Arc;
use ycompose_core::{ErrorKind, LoadOptions, Result, load};
use ycompose_runtime::VirtualRuntime;
use ycompose_yaml::ScalarType;

fn options(rt: VirtualRuntime) -> LoadOptions {
    LoadOptions::new().with_runtime(Arc::new(rt))
}

const STRING_VARS: &str = r#"
test:
  value: ${KEY:10} bbb ${KEY2}
  value2:
    - ${KEY2:aaa}
  value3: ${AAA:"e \"e}\\ e"}
  value4: ddd ${AAA:"e e e"} fff
"#;

#[test]
fn string_substitution() {
    let rt = VirtualRuntime::new()
        .with_file("test.yml", STRING_VARS)
        .with_env("KEY", "aaa")
        .with_env("KEY2", "ccc");
    let doc = load("test.yml", &options(rt)).unwrap();

    assert_eq!(
        doc.to_json_value(),
        json!({"test": {
            "value": "aaa bbb ccc",
            "value2": ["ccc"],
            "value3": "e \"e}\\ e",
            "value4": "ddd e e e fff"
        }})
    );
}

#[test]
fn keep_variables() {
    let rt = VirtualRuntime::new()
        .with_file("test.yml", STRING_VARS)
        .with_env("KEY", "aaa")
        .with_env("KEY2", "ccc");
    let doc = load("test.yml", &options(rt).with_keep_variables(true)).unwrap();

    assert_eq!(
        doc.to_json_value(),
        json!({"test": {
            "value": "${KEY:aaa} bbb ${KEY2:ccc}",
            "value2": ["${KEY2:ccc}"],
            "value3": "${AAA:\"e \\\"e}\\\\ e\"}",
            "value4": "ddd ${AAA:\"e e e\"} fff"
        }})
    );
}

#[test]
fn defaults_are_typed() {
    let rt = VirtualRuntime::new().with_file(
        "test.yml",
        "int: ${KEY:10}\nfloat_text: ${KEY:\"10.0\"}\nflag: ${KEY:true}\nescaped: ${KEY:\"a\\\"\\\\na}\"}\n",
    );
    let doc = load("test.yml", &options(rt)).unwrap();

    assert_eq!(doc.get("int").unwrap().scalar_type(), Some(ScalarType::Int));
    assert_eq!(doc.to_json_value()["int"], json!(10));
    assert_eq!(doc.to_json_value()["float_text"], json!("10.0"));
    assert_eq!(doc.to_json_value()["flag"], json!(true));
    assert_eq!(doc.to_json_value()["escaped"], json!("a\"\\na}"));
}

#[test]
fn environment_overrides_default() {
    let rt = VirtualRuntime::new()
        .with_file("test.yml", "value: \"${KEY:10}\"\n")
        .with_env("KEY", "99");
    let doc = load("test.yml", &options(rt)).unwrap();
    assert_eq!(doc.to_json_value(), json!({"value": 99}));
}

#[test]
fn unresolved_variable() {
    let rt = VirtualRuntime::new().with_file("test.yml", "a: 1\n\nvalue: ${KEY}\n");
    let err = load("test.yml", &options(rt)).unwrap_err();
    assert!(err.is(ErrorKind::VarNotFound));
    assert_eq!(
        err.to_string(),
        "yaml error: test.yml(line:3): failed to resolve a variable"
    );
    let cause = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(cause.as_deref(), Some("variable not found: KEY not found"));
    assert_eq!(
        format!("{:#}", err),
        "yaml error: test.yml(line:3): failed to resolve a variable: variable not found: KEY not found"
    );
}

#[test]
fn empty_default_is_not_a_value() {
    let rt = VirtualRuntime::new().with_file("test.yml", "value: ${KEY:}\nother: ${KEY bbb}\n");
    let err = load("test.yml", &options(rt)).unwrap_err();
    assert!(err.is(ErrorKind::VarNotFound));

    let rt = VirtualRuntime::new()
        .with_file("test.yml", "value: ${KEY:}\nother: ${KEY bbb}\n")
        .with_env("KEY", "x");
    let doc = load("test.yml", &options(rt)).unwrap();
    assert_eq!(doc.to_json_value(), json!({"value": "x", "other": "x"}));
}

#[test]
fn directive_variables() {
    let rt = VirtualRuntime::new().with_file(
        "test.yml",
        r#"
_directives:
  variables:
    KEY: 10
    KEY2: bbb
value: ${KEY:0}
value2: ${KEY2}
"#,
    );
    let doc = load("test.yml", &options(rt)).unwrap();
    assert_eq!(doc.to_json_value(), json!({"value": 10, "value2": "bbb"}));
}

#[test]
fn environment_wins_over_directive_variables() {
    let rt = VirtualRuntime::new()
        .with_file("test.yml", "_directives:\n  vars:\n    KEY: file\nvalue: ${KEY}\n")
        .with_env("KEY", "env");
    let doc = load("test.yml", &options(rt)).unwrap();
    assert_eq!(doc.get("value").unwrap().value(), "env");
}

#[test]
fn custom_resolver_replaces_environment() {
    let rt = VirtualRuntime::new()
        .with_file(
            "test.yml",
            "_directives:\n  vars:\n    OTHER: file\nvalue: ${KEY}\nother: ${OTHER}\n",
        )
        .with_env("KEY", "env");
    let resolver = |name: &str| -> Result<Option<String>> {
        Ok((name == "KEY").then(|| "custom".to_string()))
    };
    let doc = load("test.yml", &options(rt).with_var_resolver(Arc::new(resolver))).unwrap();
    assert_eq!(doc.to_json_value(), json!({"value": "custom", "other": "file"}));
}

#[test]
fn non_scalar_directive_variable() {
    let rt = VirtualRuntime::new().with_file(
        "test.yml",
        "_directives:\n  variables:\n    KEY: [1, 2]\nvalue: ${KEY}\n",
    );
    let err = load("test.yml", &options(rt)).unwrap_err();
    assert!(err.is(ErrorKind::Directive));
    assert!(!err.is(ErrorKind::VarNotFound));
}

#[test]
fn invalid_references_are_left_alone() {
    let rt = VirtualRuntime::new().with_file(
        "test.yml",
        r#"
test:
  value1: ${aaa
  value2: ${KEY:"aaaaa}
  value3: ${KEY:10 bbb
  value4: ${[]}
  value5: ${}
  value6: $${KEY:aaa}
"#,
    );
    let doc = load("test.yml", &options(rt)).unwrap();
    assert_eq!(
        doc.to_json_value(),
        json!({"test": {
            "value1": "${aaa",
            "value2": "${KEY:\"aaaaa}",
            "value3": "${KEY:10 bbb",
            "value4": "${[]}",
            "value5": "${}",
            "value6": "$${KEY:aaa}"
        }})
    );
}

#[test]
fn malformed_substitution() {
    let rt = VirtualRuntime::new().with_file("test.yml", "\ntest:\n  value: ${KEY:[}\n");
    let err = load("test.yml", &options(rt)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Yaml);
    assert_eq!(
        err.to_string(),
        "yaml error: test.yml(line:3): failed to parse a variable"
    );
    let chain = format!("{:#}", err);
    assert!(
        chain.starts_with("yaml error: test.yml(line:3): failed to parse a variable: ")
            && chain.len() > err.to_string().len() + 2,
        "{}",
        chain
    );
}

#[test]
fn variables_flow_up_the_include_tree() {
    let rt = VirtualRuntime::new()
        .with_file(
            "root.yml",
            r#"
_directives:
  include:
    - child.yml
  variables:
    vname: root
value: ${vname}
"#,
        )
        .with_file(
            "child.yml",
            r#"
_directives:
  variables:
    vname: child
    vname2: c
value2: ${vname2}
"#,
        );
    let doc = load("root.yml", &options(rt)).unwrap();
    assert_eq!(doc.to_json_value(), json!({"value": "root", "value2": "c"}));
}

#[test]
fn keys_and_non_strings_are_not_expanded() {
    let rt = VirtualRuntime::new()
        .with_file("test.yml", "${KEY}: 1\nquoted: !!int 10\n")
        .with_env("KEY", "x");
    let doc = load("test.yml", &options(rt)).unwrap();
    assert!(doc.has_key("${KEY}"));
}
