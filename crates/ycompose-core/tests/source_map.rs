use serde::Deserialize;
use std::sync::Arc;
use ycompose_core::{LoadOptions, SourceMap, load, load_as};
use ycompose_runtime::VirtualRuntime;
use ycompose_yaml::emit_yaml;

fn lineage() -> VirtualRuntime {
    VirtualRuntime::new()
        .with_env("PATCH_0", r#"{"op":"add","path":"/grand/value5","value":"envpatch"}"#)
        .with_env("V1", "99")
        .with_file(
            "test.yml",
            r#"
_directives:
  include:
    - parent.yml
  patches:
    - op: add
      path: /test/value
      value: ooo
test:
  value: 10
  c1: ${V1:98}
  value2:
    - 20
"#,
        )
        .with_file(
            "parent.yml",
            r#"
_directives:
  include:
    - grand-parent.yml
    - grand-parent2.yml
  patches:
    - op: add
      path: /test/value2/1
      value: 99
parent:
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
            "grand-parent.yml",
            r#"
grand:
  value4: aaa
parent:
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
            "grand-parent2.yml",
            r#"
grand:
  value4: bbb
  value5: ccc
"#,
        )
}

#[test]
fn source_map_records_every_path() {
    let options = LoadOptions::new()
        .with_runtime(Arc::new(lineage()))
        .with_source_map_key("_sourcemap")
        .with_source_map_comment(true)
        .with_env_patches("PATCH");
    let doc = load("test.yml", &options).unwrap();

    // `_` sorts before every other key
    assert_eq!(doc.entries()[0].key.value(), "_sourcemap");
    let map: SourceMap = doc.get("_sourcemap").unwrap().decode().unwrap();

    assert_eq!(
        map.sources,
        ["test.yml", "grand-parent.yml", "grand-parent2.yml", "${PATCH_0}", "parent.yml"]
    );

    let expected: [(&str, &str, usize); 20] = [
        ("/", "test.yml", 2),
        ("/grand", "grand-parent.yml", 2),
        ("/grand/value4", "grand-parent2.yml", 3),
        ("/grand/value5", "${PATCH_0}", 1),
        ("/parent", "grand-parent.yml", 4),
        ("/parent/c2", "parent.yml", 11),
        ("/parent/c3", "grand-parent.yml", 5),
        ("/parent/value3", "grand-parent.yml", 6),
        ("/parent/value3/0", "grand-parent.yml", 7),
        ("/parent/value3/1", "grand-parent.yml", 8),
        ("/parent/value3/2", "parent.yml", 13),
        ("/parent/value3/3", "parent.yml", 14),
        ("/test", "grand-parent.yml", 9),
        ("/test/c1", "test.yml", 11),
        ("/test/value", "test.yml", 8),
        ("/test/value2", "grand-parent.yml", 10),
        ("/test/value2/0", "grand-parent.yml", 11),
        ("/test/value2/1", "parent.yml", 9),
        ("/test/value2/2", "parent.yml", 18),
        ("/test/value2/3", "test.yml", 13),
    ];
    let actual: Vec<_> = map
        .mappings
        .iter()
        .map(|m| (m.path.as_str(), m.file.as_str(), m.line))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn source_comments_in_emitted_yaml() {
    let options = LoadOptions::new()
        .with_runtime(Arc::new(lineage()))
        .with_source_map_comment(true)
        .with_env_patches("PATCH");
    let doc = load("test.yml", &options).unwrap();
    let text = emit_yaml(&doc);

    for line in [
        "grand: # grand-parent.yml:2",
        "  value5: envpatch # ${PATCH_0}:1",
        "  c1: 99 # test.yml:11",
        "  value: ooo # test.yml:8",
        "  value2: # grand-parent.yml:10",
        "    - 99 # parent.yml:9",
    ] {
        assert!(text.lines().any(|l| l == line), "missing {:?} in\n{}", line, text);
    }
}

#[test]
fn reloading_gives_identical_output() {
    let options = LoadOptions::new()
        .with_runtime(Arc::new(lineage()))
        .with_source_map_key("_sourcemap")
        .with_source_map_comment(true)
        .with_env_patches("PATCH");
    let first = emit_yaml(&load("test.yml", &options).unwrap());
    let second = emit_yaml(&load("test.yml", &options).unwrap());
    assert_eq!(first, second);

    let json = |doc: ycompose_core::Node| ycompose_yaml::emit_json(&doc).unwrap();
    assert_eq!(
        json(load("test.yml", &options).unwrap()),
        json(load("test.yml", &options).unwrap())
    );
}

#[derive(Debug, Deserialize)]
struct Config {
    sourcemap: SourceMap,
    name: String,
    child: ChildConfig,
}

#[derive(Debug, Deserialize)]
struct ChildConfig {
    value: String,
    arr: Vec<i64>,
}

impl Config {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let describe = |path: &str| {
            let m = self.sourcemap.find_map(path).map(|m| (m.file.clone(), m.line));
            let (file, line) = m.unwrap_or_default();
            format!("{} ({}:{})", path, file, line)
        };
        if self.name.len() < 5 {
            errors.push(format!("{} must be longer than 4", describe("/name")));
        }
        if self.child.value.len() < 5 {
            errors.push(format!("{} must be longer than 4", describe("/child/value")));
        }
        for (i, v) in self.child.arr.iter().enumerate() {
            if *v < 21 {
                errors.push(format!(
                    "{} must be bigger than 20",
                    describe(&format!("/child/arr/{}", i))
                ));
            }
        }
        errors
    }
}

#[test]
fn validation_reports_original_locations() {
    let rt = VirtualRuntime::new()
        .with_file(
            "config.yml",
            "\n_directives:\n  include:\n    - child.yml\nname: aaa\n",
        )
        .with_file(
            "child.yml",
            "\nchild:\n  value: bbb\n  arr:\n    - 10\n    - 20\n    - 30\n",
        );
    let options = LoadOptions::new()
        .with_runtime(Arc::new(rt))
        .with_source_map_key("sourcemap");
    let config: Config = load_as("config.yml", &options).unwrap();

    assert_eq!(
        config.validate(),
        [
            "/name (config.yml:5) must be longer than 4",
            "/child/value (child.yml:3) must be longer than 4",
            "/child/arr/0 (child.yml:5) must be bigger than 20",
            "/child/arr/1 (child.yml:6) must be bigger than 20",
        ]
    );
}

#[test]
fn decode_failure() {
    let rt = VirtualRuntime::new().with_file("config.yml", "name: [1]\n");
    let options = LoadOptions::new().with_runtime(Arc::new(rt));
    let err = load_as::<Config>("config.yml", &options).unwrap_err();
    assert_eq!(err.kind(), ycompose_core::ErrorKind::Decode);
    assert_eq!(err.message(), "config.yml: failed to map to given object");
}
