//! Content accessors over real files: text, lines, JSON, YAML, arrays, caching.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

use superpath::{SuperPath, SuperPathError, YamlTrust};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Settings {
    name: String,
    retries: u32,
}

#[test]
fn text_write_creates_parents_and_reads_back() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("deep/er/notes.txt"));
    p.set_text("first\n\nthird").expect("write text");
    assert_eq!(p.text().unwrap(), "first\n\nthird");
    assert_eq!(p.lines().unwrap(), vec!["first", "", "third"]);
    assert_eq!(p.content_lines().unwrap(), vec!["first", "third"]);
}

#[test]
fn set_lines_accepts_any_display() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("n.txt"));
    p.set_lines([1, 2, 3]).unwrap();
    assert_eq!(fs::read_to_string(&p).unwrap(), "1\n2\n3");
    p.set_content_lines(["a", "", "b"]).unwrap();
    assert_eq!(p.lines().unwrap(), vec!["a", "b"]);
}

#[test]
fn content_lines_drop_only_empty_renderings() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("c.txt"));
    p.set_content_lines([0, 1, 2]).unwrap();
    assert_eq!(fs::read_to_string(&p).unwrap(), "0\n1\n2");

    let words: Vec<String> = vec!["".into(), "keep".into(), "".into(), "false".into()];
    p.set_content_lines(&words).unwrap();
    assert_eq!(p.content_lines().unwrap(), vec!["keep", "false"]);
}

#[test]
fn invalid_utf8_is_an_error() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("bin"));
    p.set_byte_content([0xff, 0xfe, 0x00]).unwrap();
    assert!(p.text().is_err());
    assert_eq!(p.byte_content().unwrap(), vec![0xff, 0xfe, 0x00]);
}

#[test]
fn json_round_trip_typed_and_untyped() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("s.json"));
    let s = Settings {
        name: "svc".into(),
        retries: 3,
    };
    p.set_json(&s).unwrap();
    assert_eq!(p.json::<Settings>().unwrap(), s);
    assert_eq!(
        p.json::<serde_json::Value>().unwrap(),
        json!({"name": "svc", "retries": 3})
    );
}

#[test]
fn yaml_typed_and_update() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("c.yaml"));
    p.set_yaml(&Settings {
        name: "a".into(),
        retries: 1,
    })
    .unwrap();

    let mut patch = Mapping::new();
    patch.insert(Value::from("retries"), Value::from(5));
    patch.insert(Value::from("extra"), Value::from(true));
    let merged = p.update(patch).expect("update");
    assert_eq!(merged.get("name"), Some(&Value::from("a")));
    assert_eq!(merged.get("retries"), Some(&Value::from(5)));

    let reread: BTreeMap<String, Value> = p.yaml().unwrap();
    assert_eq!(reread.len(), 3);
    assert_eq!(reread["extra"], Value::from(true));
}

#[test]
fn empty_update_does_not_create_file() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("never.yaml"));
    let merged = p.update(Mapping::new()).unwrap();
    assert!(merged.is_empty());
    assert!(!p.exists());
}

#[test]
fn tagged_yaml_requires_trusted_loader() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("t.yaml"));
    p.set_text("items:\n  - !Thing {a: 1}\n").unwrap();

    let err = p.yaml::<Value>().expect_err("restricted load must refuse tags");
    assert!(matches!(
        err.downcast_ref::<SuperPathError>(),
        Some(SuperPathError::UntrustedYaml { .. })
    ));
    assert!(p.load_yaml(YamlTrust::Trusted).is_ok());
}

#[test]
fn array_round_trip_and_missing() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("v.npy"));
    assert!(p.array().unwrap().is_empty());

    let values = [0.0, -1.5, 3.25, f64::MAX];
    p.set_array(&values).unwrap();
    assert_eq!(p.array().unwrap(), values);
    assert_eq!(&p.byte_content().unwrap()[..6], b"\x93NUMPY");
}

#[test]
fn corrupt_array_reports_malformed() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("bad.npy"));
    p.set_byte_content(b"not an array").unwrap();
    let err = p.array().expect_err("garbage must not decode");
    assert!(matches!(
        err.downcast_ref::<SuperPathError>(),
        Some(SuperPathError::MalformedArray { .. })
    ));
}

#[test]
fn cached_text_reloads_after_external_write() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("cache.txt"));
    let mut cache = p.cached_text();
    assert_eq!(cache.get().unwrap(), "");

    cache.set("one".to_string()).unwrap();
    assert_eq!(cache.get().unwrap(), "one");

    p.set_text("two").unwrap();
    p.set_mtime(p.mtime() + 10.0).unwrap();
    assert_eq!(cache.get().unwrap(), "two");

    p.unlink(false).unwrap();
    assert_eq!(cache.get().unwrap(), "");
}
