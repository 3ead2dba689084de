use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn swagger_gen() -> Command {
    let mut cmd = Command::cargo_bin("swagger-gen").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn decode_prints_the_re_encoded_document() {
    let output = swagger_gen()
        .arg("decode")
        .arg("--input")
        .arg(fixture("pet.json"))
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["resourcePath"], "/pet");
    // keys outside the model are dropped
    assert!(out.get("produces").is_none());
    assert_eq!(out["apis"][0]["operations"][1]["notes"], Value::Null);
}

#[test]
fn decode_applies_pointer_and_jq_before_decoding() {
    let schema = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        schema.path(),
        r#"{ "Api": { "record": { "fields": { "path": "string" }, "required": ["path"] } } }"#,
    )
    .unwrap();

    let output = swagger_gen()
        .arg("decode")
        .arg("--schema")
        .arg(schema.path())
        .args(["--root", "Api", "--json-pointer", "/apis", "--jq-expr", ".[] | {path: .path}"])
        .arg("--input")
        .arg(fixture("pet.json"))
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out, serde_json::json!([{"path": "/pet/{petId}"}, {"path": "/pet/findByStatus"}]));
}

#[test]
fn decode_fails_on_a_bad_document() {
    let bad = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(bad.path(), r#"{"apiVersion": "1", "swaggerVersion": 2}"#).unwrap();

    let output = swagger_gen()
        .args(["decode", "--check", "--input"])
        .arg(bad.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("$.swaggerVersion"), "stderr: {stderr}");
}

#[test]
fn graph_lists_every_node() {
    let output = swagger_gen().arg("graph").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Definition -> ["), "stdout: {stdout}");
    assert!(stdout.contains("joint<Property> -> [PropertySub, PropertyExt]"), "stdout: {stdout}");
}

#[test]
fn unknown_root_is_rejected() {
    let output = swagger_gen().args(["graph", "--root", "Nope"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("`Nope`"));
}
