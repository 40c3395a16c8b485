mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::*;
use qtree::codec::{decode_document, encode_document, Document};
use qtree::{Node, Parameter};
use tempfile::TempDir;

fn qtree(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qtree"))
        .args(args)
        .env_remove("QTREE_LOG")
        .output()
        .expect("failed to run qtree")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn animal_document(a: &Parameter) -> String {
    encode_document(&Document { catalog: zoo(), tree: name_is(a, "Rex") }).unwrap()
}

#[test]
fn show_prints_source_form() {
    let dir = TempDir::new().unwrap();
    let a = Parameter::new("a", animal());
    let doc = write(&dir, "doc.json", &animal_document(&a));

    let out = qtree(&[Path::new("show"), doc.as_path()]);

    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), r#"(Animal a) => (a.Name == "Rex")"#);
}

#[test]
fn rewrite_parameter_to_output_file() {
    let dir = TempDir::new().unwrap();
    let a = Parameter::new("a", animal());
    let doc = write(&dir, "doc.json", &animal_document(&a));
    let req = write(&dir, "req.toml", &format!("[parameter]\nold = \"{}\"\nname = \"d\"\ntype = \"Dog\"\n", a.id));
    let dest = dir.path().join("out.json");

    let out = qtree(&[Path::new("rewrite"), doc.as_path(), Path::new("--request"), req.as_path(), Path::new("-o"), dest.as_path()]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("rewrote 5 nodes; 1 parameters"));
    let written = decode_document(&std::fs::read_to_string(&dest).unwrap()).unwrap();
    assert_eq!(written.tree.to_string(), r#"(Dog d) => (d.Name == "Rex")"#);
    assert_eq!(written.catalog, zoo());
}

#[test]
fn rewrite_types_to_stdout() {
    let dir = TempDir::new().unwrap();
    let a = Parameter::new("a", animal());
    let doc = write(&dir, "doc.json", &animal_document(&a));
    let req = write(&dir, "req.toml", "[types]\nAnimal = \"Dog\"\n");

    let out = qtree(&[Path::new("rewrite"), doc.as_path(), Path::new("-r"), req.as_path()]);

    assert!(out.status.success());
    let printed = decode_document(&String::from_utf8_lossy(&out.stdout)).unwrap();
    let Node::Lambda { parameters, declared_type, .. } = printed.tree else { panic!("expected lambda") };
    assert_eq!(parameters[0].ty, dog());
    assert_eq!(declared_type.to_string(), "fn(Dog) bool");
}

#[test]
fn missing_member_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let a = Parameter::new("a", animal());
    let tree = Node::lambda(access(Node::param(&a), "Age"), vec![a.clone()]);
    let doc = write(&dir, "doc.json", &encode_document(&Document { catalog: zoo(), tree }).unwrap());
    let req = write(&dir, "req.toml", "[types]\nAnimal = \"Person\"\n");

    let out = qtree(&[Path::new("rewrite"), doc.as_path(), Path::new("-r"), req.as_path()]);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("error: type `Person` has no member named `Age`"));
}

#[test]
fn unknown_node_kind_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "doc.json", r#"{ "tree": { "node": "Loop" } }"#);

    let out = qtree(&[Path::new("show"), doc.as_path()]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported node kind `Loop`"));
}

#[test]
fn invalid_request_reports_config_error() {
    let dir = TempDir::new().unwrap();
    let a = Parameter::new("a", animal());
    let doc = write(&dir, "doc.json", &animal_document(&a));
    let req = write(&dir, "req.toml", "[types]\nAnimal = \"fn(\"\n");

    let out = qtree(&[Path::new("rewrite"), doc.as_path(), Path::new("-r"), req.as_path()]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Config error"));
}
