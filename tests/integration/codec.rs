mod common;

use common::*;
use qtree::codec::{decode_document, decode_tree, encode_document, Document};
use qtree::request::parse_request;
use qtree::types::MemberKind;
use qtree::{Error, Node, Parameter, RewriteError, Type, TypeCatalog};
use std::path::Path;

#[test]
fn document_with_unknown_kind_yields_no_tree() {
    let src = r#"{
        "catalog": [],
        "tree": {
            "node": "Lambda",
            "parameters": [],
            "declared_type": "fn() bool",
            "body": { "node": "Block", "expressions": [] }
        }
    }"#;
    match decode_document(src) {
        Err(Error::Rewrite(RewriteError::UnsupportedNodeKind(kind))) => assert_eq!(kind, "Block"),
        other => panic!("expected unsupported kind, got {other:?}"),
    }
}

#[test]
fn unknown_kind_inside_binding_is_found() {
    let src = r#"{
        "node": "ObjectInit",
        "new": { "constructor": { "owner": "Pet" } },
        "bindings": [null, { "binding": "Assign", "member": { "owner": "Pet", "name": "Age", "kind": "Property", "type": "int" },
                             "value": { "node": "Switch" } }]
    }"#;
    let err = decode_tree(src).unwrap_err();
    assert_eq!(err.to_string(), "unsupported node kind `Switch`");
}

#[test]
fn catalog_round_trips_in_declaration_order() {
    let a = Parameter::new("a", animal());
    let doc = Document { catalog: zoo(), tree: name_is(&a, "Rex") };

    let json = encode_document(&doc).unwrap();
    let back = decode_document(&json).unwrap();

    assert_eq!(back, doc);
    let names: Vec<String> = back.catalog.types().map(|info| info.ty.to_string()).collect();
    assert_eq!(names, ["Animal", "Dog", "Person", "Puppy"]);
}

#[test]
fn decoded_document_rewrites_like_the_original() {
    let a = Parameter::new("a", animal());
    let doc = Document { catalog: zoo(), tree: name_is(&a, "Rex") };
    let decoded = decode_document(&encode_document(&doc).unwrap()).unwrap();

    let request = format!("[parameter]\nold = \"{}\"\nname = \"d\"\ntype = \"Dog\"\n", a.id);
    let request = parse_request(&request, Path::new("req.toml")).unwrap();
    let out = request.apply(&decoded.tree, &decoded.catalog).unwrap();

    assert_eq!(out.to_string(), r#"(Dog d) => (d.Name == "Rex")"#);
    let Node::Lambda { declared_type, .. } = out else { panic!("expected lambda") };
    assert_eq!(declared_type.to_string(), "fn(Dog) bool");
}

#[test]
fn bad_type_string_is_a_json_error() {
    let src = r#"{ "node": "Constant", "value": "Null", "static_type": "[int" }"#;
    assert!(matches!(decode_tree(src), Err(Error::Json(_))));
}

#[test]
fn unusual_type_names_survive_a_round_trip() {
    let anon = Type::named("<>Anon");
    let catalog = TypeCatalog::new().with_member(anon.clone(), "Items", MemberKind::Property, Type::named("List<int>"));
    let x = Parameter::new("x", anon.clone());
    let callback = Parameter::new("f", Type::nullable(Type::predicate(dog())));
    let keyword = Parameter::new("k", Type::array(Type::named("int")));
    let items = Node::member(Node::param(&x), catalog.find_member(&anon, "Items").unwrap());
    let doc = Document { catalog, tree: Node::lambda(items, vec![x, callback, keyword]) };

    let json = encode_document(&doc).unwrap();
    assert!(json.contains(r#""(fn(Dog) bool)?""#), "{json}");
    assert!(json.contains(r#""`<>Anon`""#), "{json}");

    assert_eq!(decode_document(&json).unwrap(), doc);
}
