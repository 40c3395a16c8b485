//! JSON documents: a tree together with the type metadata it is resolved against.
//!
//! ```json
//! {
//!   "catalog": [{ "type": "Dog", "members": [{ "name": "Name", "kind": "Property", "type": "string" }] }],
//!   "tree": { "node": "Parameter", "id": "…", "name": "d", "type": "Dog" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{Error, RewriteError};
use crate::node::{Node, NodeKind};
use crate::types::TypeCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub catalog: TypeCatalog,
    pub tree: Node,
}

/// Decode a document. A node tagged with a kind outside the closed set fails
/// with [`RewriteError::UnsupportedNodeKind`]; nothing is decoded in that case.
pub fn decode_document(src: &str) -> Result<Document, Error> {
    let value: Value = serde_json::from_str(src)?;
    check_node_kinds(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Decode a bare tree with the same kind check as [`decode_document`].
pub fn decode_tree(src: &str) -> Result<Node, Error> {
    let value: Value = serde_json::from_str(src)?;
    check_node_kinds(&value)?;
    Ok(serde_json::from_value(value)?)
}

pub fn encode_document(doc: &Document) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn read_document(path: &Path) -> Result<Document, Error> {
    let src = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    decode_document(&src)
}

fn check_node_kinds(value: &Value) -> Result<(), RewriteError> {
    match value {
        Value::Object(fields) => {
            if let Some(Value::String(tag)) = fields.get("node") {
                if NodeKind::from_name(tag).is_none() {
                    return Err(RewriteError::unsupported(tag.as_str()));
                }
            }
            fields.values().try_for_each(check_node_kinds)
        }
        Value::Array(items) => items.iter().try_for_each(check_node_kinds),
        _ => Ok(()),
    }
}
