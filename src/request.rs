//! Rewrite requests, read from TOML.
//!
//! ```toml
//! [parameter]
//! old = "0b6c7c4e-5d1f-4a52-9b53-3c1f0f6a8e21"
//! name = "d"
//! type = "Dog"
//! ```
//!
//! or
//!
//! ```toml
//! [types]
//! Animal = "Dog"
//! int = "long"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::diagnostics::{Error, RewriteError};
use crate::node::{Node, Parameter};
use crate::rewrite::{ParameterSubstitution, TypeMap, TypeSubstitution};
use crate::types::{Type, TypeCatalog};
use crate::visit::composers::collect_parameters;

/// One rule, ready to run against a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteRequest {
    /// Replace the parameter whose identity is `old`.
    Parameter { old: Uuid, new: Parameter },
    Types(TypeMap),
}

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRequest {
    parameter: Option<TomlParameter>,
    types: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlParameter {
    old: Uuid,
    name: String,
    #[serde(rename = "type")]
    ty: String,
    id: Option<Uuid>,
}

pub fn load_request(path: &Path) -> Result<RewriteRequest, Error> {
    let src = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_request(&src, path)
}

/// Parse a request. `path` is only used in error messages.
pub fn parse_request(src: &str, path: &Path) -> Result<RewriteRequest, Error> {
    let raw: TomlRequest = toml::from_str(src)
        .map_err(|e| Error::config(format!("invalid rewrite request: {}", e.message()), path))?;

    match (raw.parameter, raw.types) {
        (Some(_), Some(_)) => Err(Error::config("specify either [parameter] or [types], not both", path)),
        (None, None) => Err(Error::config("request must contain a [parameter] or [types] table", path)),
        (Some(param), None) => {
            let ty = parse_type(&param.ty, path)?;
            let new = match param.id {
                Some(id) => Parameter::with_id(id, param.name, ty),
                None => Parameter::new(param.name, ty),
            };
            Ok(RewriteRequest::Parameter { old: param.old, new })
        }
        (None, Some(types)) => {
            let mut map = TypeMap::new();
            for (from, to) in &types {
                map.insert(parse_type(from, path)?, parse_type(to, path)?);
            }
            Ok(RewriteRequest::Types(map))
        }
    }
}

fn parse_type(src: &str, path: &Path) -> Result<Type, Error> {
    src.parse::<Type>().map_err(|e| Error::config(e.to_string(), path))
}

impl RewriteRequest {
    /// Run the requested rule against `root`.
    ///
    /// A parameter request whose `old` identity does not occur in the tree
    /// leaves the tree unchanged.
    pub fn apply(&self, root: &Node, catalog: &TypeCatalog) -> Result<Node, RewriteError> {
        match self {
            RewriteRequest::Parameter { old, new } => {
                let Some(old) = collect_parameters(root).into_iter().find(|p| p.id == *old) else {
                    tracing::warn!(%old, "parameter not found in tree; nothing to substitute");
                    return Ok(root.clone());
                };
                ParameterSubstitution::new(&old, new, catalog).run(root)
            }
            RewriteRequest::Types(map) => TypeSubstitution::new(map, catalog).run(root),
        }
    }
}
