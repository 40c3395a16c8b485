use std::collections::HashMap;

use uuid::Uuid;

use crate::node::{Node, Parameter};
use crate::types::{MemberHandle, Type, TypeCatalog};

use super::{rebind_member, rewrite, RewriteResult, Rewriter};

/// Source type → replacement type. Only exact keys match; a `[Animal]` is not
/// rewritten by an `Animal` entry.
pub type TypeMap = HashMap<Type, Type>;

/// Replaces every parameter whose declared type is a key of the map and
/// re-derives the member accesses and lambda signatures that depend on it.
pub struct TypeSubstitution<'a> {
    map: &'a TypeMap,
    catalog: &'a TypeCatalog,
    /// Replacements minted so far, keyed by the original identity, so every
    /// occurrence of one parameter maps to the same new parameter.
    retyped: HashMap<Uuid, Parameter>,
}

impl<'a> TypeSubstitution<'a> {
    pub fn new(map: &'a TypeMap, catalog: &'a TypeCatalog) -> Self {
        Self { map, catalog, retyped: HashMap::new() }
    }

    pub fn run(&mut self, root: &Node) -> RewriteResult {
        if self.map.is_empty() {
            return Ok(root.clone());
        }
        tracing::debug!(root = %root.kind(), entries = self.map.len(), "substituting types");
        rewrite(self, root)
    }
}

impl Rewriter for TypeSubstitution<'_> {
    fn rewrite_parameter(&mut self, param: &Parameter) -> Parameter {
        let Some(to) = self.map.get(&param.ty) else {
            return param.clone();
        };
        self.retyped
            .entry(param.id)
            .or_insert_with(|| Parameter::new(param.name.clone(), to.clone()))
            .clone()
    }

    fn rewrite_member_access(&mut self, target: &Node, member: &MemberHandle) -> RewriteResult {
        let target = rewrite(self, target)?;
        let force = self.map.contains_key(&target.static_type());
        rebind_member(self.catalog, target, member, force)
    }

    fn rewrite_lambda(&mut self, body: &Node, parameters: &[Parameter], declared_type: &Type) -> RewriteResult {
        // Only the first parameter decides the new signature.
        let retyped = parameters.first().and_then(|p| self.map.get(&p.ty)).map(|to| Type::predicate(to.clone()));
        let body = rewrite(self, body)?;
        let parameters: Vec<Parameter> = parameters.iter().map(|p| self.rewrite_parameter(p)).collect();
        let declared_type = match retyped {
            Some(retyped) => {
                tracing::trace!(from = %declared_type, to = %retyped, "retyped lambda");
                retyped
            }
            None => declared_type.clone(),
        };
        Ok(Node::Lambda { body: Box::new(body), parameters, declared_type })
    }
}
