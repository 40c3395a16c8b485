use crate::node::{Node, Parameter};
use crate::types::{MemberHandle, Type, TypeCatalog};

use super::{rebind_member, rewrite, RewriteResult, Rewriter};

/// Replaces one parameter, by identity, with another.
///
/// When the replacement has a different type, member accesses rooted on it
/// are re-resolved against the new type and lambdas that bound a parameter of
/// the old type are retyped as `fn(new) bool`.
pub struct ParameterSubstitution<'a> {
    old: &'a Parameter,
    new: &'a Parameter,
    catalog: &'a TypeCatalog,
}

impl<'a> ParameterSubstitution<'a> {
    pub fn new(old: &'a Parameter, new: &'a Parameter, catalog: &'a TypeCatalog) -> Self {
        Self { old, new, catalog }
    }

    pub fn run(&mut self, root: &Node) -> RewriteResult {
        if self.old == self.new {
            return Ok(root.clone());
        }
        tracing::debug!(
            root = %root.kind(),
            old = %self.old.name,
            new = %self.new.name,
            new_type = %self.new.ty,
            "substituting parameter"
        );
        rewrite(self, root)
    }
}

impl Rewriter for ParameterSubstitution<'_> {
    fn rewrite_parameter(&mut self, param: &Parameter) -> Parameter {
        if param.is(self.old) {
            self.new.clone()
        } else {
            param.clone()
        }
    }

    fn rewrite_member_access(&mut self, target: &Node, member: &MemberHandle) -> RewriteResult {
        let target = rewrite(self, target)?;
        let force = target.static_type() == self.new.ty;
        rebind_member(self.catalog, target, member, force)
    }

    fn rewrite_lambda(&mut self, body: &Node, parameters: &[Parameter], declared_type: &Type) -> RewriteResult {
        // Decided on the parameter list as written, before substitution.
        let retype = parameters.iter().any(|p| p.ty == self.old.ty);
        let body = rewrite(self, body)?;
        let parameters: Vec<Parameter> = parameters.iter().map(|p| self.rewrite_parameter(p)).collect();
        let declared_type = if retype {
            let retyped = Type::predicate(self.new.ty.clone());
            tracing::trace!(from = %declared_type, to = %retyped, "retyped lambda");
            retyped
        } else {
            declared_type.clone()
        };
        Ok(Node::Lambda { body: Box::new(body), parameters, declared_type })
    }
}
