//! Tree rewriting infrastructure.
//!
//! A rewrite rule implements [`Rewriter`], overriding only the node kinds it
//! cares about. Every other kind falls through to the `walk_*` functions,
//! which rebuild the node from rewritten children and leave handles alone.
//! [`rewrite`] is the single dispatch point shared by every rule.
//!
//! ```ignore
//! struct Rename<'a> { from: &'a Parameter, to: &'a Parameter }
//!
//! impl Rewriter for Rename<'_> {
//!     fn rewrite_parameter(&mut self, p: &Parameter) -> Parameter {
//!         if p.is(self.from) { self.to.clone() } else { p.clone() }
//!     }
//! }
//!
//! let renamed = rewrite(&mut Rename { from: &a, to: &b }, &tree)?;
//! ```
//!
//! Rewrites never mutate their input. Each call rebuilds the whole tree, so
//! the result shares nothing with the original.

pub mod param;
pub mod type_map;

pub use param::ParameterSubstitution;
pub use type_map::{TypeMap, TypeSubstitution};

use crate::diagnostics::RewriteError;
use crate::node::*;
use crate::types::{MemberHandle, Type, TypeCatalog};

pub type RewriteResult<T = Node> = Result<T, RewriteError>;

// ============================================================================
// Rewriter Trait
// ============================================================================

/// Per-kind rewrite logic. Defaults rebuild the node structurally.
pub trait Rewriter: Sized {
    /// Rewrite a parameter, whether it appears as a node or in a lambda's
    /// parameter list.
    fn rewrite_parameter(&mut self, param: &Parameter) -> Parameter {
        param.clone()
    }

    fn rewrite_member_access(&mut self, target: &Node, member: &MemberHandle) -> RewriteResult {
        walk_member_access(self, target, member)
    }

    fn rewrite_lambda(&mut self, body: &Node, parameters: &[Parameter], declared_type: &Type) -> RewriteResult {
        walk_lambda(self, body, parameters, declared_type)
    }

    fn rewrite_constant(&mut self, value: &ConstValue, static_type: &Type) -> RewriteResult {
        Ok(Node::Constant { value: value.clone(), static_type: static_type.clone() })
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Rewrite `node` under `rule`.
///
/// The match is exhaustive over the closed node set. Kinds outside it can only
/// arrive through decoding, which rejects them with
/// [`RewriteError::UnsupportedNodeKind`] before a tree exists.
pub fn rewrite<R: Rewriter>(rule: &mut R, node: &Node) -> RewriteResult {
    match node {
        Node::Parameter(p) => Ok(Node::Parameter(rule.rewrite_parameter(p))),
        Node::MemberAccess { target, member } => rule.rewrite_member_access(target, member),
        Node::MethodCall { receiver, method, arguments } => Ok(Node::MethodCall {
            receiver: rewrite_opt(rule, receiver)?,
            method: method.clone(),
            arguments: rewrite_sparse(rule, arguments)?,
        }),
        Node::Constructor(call) => Ok(Node::Constructor(walk_constructor_call(rule, call)?)),
        Node::Unary { op, operand, result_type, method } => Ok(Node::Unary {
            op: *op,
            operand: rewrite_opt(rule, operand)?,
            result_type: result_type.clone(),
            method: method.clone(),
        }),
        Node::Binary { op, left, right, lifts_to_nullable, method, conversion } => Ok(Node::Binary {
            op: *op,
            left: rewrite_opt(rule, left)?,
            right: rewrite_opt(rule, right)?,
            lifts_to_nullable: *lifts_to_nullable,
            method: method.clone(),
            conversion: rewrite_opt(rule, conversion)?,
        }),
        Node::Conditional { test, if_true, if_false } => Ok(Node::Conditional {
            test: rewrite_opt(rule, test)?,
            if_true: rewrite_opt(rule, if_true)?,
            if_false: rewrite_opt(rule, if_false)?,
        }),
        Node::Lambda { body, parameters, declared_type } => rule.rewrite_lambda(body, parameters, declared_type),
        Node::ObjectInit { new, bindings } => Ok(Node::ObjectInit {
            new: walk_constructor_call(rule, new)?,
            bindings: rewrite_bindings(rule, bindings)?,
        }),
        Node::ListInit { new, initializers } => Ok(Node::ListInit {
            new: walk_constructor_call(rule, new)?,
            initializers: rewrite_element_inits(rule, initializers)?,
        }),
        Node::Constant { value, static_type } => rule.rewrite_constant(value, static_type),
    }
}

// ============================================================================
// Walk Functions
// ============================================================================

pub fn walk_member_access<R: Rewriter>(rule: &mut R, target: &Node, member: &MemberHandle) -> RewriteResult {
    Ok(Node::member(rewrite(rule, target)?, member.clone()))
}

pub fn walk_lambda<R: Rewriter>(
    rule: &mut R,
    body: &Node,
    parameters: &[Parameter],
    declared_type: &Type,
) -> RewriteResult {
    Ok(Node::Lambda {
        body: Box::new(rewrite(rule, body)?),
        parameters: parameters.iter().map(|p| rule.rewrite_parameter(p)).collect(),
        declared_type: declared_type.clone(),
    })
}

pub fn walk_constructor_call<R: Rewriter>(rule: &mut R, call: &ConstructorCall) -> RewriteResult<ConstructorCall> {
    Ok(ConstructorCall {
        constructor: call.constructor.clone(),
        arguments: rewrite_sparse(rule, &call.arguments)?,
        members: call.members.clone(),
    })
}

pub fn walk_binding<R: Rewriter>(rule: &mut R, binding: &Binding) -> RewriteResult<Binding> {
    Ok(match binding {
        Binding::Assign { member, value } => Binding::Assign {
            member: member.clone(),
            value: rewrite(rule, value)?,
        },
        Binding::ListAdd { member, initializers } => Binding::ListAdd {
            member: member.clone(),
            initializers: rewrite_element_inits(rule, initializers)?,
        },
        Binding::NestedInit { member, bindings } => Binding::NestedInit {
            member: member.clone(),
            bindings: rewrite_bindings(rule, bindings)?,
        },
    })
}

// ============================================================================
// Sequences
// ============================================================================

fn rewrite_opt<R: Rewriter>(rule: &mut R, node: &Option<Box<Node>>) -> RewriteResult<Option<Box<Node>>> {
    node.as_deref().map(|n| rewrite(rule, n).map(Box::new)).transpose()
}

/// Rewrite a sequence that may contain holes. A hole stays a hole at the same index.
pub fn rewrite_sparse<R: Rewriter>(rule: &mut R, nodes: &[Option<Node>]) -> RewriteResult<Vec<Option<Node>>> {
    nodes
        .iter()
        .map(|slot| slot.as_ref().map(|n| rewrite(rule, n)).transpose())
        .collect()
}

pub fn rewrite_bindings<R: Rewriter>(rule: &mut R, bindings: &[Option<Binding>]) -> RewriteResult<Vec<Option<Binding>>> {
    bindings
        .iter()
        .map(|slot| slot.as_ref().map(|b| walk_binding(rule, b)).transpose())
        .collect()
}

pub fn rewrite_element_inits<R: Rewriter>(rule: &mut R, inits: &[ElementInit]) -> RewriteResult<Vec<ElementInit>> {
    inits
        .iter()
        .map(|init| {
            Ok(ElementInit {
                add_method: init.add_method.clone(),
                arguments: init.arguments.iter().map(|a| rewrite(rule, a)).collect::<RewriteResult<_>>()?,
            })
        })
        .collect()
}

// ============================================================================
// Member re-resolution
// ============================================================================

/// Build a member access over an already rewritten `target`.
///
/// The member is looked up again by name against the target's static type
/// when `force` is set or when that type no longer matches the owner the
/// member was resolved against. Otherwise the original handle is kept.
pub(crate) fn rebind_member(
    catalog: &TypeCatalog,
    target: Node,
    member: &MemberHandle,
    force: bool,
) -> RewriteResult {
    let target_type = target.static_type();
    if !force && target_type == member.owner {
        return Ok(Node::member(target, member.clone()));
    }
    let rebound = catalog.find_member(&target_type, &member.name)?;
    tracing::trace!(
        member = %member.name,
        from = %member.owner,
        to = %rebound.owner,
        "re-resolved member access"
    );
    Ok(Node::member(target, rebound))
}
