//! Read-only traversal of quoted expression trees.
//!
//! Implement [`Visitor`] and override only the methods you need. Call the
//! matching `walk_*` function inside an override to keep recursing, or omit
//! it to prune traversal at that node.
//!
//! ```ignore
//! struct CallCounter { calls: usize }
//!
//! impl Visitor for CallCounter {
//!     fn visit_node(&mut self, node: &Node) {
//!         if matches!(node, Node::MethodCall { .. }) {
//!             self.calls += 1;
//!         }
//!         walk_node(self, node);
//!     }
//! }
//! ```
//!
//! Rewriting goes through [`crate::rewrite::Rewriter`] instead; visitors never
//! build nodes.

pub mod composers;

use crate::node::*;

// ============================================================================
// Visitor Trait
// ============================================================================

pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_binding(&mut self, binding: &Binding) {
        walk_binding(self, binding);
    }

    /// Called for parameter nodes and for each lambda's declared parameters.
    fn visit_parameter(&mut self, _param: &Parameter) {}
}

// ============================================================================
// Walk Functions
// ============================================================================

pub fn walk_node<V: Visitor>(v: &mut V, node: &Node) {
    match node {
        Node::Parameter(p) => v.visit_parameter(p),
        Node::MemberAccess { target, .. } => v.visit_node(target),
        Node::MethodCall { receiver, arguments, .. } => {
            if let Some(receiver) = receiver {
                v.visit_node(receiver);
            }
            walk_sparse(v, arguments);
        }
        Node::Constructor(call) => walk_sparse(v, &call.arguments),
        Node::Unary { operand, .. } => {
            if let Some(operand) = operand {
                v.visit_node(operand);
            }
        }
        Node::Binary { left, right, conversion, .. } => {
            for child in [left, right, conversion].into_iter().flatten() {
                v.visit_node(child);
            }
        }
        Node::Conditional { test, if_true, if_false } => {
            for child in [test, if_true, if_false].into_iter().flatten() {
                v.visit_node(child);
            }
        }
        Node::Lambda { body, parameters, .. } => {
            for p in parameters {
                v.visit_parameter(p);
            }
            v.visit_node(body);
        }
        Node::ObjectInit { new, bindings } => {
            walk_sparse(v, &new.arguments);
            for binding in bindings.iter().flatten() {
                v.visit_binding(binding);
            }
        }
        Node::ListInit { new, initializers } => {
            walk_sparse(v, &new.arguments);
            walk_element_inits(v, initializers);
        }
        Node::Constant { .. } => {}
    }
}

pub fn walk_binding<V: Visitor>(v: &mut V, binding: &Binding) {
    match binding {
        Binding::Assign { value, .. } => v.visit_node(value),
        Binding::ListAdd { initializers, .. } => walk_element_inits(v, initializers),
        Binding::NestedInit { bindings, .. } => {
            for binding in bindings.iter().flatten() {
                v.visit_binding(binding);
            }
        }
    }
}

fn walk_sparse<V: Visitor>(v: &mut V, nodes: &[Option<Node>]) {
    for node in nodes.iter().flatten() {
        v.visit_node(node);
    }
}

fn walk_element_inits<V: Visitor>(v: &mut V, inits: &[ElementInit]) {
    for init in inits {
        for arg in &init.arguments {
            v.visit_node(arg);
        }
    }
}
