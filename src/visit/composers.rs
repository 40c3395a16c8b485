//! Composition utilities for common visitor patterns.
//!
//! # Examples
//!
//! ```ignore
//! // Does the tree still mention `old`?
//! let stale = contains_node(&tree, |n| matches!(n, Node::Parameter(p) if p.is(&old)));
//!
//! // How many member accesses were re-resolved?
//! let accesses = count_nodes(&tree, |n| matches!(n, Node::MemberAccess { .. }));
//! ```

use crate::node::{Node, Parameter};
use crate::visit::{walk_node, Visitor};
use std::collections::HashSet;

/// Check if a tree contains any node matching a predicate.
///
/// Short-circuits on first match.
pub fn contains_node<F>(node: &Node, predicate: F) -> bool
where
    F: Fn(&Node) -> bool,
{
    struct Detector<F> {
        predicate: F,
        found: bool,
    }

    impl<F> Visitor for Detector<F>
    where
        F: Fn(&Node) -> bool,
    {
        fn visit_node(&mut self, node: &Node) {
            if self.found {
                return;
            }
            if (self.predicate)(node) {
                self.found = true;
                return;
            }
            walk_node(self, node);
        }
    }

    let mut detector = Detector { predicate, found: false };
    detector.visit_node(node);
    detector.found
}

/// Count nodes matching a predicate, the root included.
pub fn count_nodes<F>(node: &Node, predicate: F) -> usize
where
    F: Fn(&Node) -> bool,
{
    struct Counter<F> {
        predicate: F,
        count: usize,
    }

    impl<F> Visitor for Counter<F>
    where
        F: Fn(&Node) -> bool,
    {
        fn visit_node(&mut self, node: &Node) {
            if (self.predicate)(node) {
                self.count += 1;
            }
            walk_node(self, node);
        }
    }

    let mut counter = Counter { predicate, count: 0 };
    counter.visit_node(node);
    counter.count
}

/// Distinct parameters (by identity) in first-occurrence order, including
/// those declared by lambdas but never referenced.
pub fn collect_parameters(node: &Node) -> Vec<Parameter> {
    #[derive(Default)]
    struct Collector {
        seen: HashSet<uuid::Uuid>,
        params: Vec<Parameter>,
    }

    impl Visitor for Collector {
        fn visit_parameter(&mut self, param: &Parameter) {
            if self.seen.insert(param.id) {
                self.params.push(param.clone());
            }
        }
    }

    let mut collector = Collector::default();
    collector.visit_node(node);
    collector.params
}
