//! Rewriting of quoted expression trees.
//!
//! Two rules share one dispatcher:
//!
//! - [`substitute_parameter`] swaps one parameter, by identity, for another.
//! - [`substitute_types`] retypes every parameter whose type is a key of a
//!   type map.
//!
//! Both re-resolve member accesses and lambda signatures that depend on the
//! changed types, against the member metadata in a [`TypeCatalog`].

pub mod codec;
pub mod diagnostics;
pub mod node;
pub mod pretty;
pub mod request;
pub mod rewrite;
pub mod types;
pub mod visit;

pub use diagnostics::{Error, RewriteError};
pub use node::{Binding, ConstValue, ConstructorCall, ElementInit, Node, NodeKind, Parameter};
pub use rewrite::TypeMap;
pub use types::{MemberHandle, Type, TypeCatalog};

use rewrite::{ParameterSubstitution, TypeSubstitution};

/// Replace every occurrence of `old` (by identity) in `root` with `new`.
///
/// Member accesses rooted on the replacement are re-resolved against its type,
/// and lambdas that bound a parameter of `old`'s type are retyped as
/// `fn(new type) bool`. The input tree is left untouched.
pub fn substitute_parameter(
    root: &Node,
    old: &Parameter,
    new: &Parameter,
    catalog: &TypeCatalog,
) -> Result<Node, RewriteError> {
    ParameterSubstitution::new(old, new, catalog).run(root)
}

/// Retype every parameter whose declared type is a key of `type_map`.
///
/// Constants keep their declared types. Lambdas are retyped only when their
/// first parameter's type is a key.
pub fn substitute_types(root: &Node, type_map: &TypeMap, catalog: &TypeCatalog) -> Result<Node, RewriteError> {
    TypeSubstitution::new(type_map, catalog).run(root)
}
