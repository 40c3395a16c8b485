#![allow(dead_code)]

use qtree::node::{BinaryOp, ConstValue};
use qtree::types::MemberKind;
use qtree::{MemberHandle, Node, Parameter, Type, TypeCatalog};

pub fn animal() -> Type {
    Type::named("Animal")
}

pub fn dog() -> Type {
    Type::named("Dog")
}

pub fn puppy() -> Type {
    Type::named("Puppy")
}

pub fn person() -> Type {
    Type::named("Person")
}

/// Animal, Dog, Person, Puppy, each with members in a fixed declaration order.
///
/// `Best` is typed differently on Animal and Dog, so a chained access
/// such as `a.Best.Name` changes owner twice when `a` becomes a Dog.
pub fn zoo() -> TypeCatalog {
    TypeCatalog::new()
        .with_member(animal(), "Name", MemberKind::Property, Type::String)
        .with_member(animal(), "Age", MemberKind::Property, Type::Int)
        .with_member(animal(), "Best", MemberKind::Property, animal())
        .with_member(dog(), "Name", MemberKind::Property, Type::String)
        .with_member(dog(), "Age", MemberKind::Property, Type::Int)
        .with_member(dog(), "Owner", MemberKind::Property, person())
        .with_member(dog(), "Best", MemberKind::Property, puppy())
        .with_member(person(), "Name", MemberKind::Field, Type::String)
        .with_member(person(), "Pets", MemberKind::Property, Type::array(dog()))
        .with_member(puppy(), "Name", MemberKind::Property, Type::String)
        .with_member(puppy(), "Age", MemberKind::Property, Type::Int)
}

pub fn member(owner: &Type, name: &str) -> MemberHandle {
    zoo().find_member(owner, name).expect("fixture member")
}

pub fn access(target: Node, name: &str) -> Node {
    let owner = target.static_type();
    Node::member(target, member(&owner, name))
}

pub fn string(s: &str) -> Node {
    Node::constant(ConstValue::Str(s.to_string()), Type::String)
}

pub fn int(n: i64) -> Node {
    Node::constant(ConstValue::Int(n), Type::Int)
}

pub fn eq(left: Node, right: Node) -> Node {
    Node::binary(BinaryOp::Equal, left, right)
}

/// `(Animal a) => (a.Name == name)` as a predicate.
pub fn name_is(param: &Parameter, name: &str) -> Node {
    Node::lambda(eq(access(Node::param(param), "Name"), string(name)), vec![param.clone()])
}
