//! Quoted expression trees.
//!
//! A `Node` is code captured as data: the shape a predicate such as
//! `a => a.Name == "Rex"` takes once it has been quoted instead of compiled.
//! The set of node kinds is closed. Rewrites never mutate a node; they build
//! a new tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ConstructorHandle, MemberHandle, MethodHandle, Type};

/// A placeholder bound by an enclosing lambda.
///
/// Two parameters may share a name and a type and still be distinct; only
/// `id` decides whether two parameter nodes refer to the same variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Parameter {
    /// A fresh parameter with a new identity.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), ty }
    }

    pub fn with_id(id: Uuid, name: impl Into<String>, ty: Type) -> Self {
        Self { id, name: name.into(), ty }
    }

    /// Identity comparison, ignoring name and type.
    pub fn is(&self, other: &Parameter) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(serialize_with = "finite_float")] f64),
    Str(String),
}

/// JSON has no spelling for NaN or the infinities.
fn finite_float<S: serde::Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    if !x.is_finite() {
        return Err(serde::ser::Error::custom(format!("float constant {x} has no JSON form")));
    }
    s.serialize_f64(*x)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    UnaryPlus,
    Not,
    OnesComplement,
    Convert,
    TypeAs,
    ArrayLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    ExclusiveOr,
    AndAlso,
    OrElse,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Coalesce,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::AndAlso | BinaryOp::OrElse)
    }
}

/// A constructor invocation, standalone or as the head of an object initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorCall {
    pub constructor: ConstructorHandle,
    #[serde(default)]
    pub arguments: Vec<Option<Node>>,
    /// Anonymous-type members paired with `arguments`. Never rewritten.
    #[serde(default)]
    pub members: Vec<MemberHandle>,
}

impl ConstructorCall {
    pub fn new(constructor: ConstructorHandle, arguments: Vec<Option<Node>>) -> Self {
        Self { constructor, arguments, members: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInit {
    pub add_method: MethodHandle,
    #[serde(default)]
    pub arguments: Vec<Node>,
}

/// One member binding of an object initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "binding")]
pub enum Binding {
    /// `Member = value`
    Assign { member: MemberHandle, value: Node },
    /// `Member = { a, b }`, each element passed to an add method.
    ListAdd {
        member: MemberHandle,
        #[serde(default)]
        initializers: Vec<ElementInit>,
    },
    /// `Member = { Inner = ... }`
    NestedInit {
        member: MemberHandle,
        #[serde(default)]
        bindings: Vec<Option<Binding>>,
    },
}

impl Binding {
    pub fn member(&self) -> &MemberHandle {
        match self {
            Binding::Assign { member, .. }
            | Binding::ListAdd { member, .. }
            | Binding::NestedInit { member, .. } => member,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum Node {
    Parameter(Parameter),
    MemberAccess {
        target: Box<Node>,
        /// Resolved against `target`'s static type; `member.owner` is the
        /// resolved owner type.
        member: MemberHandle,
    },
    MethodCall {
        receiver: Option<Box<Node>>,
        method: MethodHandle,
        #[serde(default)]
        arguments: Vec<Option<Node>>,
    },
    Constructor(ConstructorCall),
    Unary {
        op: UnaryOp,
        operand: Option<Box<Node>>,
        result_type: Type,
        method: Option<MethodHandle>,
    },
    Binary {
        op: BinaryOp,
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
        #[serde(default)]
        lifts_to_nullable: bool,
        method: Option<MethodHandle>,
        conversion: Option<Box<Node>>,
    },
    Conditional {
        test: Option<Box<Node>>,
        if_true: Option<Box<Node>>,
        if_false: Option<Box<Node>>,
    },
    Lambda {
        body: Box<Node>,
        #[serde(default)]
        parameters: Vec<Parameter>,
        declared_type: Type,
    },
    ObjectInit {
        new: ConstructorCall,
        #[serde(default)]
        bindings: Vec<Option<Binding>>,
    },
    /// A collection constructor followed by add calls: `new List<T> { a, b }`.
    ListInit {
        new: ConstructorCall,
        #[serde(default)]
        initializers: Vec<ElementInit>,
    },
    Constant {
        value: ConstValue,
        static_type: Type,
    },
}

/// The closed set of node kinds, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Parameter,
    MemberAccess,
    MethodCall,
    Constructor,
    Unary,
    Binary,
    Conditional,
    Lambda,
    ObjectInit,
    ListInit,
    Constant,
}

impl NodeKind {
    pub const ALL: [NodeKind; 11] = [
        NodeKind::Parameter,
        NodeKind::MemberAccess,
        NodeKind::MethodCall,
        NodeKind::Constructor,
        NodeKind::Unary,
        NodeKind::Binary,
        NodeKind::Conditional,
        NodeKind::Lambda,
        NodeKind::ObjectInit,
        NodeKind::ListInit,
        NodeKind::Constant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Parameter => "Parameter",
            NodeKind::MemberAccess => "MemberAccess",
            NodeKind::MethodCall => "MethodCall",
            NodeKind::Constructor => "Constructor",
            NodeKind::Unary => "Unary",
            NodeKind::Binary => "Binary",
            NodeKind::Conditional => "Conditional",
            NodeKind::Lambda => "Lambda",
            NodeKind::ObjectInit => "ObjectInit",
            NodeKind::ListInit => "ListInit",
            NodeKind::Constant => "Constant",
        }
    }

    pub fn from_name(name: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Parameter(_) => NodeKind::Parameter,
            Node::MemberAccess { .. } => NodeKind::MemberAccess,
            Node::MethodCall { .. } => NodeKind::MethodCall,
            Node::Constructor(_) => NodeKind::Constructor,
            Node::Unary { .. } => NodeKind::Unary,
            Node::Binary { .. } => NodeKind::Binary,
            Node::Conditional { .. } => NodeKind::Conditional,
            Node::Lambda { .. } => NodeKind::Lambda,
            Node::ObjectInit { .. } => NodeKind::ObjectInit,
            Node::ListInit { .. } => NodeKind::ListInit,
            Node::Constant { .. } => NodeKind::Constant,
        }
    }

    /// The static type this node evaluates to.
    pub fn static_type(&self) -> Type {
        match self {
            Node::Parameter(p) => p.ty.clone(),
            Node::MemberAccess { member, .. } => member.value_type.clone(),
            Node::MethodCall { method, .. } => method.return_type.clone(),
            Node::Constructor(call)
            | Node::ObjectInit { new: call, .. }
            | Node::ListInit { new: call, .. } => call.constructor.owner.clone(),
            Node::Unary { result_type, .. } => result_type.clone(),
            Node::Binary { op, left, right, lifts_to_nullable, method, .. } => {
                if let Some(method) = method {
                    return method.return_type.clone();
                }
                if op.is_comparison() || op.is_short_circuit() {
                    return if *lifts_to_nullable { Type::nullable(Type::Bool) } else { Type::Bool };
                }
                let operand = if *op == BinaryOp::Coalesce {
                    right.as_deref().or(left.as_deref())
                } else {
                    left.as_deref().or(right.as_deref())
                };
                operand.map(Node::static_type).unwrap_or(Type::Object)
            }
            Node::Conditional { if_true, if_false, .. } => if_true
                .as_deref()
                .or(if_false.as_deref())
                .map(Node::static_type)
                .unwrap_or(Type::Void),
            Node::Lambda { declared_type, .. } => declared_type.clone(),
            Node::Constant { static_type, .. } => static_type.clone(),
        }
    }

    // ── Construction helpers ────────────────────────────────────────

    pub fn param(p: &Parameter) -> Node {
        Node::Parameter(p.clone())
    }

    pub fn constant(value: ConstValue, static_type: Type) -> Node {
        Node::Constant { value, static_type }
    }

    pub fn member(target: Node, member: MemberHandle) -> Node {
        Node::MemberAccess { target: Box::new(target), member }
    }

    pub fn call(receiver: Option<Node>, method: MethodHandle, arguments: Vec<Option<Node>>) -> Node {
        Node::MethodCall { receiver: receiver.map(Box::new), method, arguments }
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            lifts_to_nullable: false,
            method: None,
            conversion: None,
        }
    }

    pub fn unary(op: UnaryOp, operand: Node, result_type: Type) -> Node {
        Node::Unary { op, operand: Some(Box::new(operand)), result_type, method: None }
    }

    pub fn conditional(test: Node, if_true: Node, if_false: Node) -> Node {
        Node::Conditional {
            test: Some(Box::new(test)),
            if_true: Some(Box::new(if_true)),
            if_false: Some(Box::new(if_false)),
        }
    }

    /// A lambda whose declared type is `fn(params) body_type`.
    pub fn lambda(body: Node, parameters: Vec<Parameter>) -> Node {
        let declared_type = Type::function(
            parameters.iter().map(|p| p.ty.clone()).collect(),
            body.static_type(),
        );
        Node::Lambda { body: Box::new(body), parameters, declared_type }
    }
}
