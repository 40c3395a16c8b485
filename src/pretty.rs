use std::fmt::{self, Display, Formatter, Write};

use crate::node::*;

/// Renders a tree as C#-like source, e.g. `(Animal a) => (a.Name == "Rex")`.
/// Holes in sparse sequences render as `_`.
impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Node::Parameter(p) => f.write_str(&p.name),
            Node::MemberAccess { target, member } => write!(f, "{target}.{}", member.name),
            Node::MethodCall { receiver, method, arguments } => {
                match receiver {
                    Some(receiver) => write!(f, "{receiver}.{}", method.name)?,
                    None => write!(f, "{}.{}", method.owner, method.name)?,
                }
                emit_args(f, arguments)
            }
            Node::Constructor(call) => emit_new(f, call),
            Node::Unary { op, operand, result_type, .. } => {
                let operand = Slot(operand.as_deref());
                match op {
                    UnaryOp::Negate => write!(f, "-{operand}"),
                    UnaryOp::UnaryPlus => write!(f, "+{operand}"),
                    UnaryOp::Not => write!(f, "!{operand}"),
                    UnaryOp::OnesComplement => write!(f, "~{operand}"),
                    UnaryOp::Convert => write!(f, "({result_type}){operand}"),
                    UnaryOp::TypeAs => write!(f, "({operand} as {result_type})"),
                    UnaryOp::ArrayLength => write!(f, "{operand}.Length"),
                }
            }
            Node::Binary { op, left, right, .. } => write!(
                f,
                "({} {} {})",
                Slot(left.as_deref()),
                binary_symbol(*op),
                Slot(right.as_deref())
            ),
            Node::Conditional { test, if_true, if_false } => write!(
                f,
                "({} ? {} : {})",
                Slot(test.as_deref()),
                Slot(if_true.as_deref()),
                Slot(if_false.as_deref())
            ),
            Node::Lambda { body, parameters, .. } => {
                f.write_char('(')?;
                for (i, p) in parameters.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{} {}", p.ty, p.name)?;
                }
                write!(f, ") => {body}")
            }
            Node::ObjectInit { new, bindings } => {
                emit_new(f, new)?;
                emit_bindings(f, bindings)
            }
            Node::ListInit { new, initializers } => {
                emit_new(f, new)?;
                emit_element_inits(f, initializers)
            }
            Node::Constant { value, .. } => match value {
                ConstValue::Null => f.write_str("null"),
                ConstValue::Bool(b) => write!(f, "{b}"),
                ConstValue::Int(n) => write!(f, "{n}"),
                ConstValue::Float(x) => write!(f, "{x:?}"),
                ConstValue::Str(s) => write!(f, "{s:?}"),
            },
        }
    }
}

/// An optional child; absent renders as `_`.
struct Slot<'a>(Option<&'a Node>);

impl Display for Slot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(node) => write!(f, "{node}"),
            None => f.write_char('_'),
        }
    }
}

fn emit_args(f: &mut Formatter<'_>, args: &[Option<Node>]) -> fmt::Result {
    f.write_char('(')?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 { f.write_str(", ")?; }
        write!(f, "{}", Slot(arg.as_ref()))?;
    }
    f.write_char(')')
}

fn emit_new(f: &mut Formatter<'_>, call: &ConstructorCall) -> fmt::Result {
    write!(f, "new {}", call.constructor.owner)?;
    emit_args(f, &call.arguments)
}

fn emit_bindings(f: &mut Formatter<'_>, bindings: &[Option<Binding>]) -> fmt::Result {
    f.write_str(" {")?;
    for (i, binding) in bindings.iter().enumerate() {
        f.write_str(if i > 0 { ", " } else { " " })?;
        let Some(binding) = binding else {
            f.write_char('_')?;
            continue;
        };
        write!(f, "{} =", binding.member().name)?;
        match binding {
            Binding::Assign { value, .. } => write!(f, " {value}")?,
            Binding::ListAdd { initializers, .. } => emit_element_inits(f, initializers)?,
            Binding::NestedInit { bindings, .. } => emit_bindings(f, bindings)?,
        }
    }
    f.write_str(" }")
}

fn emit_element_inits(f: &mut Formatter<'_>, inits: &[ElementInit]) -> fmt::Result {
    f.write_str(" {")?;
    for (i, init) in inits.iter().enumerate() {
        f.write_str(if i > 0 { ", " } else { " " })?;
        match init.arguments.as_slice() {
            [single] => write!(f, "{single}")?,
            args => {
                f.write_char('{')?;
                for (j, arg) in args.iter().enumerate() {
                    if j > 0 { f.write_str(", ")?; }
                    write!(f, "{arg}")?;
                }
                f.write_char('}')?;
            }
        }
    }
    f.write_str(" }")
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::And => "&",
        BinaryOp::Or => "|",
        BinaryOp::ExclusiveOr => "^",
        BinaryOp::AndAlso => "&&",
        BinaryOp::OrElse => "||",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::LessThan => "<",
        BinaryOp::LessThanOrEqual => "<=",
        BinaryOp::GreaterThan => ">",
        BinaryOp::GreaterThanOrEqual => ">=",
        BinaryOp::Coalesce => "??",
        BinaryOp::LeftShift => "<<",
        BinaryOp::RightShift => ">>",
    }
}
