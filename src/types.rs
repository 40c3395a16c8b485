use std::collections::HashMap;
use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::RewriteError;

/// Static type of a quoted expression.
///
/// Serialized through its textual form (`int`, `Dog`, `int?`, `[Dog]`,
/// `fn(Dog) bool`) so documents and rewrite requests stay readable. Names
/// that are not plain identifiers are backquoted (`` `List<int>` ``), and a
/// nullable function type is parenthesized (`(fn(Dog) bool)?`), so every
/// displayed type parses back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Object,
    Void,
    Named(String),
    Nullable(Box<Type>),
    Array(Box<Type>),
    Function(Vec<Type>, Box<Type>),
}

/// Words the parser reads as something other than a named type.
const RESERVED: [&str; 9] = ["bool", "int", "long", "float", "double", "string", "object", "void", "fn"];

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    pub fn array(inner: Type) -> Self {
        Type::Array(Box::new(inner))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function(params, Box::new(ret))
    }

    /// `fn(input) bool`, the signature synthesized for a retyped lambda.
    /// Rewritten lambdas are assumed to be predicates.
    pub fn predicate(input: Type) -> Self {
        Type::function(vec![input], Type::Bool)
    }
}

fn is_ident_char(i: usize, c: char) -> bool {
    c == '_' || c.is_alphanumeric() || (i > 0 && c == '.')
}

/// Whether `name` can be written bare and still parse back as `Named(name)`.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.char_indices().all(|(i, c)| is_ident_char(i, c))
        && !RESERVED.contains(&name)
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Long => write!(f, "long"),
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::String => write!(f, "string"),
            Type::Object => write!(f, "object"),
            Type::Void => write!(f, "void"),
            Type::Named(name) if is_plain_name(name) => write!(f, "{name}"),
            Type::Named(name) => {
                f.write_char('`')?;
                for c in name.chars() {
                    if c == '`' || c == '\\' {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                f.write_char('`')
            }
            // `fn(A) B?` would read as a function returning `B?`.
            Type::Nullable(inner) if matches!(**inner, Type::Function(..)) => write!(f, "({inner})?"),
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Array(inner) => write!(f, "[{inner}]"),
            Type::Function(params, ret) => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{p}")?;
                }
                write!(f, ") {ret}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type `{input}`: {msg}")]
pub struct ParseTypeError {
    pub input: String,
    pub msg: String,
}

impl FromStr for Type {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { src: s, pos: 0 };
        let ty = parser.parse_type().map_err(|msg| ParseTypeError { input: s.to_string(), msg })?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(ParseTypeError {
                input: s.to_string(),
                msg: format!("unexpected trailing input at offset {}", parser.pos),
            });
        }
        Ok(ty)
    }
}

impl TryFrom<String> for Type {
    type Error = ParseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Type> for String {
    fn from(ty: Type) -> Self {
        ty.to_string()
    }
}

/// Recursive-descent parser for the textual type syntax produced by `Display`.
struct TypeParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), String> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(format!("expected `{token}` at offset {}", self.pos))
        }
    }

    fn parse_type(&mut self) -> Result<Type, String> {
        let mut ty = self.parse_atom()?;
        while self.eat("?") {
            ty = Type::nullable(ty);
        }
        Ok(ty)
    }

    fn parse_atom(&mut self) -> Result<Type, String> {
        self.skip_ws();
        if self.eat("(") {
            let inner = self.parse_type()?;
            self.expect(")")?;
            return Ok(inner);
        }
        if self.eat("[") {
            let inner = self.parse_type()?;
            self.expect("]")?;
            return Ok(Type::array(inner));
        }
        if self.eat("`") {
            return self.parse_quoted().map(Type::Named);
        }
        let ident = self.parse_ident()?;
        if ident == "fn" {
            self.expect("(")?;
            let mut params = Vec::new();
            if !self.eat(")") {
                loop {
                    params.push(self.parse_type()?);
                    if self.eat(")") { break; }
                    self.expect(",")?;
                }
            }
            let ret = self.parse_type()?;
            return Ok(Type::function(params, ret));
        }
        Ok(match ident {
            "bool" => Type::Bool,
            "int" => Type::Int,
            "long" => Type::Long,
            "float" => Type::Float,
            "double" => Type::Double,
            "string" => Type::String,
            "object" => Type::Object,
            "void" => Type::Void,
            other => Type::Named(other.to_string()),
        })
    }

    /// The body of a backquoted name, after the opening quote.
    fn parse_quoted(&mut self) -> Result<String, String> {
        let start = self.pos;
        let mut name = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '`' => {
                    self.pos += i + 1;
                    return Ok(name);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => name.push(escaped),
                    None => break,
                },
                c => name.push(c),
            }
        }
        Err(format!("unterminated quoted name at offset {}", start - 1))
    }

    fn parse_ident(&mut self) -> Result<&'a str, String> {
        self.skip_ws();
        let start = self.pos;
        let len = self
            .rest()
            .char_indices()
            .find(|&(i, c)| !is_ident_char(i, c))
            .map(|(i, _)| i)
            .unwrap_or(self.rest().len());
        if len == 0 || self.rest().starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format!("expected a type name at offset {start}"));
        }
        self.pos += len;
        Ok(&self.src[start..self.pos])
    }
}

// ── Handles ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

/// A member resolved against a specific owner type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberHandle {
    pub owner: Type,
    pub name: String,
    pub kind: MemberKind,
    #[serde(rename = "type")]
    pub value_type: Type,
}

/// Opaque reference to a method signature. Never re-resolved by a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodHandle {
    pub owner: Type,
    pub name: String,
    #[serde(default)]
    pub params: Vec<Type>,
    #[serde(rename = "returns")]
    pub return_type: Type,
}

impl MethodHandle {
    pub fn new(owner: Type, name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self { owner, name: name.into(), params, return_type }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorHandle {
    pub owner: Type,
    #[serde(default)]
    pub params: Vec<Type>,
}

impl ConstructorHandle {
    pub fn new(owner: Type, params: Vec<Type>) -> Self {
        Self { owner, params }
    }
}

// ── Type metadata ───────────────────────────────────────────────────

/// A member as declared on a type, before it is bound to an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    #[serde(rename = "type")]
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

/// Read-only member metadata for the types a tree refers to.
///
/// Members are enumerated in declaration order, and lookups return the first
/// member whose name matches exactly. Same-named members (a property shadowing
/// a field, method overloads) are not disambiguated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeInfo>", into = "Vec<TypeInfo>")]
pub struct TypeCatalog {
    types: Vec<TypeInfo>,
    index: HashMap<Type, usize>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `ty` if it is not known yet. Redeclaring keeps the existing members.
    pub fn declare(&mut self, ty: Type) -> &mut TypeInfo {
        let idx = match self.index.get(&ty) {
            Some(&idx) => idx,
            None => {
                self.types.push(TypeInfo { ty: ty.clone(), members: Vec::new() });
                self.index.insert(ty, self.types.len() - 1);
                self.types.len() - 1
            }
        };
        &mut self.types[idx]
    }

    /// Builder-style member declaration, appended after existing members.
    pub fn with_member(mut self, owner: Type, name: impl Into<String>, kind: MemberKind, ty: Type) -> Self {
        self.declare(owner).members.push(MemberDecl { name: name.into(), kind, ty });
        self
    }

    pub fn info(&self, ty: &Type) -> Option<&TypeInfo> {
        self.index.get(ty).map(|&idx| &self.types[idx])
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    /// Resolve `name` against `owner`, first match in declaration order.
    pub fn find_member(&self, owner: &Type, name: &str) -> Result<MemberHandle, RewriteError> {
        self.info(owner)
            .and_then(|info| info.members.iter().find(|m| m.name == name))
            .map(|m| MemberHandle {
                owner: owner.clone(),
                name: m.name.clone(),
                kind: m.kind,
                value_type: m.ty.clone(),
            })
            .ok_or_else(|| RewriteError::member_not_found(owner.clone(), name))
    }
}

impl From<Vec<TypeInfo>> for TypeCatalog {
    fn from(infos: Vec<TypeInfo>) -> Self {
        let mut catalog = TypeCatalog::new();
        for info in infos {
            catalog.declare(info.ty).members.extend(info.members);
        }
        catalog
    }
}

impl From<TypeCatalog> for Vec<TypeInfo> {
    fn from(catalog: TypeCatalog) -> Self {
        catalog.types
    }
}
