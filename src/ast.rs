// program ::= function* EOF
// function ::= 'fn' IDENT '(' ')' type block
// block ::= '{' statement* '}'
// statement ::= block | var_decl
// var_decl ::= 'var' IDENT type '=' expr ';'
// type ::= 'i32'
// expr ::= expr '+' expr
//        | expr '*' expr
//        | integer

// Precedence
//
// * (left-associative)
// + (left-associative)

use std::fmt;

use crate::{
    token::{Pos, Span},
    types::Type,
};

#[derive(Clone, PartialEq)]
pub enum Node {
    Binary(BinaryNode),
    Literal(LiteralNode),
    VarDef(VarDefNode),
    FuncDef(FuncDefNode),
    Scope(ScopeNode),
}

#[derive(Clone, PartialEq)]
pub struct BinaryNode {
    pub op: BinaryOperator,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Clone, PartialEq)]
pub struct LiteralNode {
    pub value: i64,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Clone, PartialEq)]
pub struct VarDefNode {
    pub name: Box<str>,
    pub ty: Type,
    pub value: Box<Node>,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Clone, PartialEq)]
pub struct FuncDefNode {
    pub name: Box<str>,
    pub return_ty: Type,
    pub body: ScopeNode,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Clone, PartialEq)]
pub struct ScopeNode {
    pub kind: ScopeKind,
    pub statements: Vec<Node>,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Mul,
}

impl BinaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Mul => "*",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Block,
    Global,
}

/// The kind tag of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeTag {
    BinAdd,
    BinMul,
    IntLit,
    Scope,
    GlobalScope,
    VarDef,
    FuncDef,
}

impl Node {
    pub fn start(&self) -> &Pos {
        match self {
            Node::Binary(n) => &n.start,
            Node::Literal(n) => &n.start,
            Node::VarDef(n) => &n.start,
            Node::FuncDef(n) => &n.start,
            Node::Scope(n) => &n.start,
        }
    }

    pub fn end(&self) -> &Pos {
        match self {
            Node::Binary(n) => &n.end,
            Node::Literal(n) => &n.end,
            Node::VarDef(n) => &n.end,
            Node::FuncDef(n) => &n.end,
            Node::Scope(n) => &n.end,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start().clone(), self.end().clone())
    }

    pub fn tag(&self) -> NodeTag {
        match self {
            Node::Binary(n) => n.tag(),
            Node::Literal(_) => NodeTag::IntLit,
            Node::VarDef(_) => NodeTag::VarDef,
            Node::FuncDef(_) => NodeTag::FuncDef,
            Node::Scope(n) => n.tag(),
        }
    }

    /// Name of the node variant, as shown by the debugging renderers.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Binary(_) => "BinaryNode",
            Node::Literal(_) => "LiteralNode",
            Node::VarDef(_) => "VarDefNode",
            Node::FuncDef(_) => "FuncDefNode",
            Node::Scope(_) => "ScopeNode",
        }
    }

    /// Returns the printable fields of this node, in declaration order.
    ///
    /// The intrinsic fields (`start`, `end` and the kind tag) are not part of
    /// the list.
    pub fn fields(&self) -> Vec<(&'static str, Field<'_>)> {
        match self {
            Node::Binary(n) => vec![
                ("lhs", Field::Node(&n.lhs)),
                ("rhs", Field::Node(&n.rhs)),
            ],
            Node::Literal(n) => vec![("value", Field::Value(n.value.to_string()))],
            Node::VarDef(n) => vec![
                ("name", Field::Value(format!("{:?}", n.name))),
                ("ty", Field::Value(n.ty.to_string())),
                ("value", Field::Node(&n.value)),
            ],
            Node::FuncDef(n) => vec![
                ("name", Field::Value(format!("{:?}", n.name))),
                ("return_ty", Field::Value(n.return_ty.to_string())),
                ("body", Field::Scope(&n.body)),
            ],
            Node::Scope(n) => n.fields(),
        }
    }
}

impl BinaryNode {
    pub fn tag(&self) -> NodeTag {
        match self.op {
            BinaryOperator::Add => NodeTag::BinAdd,
            BinaryOperator::Mul => NodeTag::BinMul,
        }
    }
}

impl ScopeNode {
    pub fn tag(&self) -> NodeTag {
        match self.kind {
            ScopeKind::Block => NodeTag::Scope,
            ScopeKind::Global => NodeTag::GlobalScope,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start.clone(), self.end.clone())
    }

    pub fn fields(&self) -> Vec<(&'static str, Field<'_>)> {
        let statements = self.statements.iter().map(Field::Node).collect();
        vec![("statements", Field::List(statements))]
    }
}

/// A printable field of a node.
pub enum Field<'a> {
    Node(&'a Node),
    Scope(&'a ScopeNode),
    List(Vec<Field<'a>>),
    Map(Vec<(&'a str, Field<'a>)>),
    /// An already formatted leaf value.
    Value(String),
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Node(node) => write!(f, "{node:?}"),
            Field::Scope(scope) => write!(f, "{scope:?}"),
            Field::List(items) => f.debug_list().entries(items).finish(),
            Field::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value:?}")?;
                }
                f.write_str("}")
            }
            Field::Value(value) => f.write_str(value),
        }
    }
}

fn write_repr(
    f: &mut fmt::Formatter<'_>,
    type_name: &str,
    tag: NodeTag,
    fields: &[(&'static str, Field<'_>)],
) -> fmt::Result {
    write!(f, "{type_name}(kind={tag:?}")?;
    for (name, value) in fields {
        write!(f, ", {name}={value:?}")?;
    }
    f.write_str(")")
}

/// Flat, single line rendering.
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_repr(f, self.type_name(), self.tag(), &self.fields())
    }
}

impl fmt::Debug for ScopeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_repr(f, "ScopeNode", self.tag(), &self.fields())
    }
}
