//! Abstract syntax tree

use serde::Serialize;

/// A parsed specification, with imported modules merged in front of the
/// definitions of the main module.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Specification {
    pub name: String,
    pub definitions: Vec<Definition>,
}

impl Specification {
    /// Names of the modules this specification imports, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().filter_map(|d| match &d.kind {
            DefinitionKind::Import(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Statement])> {
        self.definitions.iter().filter_map(|d| match &d.kind {
            DefinitionKind::Rule { name, body } => Some((name.as_str(), body.as_slice())),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.definitions.iter().filter_map(|d| match &d.kind {
            DefinitionKind::Function { name, initial } => Some((name.as_str(), initial)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub line: usize,
    /// Module the definition came from
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DefinitionKind {
    Import(String),
    Init(String),
    Function { name: String, initial: Literal },
    Rule { name: String, body: Vec<Statement> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementKind {
    Update { location: String, value: Expr },
    Print(Expr),
    Call(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Location(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
        }
    }
}
