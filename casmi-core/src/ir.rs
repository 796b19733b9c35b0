//! Flat stack-machine IR
//!
//! Every rule lowers to a list of instructions; expressions push onto an
//! operand stack and `Store` / `Print` pop from it.

use crate::ast::{BinaryOp, Expr, Literal, StatementKind};
use crate::check::CheckedSpecification;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "operand", rename_all = "snake_case")]
pub enum Instruction {
    PushInt(i64),
    PushStr(String),
    Load(String),
    Store(String),
    Add,
    Sub,
    Print,
    Call(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub name: String,
    pub initial: Literal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCode {
    pub name: String,
    pub code: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub name: String,
    pub init: String,
    pub locations: Vec<Location>,
    pub rules: Vec<RuleCode>,
}

impl Program {
    pub fn rule(&self, name: &str) -> Option<&RuleCode> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn instruction_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.code.len()).sum()
    }
}

/// Lower a checked specification.
pub fn lower(checked: &CheckedSpecification) -> Program {
    let specification = &checked.specification;

    let locations = specification
        .functions()
        .map(|(name, initial)| Location {
            name: name.to_string(),
            initial: initial.clone(),
        })
        .collect();

    let rules = specification
        .rules()
        .map(|(name, body)| {
            let mut code = Vec::new();
            for statement in body {
                match &statement.kind {
                    StatementKind::Update { location, value } => {
                        lower_expr(value, &mut code);
                        code.push(Instruction::Store(location.clone()));
                    }
                    StatementKind::Print(value) => {
                        lower_expr(value, &mut code);
                        code.push(Instruction::Print);
                    }
                    StatementKind::Call(rule) => code.push(Instruction::Call(rule.clone())),
                }
            }
            RuleCode {
                name: name.to_string(),
                code,
            }
        })
        .collect();

    Program {
        name: specification.name.clone(),
        init: checked.init.clone(),
        locations,
        rules,
    }
}

fn lower_expr(expr: &Expr, code: &mut Vec<Instruction>) {
    match expr {
        Expr::Literal(Literal::Integer(value)) => code.push(Instruction::PushInt(*value)),
        Expr::Literal(Literal::String(text)) => code.push(Instruction::PushStr(text.clone())),
        Expr::Location(name) => code.push(Instruction::Load(name.clone())),
        Expr::Binary { op, lhs, rhs } => {
            lower_expr(lhs, code);
            lower_expr(rhs, code);
            code.push(match op {
                BinaryOp::Add => Instruction::Add,
                BinaryOp::Sub => Instruction::Sub,
            });
        }
    }
}
