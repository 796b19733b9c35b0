//! Name resolution and type checking

use crate::ast::{DefinitionKind, Expr, Literal, Specification, Statement, StatementKind};
use crate::error::CheckError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Type {
    Integer,
    String,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => f.write_str("Integer"),
            Type::String => f.write_str("String"),
        }
    }
}

impl From<&Literal> for Type {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Integer(_) => Type::Integer,
            Literal::String(_) => Type::String,
        }
    }
}

/// A specification that passed [`check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedSpecification {
    pub specification: Specification,
    /// The rule named by `init`
    pub init: String,
    /// Type of every function (location)
    pub locations: BTreeMap<String, Type>,
}

/// Check a merged specification. All problems are collected, not just the
/// first one.
pub fn check(specification: &Specification) -> Result<CheckedSpecification, Vec<CheckError>> {
    let mut errors = Vec::new();
    let mut names: BTreeMap<&str, usize> = BTreeMap::new();
    let mut locations = BTreeMap::new();
    let mut rules = BTreeMap::new();
    let mut bodies = Vec::new();
    let mut init: Option<(&str, usize)> = None;

    for definition in &specification.definitions {
        let line = definition.line;
        let name = match &definition.kind {
            DefinitionKind::Import(_) => continue,
            DefinitionKind::Init(rule) => {
                if init.is_some() {
                    errors.push(CheckError::MultipleInit { line });
                } else {
                    init = Some((rule.as_str(), line));
                }
                continue;
            }
            DefinitionKind::Function { name, initial } => {
                locations.insert(name.clone(), Type::from(initial));
                name
            }
            DefinitionKind::Rule { name, body } => {
                rules.insert(name.as_str(), body.as_slice());
                bodies.push(body.as_slice());
                name
            }
        };
        if names.insert(name.as_str(), line).is_some() {
            errors.push(CheckError::Duplicate {
                name: name.clone(),
                line,
            });
        }
    }

    match init {
        None => errors.push(CheckError::MissingInit),
        Some((rule, line)) if !rules.contains_key(rule) => errors.push(CheckError::UnknownRule {
            name: rule.to_string(),
            line,
        }),
        Some(_) => {}
    }

    let checker = Checker {
        locations: &locations,
        rules: &rules,
    };
    for body in bodies {
        for statement in body {
            checker.statement(statement, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(CheckedSpecification {
            specification: specification.clone(),
            init: init.map(|(rule, _)| rule.to_string()).unwrap_or_default(),
            locations,
        })
    } else {
        Err(errors)
    }
}

struct Checker<'a> {
    locations: &'a BTreeMap<String, Type>,
    rules: &'a BTreeMap<&'a str, &'a [Statement]>,
}

impl Checker<'_> {
    fn statement(&self, statement: &Statement, errors: &mut Vec<CheckError>) {
        let line = statement.line;
        match &statement.kind {
            StatementKind::Update { location, value } => {
                let target = self.location(location, line, errors);
                let found = self.expr(value, line, errors);
                if let (Some(expected), Some(found)) = (target, found) {
                    if expected != found {
                        errors.push(CheckError::TypeMismatch {
                            expected: expected.to_string(),
                            found: found.to_string(),
                            line,
                        });
                    }
                }
            }
            StatementKind::Print(value) => {
                self.expr(value, line, errors);
            }
            StatementKind::Call(rule) => {
                if !self.rules.contains_key(rule.as_str()) {
                    errors.push(CheckError::UnknownRule {
                        name: rule.clone(),
                        line,
                    });
                }
            }
        }
    }

    fn expr(&self, expr: &Expr, line: usize, errors: &mut Vec<CheckError>) -> Option<Type> {
        match expr {
            Expr::Literal(literal) => Some(Type::from(literal)),
            Expr::Location(name) => self.location(name, line, errors),
            Expr::Binary { lhs, rhs, .. } => {
                let lhs = self.expr(lhs, line, errors);
                let rhs = self.expr(rhs, line, errors);
                for operand in [lhs, rhs].into_iter().flatten() {
                    if operand != Type::Integer {
                        errors.push(CheckError::TypeMismatch {
                            expected: Type::Integer.to_string(),
                            found: operand.to_string(),
                            line,
                        });
                    }
                }
                Some(Type::Integer)
            }
        }
    }

    fn location(&self, name: &str, line: usize, errors: &mut Vec<CheckError>) -> Option<Type> {
        let found = self.locations.get(name).copied();
        if found.is_none() {
            errors.push(CheckError::UnknownLocation {
                name: name.to_string(),
                line,
            });
        }
        found
    }
}
