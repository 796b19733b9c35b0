//! Front-end error types

use std::fmt;
use thiserror::Error;

/// Source coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub line: usize,
    pub column: usize,
}

impl Default for Coordinate {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexing or parsing failure
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{at}: {kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub at: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("integer literal '{0}' out of range")]
    IntegerOutOfRange(String),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("expression nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, at: Coordinate) -> Self {
        Self { kind, at }
    }
}

/// Semantic failure reported by the checker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("line {line}: '{name}' is already defined")]
    Duplicate { name: String, line: usize },
    #[error("no init rule given")]
    MissingInit,
    #[error("line {line}: more than one init rule given")]
    MultipleInit { line: usize },
    #[error("line {line}: unknown rule '{name}'")]
    UnknownRule { name: String, line: usize },
    #[error("line {line}: unknown location '{name}'")]
    UnknownLocation { name: String, line: usize },
    #[error("line {line}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        line: usize,
    },
}

/// Failure while executing a program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("integer overflow in rule '{rule}'")]
    Overflow { rule: String },
    #[error("call depth exceeds {limit} in rule '{rule}'")]
    CallDepth { rule: String, limit: usize },
    #[error("unknown rule '{0}'")]
    UnknownRule(String),
    #[error("unknown location '{0}'")]
    UnknownLocation(String),
    #[error("operand stack underflow in rule '{0}'")]
    StackUnderflow(String),
    #[error("type error in rule '{rule}': {message}")]
    Type { rule: String, message: String },
}
