//! casmi Core
//!
//! Reference front-end for a small abstract-state-machine language. The
//! pipeline is:
//!
//!   source .casm
//!     -> lexer    (tokens)
//!     -> parser   (`ast::Specification`)
//!     -> check    (`check::CheckedSpecification`)
//!     -> ir       (`ir::Program`)
//!     -> interp   (runs the init rule)
//!
//! `dot` renders a parsed specification as a Graphviz graph. The driver
//! wraps each step in a pass; nothing here knows about passes.

pub mod ast;
pub mod check;
pub mod dot;
pub mod error;
pub mod interp;
pub mod ir;
pub mod lexer;
pub mod parser;

pub use ast::Specification;
pub use check::{check, CheckedSpecification, Type};
pub use error::{CheckError, RuntimeError, SyntaxError};
pub use interp::{Machine, Value};
pub use ir::Program;
pub use parser::parse;
