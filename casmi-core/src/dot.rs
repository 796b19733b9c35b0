//! Graphviz rendering of a parsed specification

use crate::ast::{DefinitionKind, Expr, Literal, Specification, StatementKind};
use std::fmt::Write;

/// Render `specification` as a `digraph`. Node ids are assigned in
/// depth-first order, so the output is stable for a given input.
pub fn to_dot(specification: &Specification) -> String {
    let mut dot = DotWriter::default();
    dot.out.push_str("digraph \"");
    dot.out.push_str(&escape(&specification.name));
    dot.out.push_str("\" {\n");

    let root = dot.node(&format!("Specification {}", specification.name));
    for definition in &specification.definitions {
        let node = match &definition.kind {
            DefinitionKind::Import(name) => dot.node(&format!("import {name}")),
            DefinitionKind::Init(rule) => dot.node(&format!("init {rule}")),
            DefinitionKind::Function { name, initial } => {
                let node = dot.node(&format!("function {name}"));
                let value = dot.node(&literal(initial));
                dot.edge(node, value);
                node
            }
            DefinitionKind::Rule { name, body } => {
                let node = dot.node(&format!("rule {name}"));
                for statement in body {
                    let child = match &statement.kind {
                        StatementKind::Update { location, value } => {
                            let update = dot.node(":=");
                            let target = dot.node(location);
                            dot.edge(update, target);
                            let value = dot.expr(value);
                            dot.edge(update, value);
                            update
                        }
                        StatementKind::Print(value) => {
                            let print = dot.node("print");
                            let value = dot.expr(value);
                            dot.edge(print, value);
                            print
                        }
                        StatementKind::Call(rule) => dot.node(&format!("call {rule}")),
                    };
                    dot.edge(node, child);
                }
                node
            }
        };
        dot.edge(root, node);
    }

    dot.out.push_str("}\n");
    dot.out
}

#[derive(Default)]
struct DotWriter {
    out: String,
    next: usize,
}

impl DotWriter {
    fn node(&mut self, label: &str) -> usize {
        let id = self.next;
        self.next += 1;
        let _ = writeln!(self.out, "  n{id} [label=\"{}\"];", escape(label));
        id
    }

    fn edge(&mut self, from: usize, to: usize) {
        let _ = writeln!(self.out, "  n{from} -> n{to};");
    }

    fn expr(&mut self, expr: &Expr) -> usize {
        match expr {
            Expr::Literal(value) => self.node(&literal(value)),
            Expr::Location(name) => self.node(name),
            Expr::Binary { op, lhs, rhs } => {
                let node = self.node(op.symbol());
                let lhs = self.expr(lhs);
                self.edge(node, lhs);
                let rhs = self.expr(rhs);
                self.edge(node, rhs);
                node
            }
        }
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::Integer(value) => value.to_string(),
        Literal::String(text) => format!("\"{text}\""),
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_to_dot() {
        let spec = parse("demo", "init main\nrule main = { x := 1 + 2 }").unwrap();
        let dot = to_dot(&spec);
        assert!(dot.starts_with("digraph \"demo\" {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("n0 [label=\"Specification demo\"];"));
        assert!(dot.contains("n1 [label=\"init main\"];"));
        assert!(dot.contains("n2 [label=\"rule main\"];"));
        assert!(dot.contains("n3 [label=\":=\"];"));
        assert!(dot.contains("n5 [label=\"+\"];"));
        assert!(dot.contains("n3 -> n5;"));
        assert!(dot.contains("n0 -> n2;"));
    }

    #[test]
    fn test_string_labels_are_escaped() {
        let spec = parse("demo", "function greeting = \"hi\"").unwrap();
        let dot = to_dot(&spec);
        assert!(dot.contains("[label=\"\\\"hi\\\"\"]"));
    }
}
