//! Recursive-descent parser

use crate::ast::{
    BinaryOp, Definition, DefinitionKind, Expr, Literal, Specification, Statement, StatementKind,
};
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse one module.
pub fn parse(module: &str, source: &str) -> Result<Specification, SyntaxError> {
    Parser::new(module, tokenize(source)?).parse()
}

/// Default bound on expression depth, see [`Parser::with_max_depth`]
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 256;

pub struct Parser {
    module: String,
    tokens: Vec<Token>,
    pos: usize,
    trace: Option<Vec<String>>,
    max_depth: usize,
}

impl Parser {
    pub fn new(module: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            module: module.into(),
            tokens,
            pos: 0,
            trace: None,
            max_depth: DEFAULT_MAX_EXPR_DEPTH,
        }
    }

    /// Bound the depth of every expression tree: each parenthesis and each
    /// binary operator in a chain counts one level.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Record one line per reduced definition and statement.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Trace lines collected so far (empty unless `with_trace` was used).
    pub fn take_trace(&mut self) -> Vec<String> {
        self.trace.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub fn parse(&mut self) -> Result<Specification, SyntaxError> {
        if self.peek_keyword("CASM") {
            self.advance();
        }

        let mut definitions = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            let definition = self.definition()?;
            self.note(|| format!("reduce definition at line {}", definition.line));
            definitions.push(definition);
        }

        Ok(Specification {
            name: self.module.clone(),
            definitions,
        })
    }

    fn definition(&mut self) -> Result<Definition, SyntaxError> {
        let line = self.peek().at.line;
        let keyword = self.identifier("a definition")?;
        let kind = match keyword.as_str() {
            "import" => DefinitionKind::Import(self.identifier("a module name")?),
            "init" => DefinitionKind::Init(self.identifier("a rule name")?),
            "function" => {
                let name = self.identifier("a function name")?;
                self.expect(TokenKind::Equal, "'='")?;
                let initial = self.literal()?;
                DefinitionKind::Function { name, initial }
            }
            "rule" => {
                let name = self.identifier("a rule name")?;
                self.expect(TokenKind::Equal, "'='")?;
                self.expect(TokenKind::LeftCurly, "'{'")?;
                let mut body = Vec::new();
                while self.peek().kind != TokenKind::RightCurly {
                    body.push(self.statement()?);
                }
                self.advance();
                DefinitionKind::Rule { name, body }
            }
            other => {
                return Err(self.error_at(
                    line,
                    "'import', 'init', 'function' or 'rule'",
                    format!("'{other}'"),
                ))
            }
        };

        Ok(Definition {
            kind,
            line,
            module: self.module.clone(),
        })
    }

    fn statement(&mut self) -> Result<Statement, SyntaxError> {
        let line = self.peek().at.line;
        let head = self.identifier("a statement")?;
        let kind = match head.as_str() {
            "print" => StatementKind::Print(self.expr(0)?),
            "call" => StatementKind::Call(self.identifier("a rule name")?),
            _ => {
                self.expect(TokenKind::Update, "':='")?;
                StatementKind::Update {
                    location: head,
                    value: self.expr(0)?,
                }
            }
        };
        self.note(|| format!("reduce statement at line {line}"));
        Ok(Statement { kind, line })
    }

    fn expr(&mut self, depth: usize) -> Result<Expr, SyntaxError> {
        let mut level = depth;
        let mut lhs = self.term(level)?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            level = self.descend(level)?;
            self.advance();
            let rhs = self.term(level)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self, depth: usize) -> Result<Expr, SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Location(name))
            }
            TokenKind::LeftParen => {
                let level = self.descend(depth)?;
                self.advance();
                let inner = self.expr(level)?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(inner)
            }
            _ => Ok(Expr::Literal(self.literal()?)),
        }
    }

    /// One level deeper, or an error at the current token past the bound.
    /// Keeps checking, lowering and dropping the tree within the stack.
    fn descend(&self, depth: usize) -> Result<usize, SyntaxError> {
        if depth >= self.max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                self.peek().at,
            ));
        }
        Ok(depth + 1)
    }

    fn literal(&mut self) -> Result<Literal, SyntaxError> {
        let token = self.peek().clone();
        let literal = match token.kind {
            TokenKind::Integer(value) => Literal::Integer(value),
            TokenKind::String(text) => Literal::String(text),
            TokenKind::Minus => {
                self.advance();
                return match self.peek().kind {
                    TokenKind::Integer(value) => {
                        self.advance();
                        Ok(Literal::Integer(-value))
                    }
                    _ => Err(self.unexpected("an integer literal")),
                };
            }
            _ => return Err(self.unexpected("a literal")),
        };
        self.advance();
        Ok(literal)
    }

    fn identifier(&mut self, expected: &str) -> Result<String, SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), SyntaxError> {
        if self.peek().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn peek(&self) -> &Token {
        // tokenize() always ends with Eof and advance() never steps past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Identifier(name) if name == keyword)
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.to_string(),
            },
            token.at,
        )
    }

    fn error_at(&self, line: usize, expected: &str, found: String) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found,
            },
            crate::error::Coordinate { line, column: 1 },
        )
    }

    fn note(&mut self, line: impl FnOnce() -> String) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(line());
        }
    }
}
