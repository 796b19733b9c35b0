//! Lexer

use crate::error::{Coordinate, SyntaxError, SyntaxErrorKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    Integer(i64),
    String(String),
    /// `:=`
    Update,
    /// `=`
    Equal,
    LeftCurly,
    RightCurly,
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "'{name}'"),
            TokenKind::Integer(value) => write!(f, "'{value}'"),
            TokenKind::String(text) => write!(f, "\"{text}\""),
            TokenKind::Update => f.write_str("':='"),
            TokenKind::Equal => f.write_str("'='"),
            TokenKind::LeftCurly => f.write_str("'{'"),
            TokenKind::RightCurly => f.write_str("'}'"),
            TokenKind::LeftParen => f.write_str("'('"),
            TokenKind::RightParen => f.write_str("')'"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub at: Coordinate,
}

/// Split `source` into tokens. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut at = Coordinate::default();

    while let Some(&c) = chars.peek() {
        let start = at;
        match c {
            '\n' => {
                chars.next();
                at.line += 1;
                at.column = 1;
                continue;
            }
            c if c.is_whitespace() => {
                chars.next();
                at.column += 1;
                continue;
            }
            '/' => {
                chars.next();
                if chars.peek() != Some(&'/') {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedCharacter('/'),
                        start,
                    ));
                }
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
                continue;
            }
            '"' => {
                chars.next();
                at.column += 1;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            at.column += 1;
                            break;
                        }
                        Some('\n') | None => {
                            return Err(SyntaxError::new(
                                SyntaxErrorKind::UnterminatedString,
                                start,
                            ));
                        }
                        Some(c) => {
                            at.column += 1;
                            text.push(c);
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::String(text),
                    at: start,
                });
                continue;
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    digits.push(c);
                    chars.next();
                    at.column += 1;
                }
                let value = digits.parse::<i64>().map_err(|_| {
                    SyntaxError::new(SyntaxErrorKind::IntegerOutOfRange(digits.clone()), start)
                })?;
                tokens.push(Token {
                    kind: TokenKind::Integer(value),
                    at: start,
                });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    name.push(c);
                    chars.next();
                    at.column += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Identifier(name),
                    at: start,
                });
                continue;
            }
            _ => {}
        }

        chars.next();
        at.column += 1;
        let kind = match c {
            ':' if chars.peek() == Some(&'=') => {
                chars.next();
                at.column += 1;
                TokenKind::Update
            }
            '=' => TokenKind::Equal,
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            other => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnexpectedCharacter(other),
                    start,
                ))
            }
        };
        tokens.push(Token { kind, at: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        at,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_rule() {
        assert_eq!(
            kinds("rule main = { x := x + 1 }"),
            vec![
                TokenKind::Identifier("rule".into()),
                TokenKind::Identifier("main".into()),
                TokenKind::Equal,
                TokenKind::LeftCurly,
                TokenKind::Identifier("x".into()),
                TokenKind::Update,
                TokenKind::Identifier("x".into()),
                TokenKind::Plus,
                TokenKind::Integer(1),
                TokenKind::RightCurly,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = tokenize("// header\ninit main\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier("init".into()));
        assert_eq!(tokens[0].at, Coordinate { line: 2, column: 1 });
        assert_eq!(tokens[1].at, Coordinate { line: 2, column: 6 });
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            kinds("print \"hello world\""),
            vec![
                TokenKind::Identifier("print".into()),
                TokenKind::String("hello world".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_errors() {
        let err = tokenize("x := \"open").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnterminatedString);
        assert_eq!(err.at, Coordinate { line: 1, column: 6 });

        let err = tokenize("x ; y").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedCharacter(';'));

        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err.kind, SyntaxErrorKind::IntegerOutOfRange(_)));
    }
}
