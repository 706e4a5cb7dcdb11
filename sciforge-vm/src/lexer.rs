//! Tokenizer for the symbolic model language.
//!
//! Keeps line numbers on every token so parse diagnostics can point at the
//! offending line of the (LLM-generated) source.

use sciforge_error::{Error, Result};
use std::fmt;

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Identifier or keyword
    Ident(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,
    Semi,
    Eq,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Eq => write!(f, "="),
        }
    }
}

/// A token together with the 1-based source line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

/// Tokenize model source text.
///
/// `//` starts a comment that runs to end of line.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1usize;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    // comment to end of line
                    for c in chars.by_ref() {
                        if c == '\n' {
                            line += 1;
                            break;
                        }
                    }
                } else {
                    tokens.push(SpannedToken { token: Token::Slash, line });
                }
            }
            '{' | '}' | '(' | ')' | '+' | '-' | '*' | '^' | ',' | ';' | '=' => {
                chars.next();
                let token = match c {
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '^' => Token::Caret,
                    ',' => Token::Comma,
                    ';' => Token::Semi,
                    _ => Token::Eq,
                };
                tokens.push(SpannedToken { token, line });
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        text.push(c);
                        chars.next();
                    } else if c == 'e' || c == 'E' {
                        // exponent, possibly signed
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        match lookahead.peek() {
                            Some(&d) if d.is_ascii_digit() || d == '+' || d == '-' => {
                                text.push(c);
                                chars.next();
                                if let Some(&s) = chars.peek() {
                                    if s == '+' || s == '-' {
                                        text.push(s);
                                        chars.next();
                                    }
                                }
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                let value: f64 = text.parse().map_err(|_| {
                    Error::execution_failed(format!("invalid number literal '{}'", text))
                        .with_operation("lexer::tokenize")
                        .with_context("line", line.to_string())
                })?;
                tokens.push(SpannedToken { token: Token::Number(value), line });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(SpannedToken { token: Token::Ident(text), line });
            }
            other => {
                return Err(Error::execution_failed(format!(
                    "unexpected character '{}'",
                    other
                ))
                .with_operation("lexer::tokenize")
                .with_context("line", line.to_string()));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        let tokens = kinds("param a = 1.5;");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("param".into()),
                Token::Ident("a".into()),
                Token::Eq,
                Token::Number(1.5),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_tokenize_expression() {
        let tokens = kinds("a * sin(omega * x0) + x1 ^ 2");
        assert_eq!(tokens.len(), 13);
        assert_eq!(tokens[2], Token::Ident("sin".into()));
        assert_eq!(tokens[11], Token::Caret);
    }

    #[test]
    fn test_tokenize_exponent_literal() {
        let tokens = kinds("1e-3 2.5E+2");
        assert_eq!(tokens, vec![Token::Number(1e-3), Token::Number(2.5e2)]);
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = kinds("a // amplitude\n+ b");
        assert_eq!(
            tokens,
            vec![Token::Ident("a".into()), Token::Plus, Token::Ident("b".into())]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\nb\n\nc").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a @ b").unwrap_err();
        assert_eq!(err.kind(), sciforge_error::ErrorKind::ExecutionFailed);
    }
}
