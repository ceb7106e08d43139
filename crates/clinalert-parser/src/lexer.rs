//! Condition language tokenizer
//!
//! Turns rule text such as
//! `([wbc] <> "" and ([wbc] < 3.5 or [wbc] > 12))` into a flat token list.
//!
//! Tokenizing never fails: an unrecognized character is reported as a
//! [`ParseError::Lexical`] diagnostic, skipped, and lexing continues.

use crate::error::ParseError;
use std::fmt;

/// Token kinds of the condition language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `[name]`, brackets stripped
    Var(String),
    /// Integer or decimal literal, kept as written
    Number(String),
    /// Double-quoted literal, quotes stripped
    Str(String),
    And,
    Or,
    /// `=`
    Eq,
    /// `<>` or `!=`
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    LParen,
    RParen,
    Abs,
    Minus,
}

impl TokenKind {
    /// Comparison operator spelling, if this token is one
    pub fn comparison_symbol(&self) -> Option<&'static str> {
        match self {
            TokenKind::Eq => Some("="),
            TokenKind::NotEq => Some("<>"),
            TokenKind::Gt => Some(">"),
            TokenKind::Lt => Some("<"),
            TokenKind::Gte => Some(">="),
            TokenKind::Lte => Some("<="),
            _ => None,
        }
    }

    /// Logical connectives and parentheses carry no test of their own
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TokenKind::And | TokenKind::Or | TokenKind::LParen | TokenKind::RParen
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Var(name) => write!(f, "[{}]", name),
            TokenKind::Number(n) => f.write_str(n),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::NotEq => f.write_str("<>"),
            TokenKind::Gt => f.write_str(">"),
            TokenKind::Lt => f.write_str("<"),
            TokenKind::Gte => f.write_str(">="),
            TokenKind::Lte => f.write_str("<="),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Abs => f.write_str("abs"),
            TokenKind::Minus => f.write_str("-"),
        }
    }
}

/// A token with its byte span in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Tokenizer output
#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    /// Lexical errors, one per skipped character
    pub errors: Vec<ParseError>,
}

/// Tokenizer for rule text
///
/// Stateless; every call works on its own input.
pub struct Lexer;

impl Lexer {
    /// Tokenize a rule string
    pub fn tokenize(input: &str) -> Lexed {
        let chars: Vec<(usize, char)> = input.char_indices().collect();
        let end_of = |i: usize| chars.get(i).map(|(pos, _)| *pos).unwrap_or(input.len());

        let mut lexed = Lexed::default();
        let mut i = 0;

        while i < chars.len() {
            let (start, c) = chars[i];

            if c.is_whitespace() {
                i += 1;
                continue;
            }

            let matched: Option<(TokenKind, usize)> = match c {
                '(' => Some((TokenKind::LParen, 1)),
                ')' => Some((TokenKind::RParen, 1)),
                '-' => Some((TokenKind::Minus, 1)),
                '=' => Some((TokenKind::Eq, 1)),
                '<' => match Self::peek(&chars, i + 1) {
                    Some('>') => Some((TokenKind::NotEq, 2)),
                    Some('=') => Some((TokenKind::Lte, 2)),
                    _ => Some((TokenKind::Lt, 1)),
                },
                '>' => match Self::peek(&chars, i + 1) {
                    Some('=') => Some((TokenKind::Gte, 2)),
                    _ => Some((TokenKind::Gt, 1)),
                },
                '!' => match Self::peek(&chars, i + 1) {
                    Some('=') => Some((TokenKind::NotEq, 2)),
                    _ => None,
                },
                '[' => Self::lex_var(&chars, i),
                '"' => Self::lex_string(&chars, i),
                c if c.is_ascii_digit() => Some(Self::lex_number(&chars, i)),
                c if c.is_alphabetic() => Self::lex_keyword(&chars, i),
                _ => None,
            };

            match matched {
                Some((kind, len)) => {
                    lexed.tokens.push(Token {
                        kind,
                        start,
                        end: end_of(i + len),
                    });
                    i += len;
                }
                None => {
                    log::warn!("Illegal character '{}' at position {}", c, start);
                    lexed.errors.push(ParseError::Lexical {
                        position: start,
                        character: c,
                    });
                    i += 1;
                }
            }
        }

        lexed
    }

    fn peek(chars: &[(usize, char)], i: usize) -> Option<char> {
        chars.get(i).map(|(_, c)| *c)
    }

    /// `[identifier]`; anything else leaves the bracket unrecognized
    fn lex_var(chars: &[(usize, char)], i: usize) -> Option<(TokenKind, usize)> {
        let mut name = String::new();
        let mut j = i + 1;
        while let Some(c) = Self::peek(chars, j) {
            match c {
                ']' if !name.is_empty() => return Some((TokenKind::Var(name), j - i + 1)),
                c if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                _ => return None,
            }
            j += 1;
        }
        None
    }

    /// `"..."`; an unterminated quote is unrecognized
    fn lex_string(chars: &[(usize, char)], i: usize) -> Option<(TokenKind, usize)> {
        let mut value = String::new();
        let mut j = i + 1;
        while let Some(c) = Self::peek(chars, j) {
            if c == '"' {
                return Some((TokenKind::Str(value), j - i + 1));
            }
            value.push(c);
            j += 1;
        }
        None
    }

    /// `\d+(\.\d+)?`
    fn lex_number(chars: &[(usize, char)], i: usize) -> (TokenKind, usize) {
        let mut text = String::new();
        let mut j = i;
        while let Some(c) = Self::peek(chars, j).filter(char::is_ascii_digit) {
            text.push(c);
            j += 1;
        }

        let has_fraction = Self::peek(chars, j) == Some('.')
            && Self::peek(chars, j + 1).is_some_and(|c| c.is_ascii_digit());
        if has_fraction {
            text.push('.');
            j += 1;
            while let Some(c) = Self::peek(chars, j).filter(char::is_ascii_digit) {
                text.push(c);
                j += 1;
            }
        }

        (TokenKind::Number(text), j - i)
    }

    /// `and`, `or`, `abs` (case-insensitive); other words are unrecognized
    fn lex_keyword(chars: &[(usize, char)], i: usize) -> Option<(TokenKind, usize)> {
        let mut word = String::new();
        let mut j = i;
        while let Some(c) = Self::peek(chars, j).filter(|c| c.is_alphanumeric() || *c == '_') {
            word.push(c);
            j += 1;
        }

        let kind = match word.to_ascii_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "abs" => TokenKind::Abs,
            _ => return None,
        };
        Some((kind, j - i))
    }
}
