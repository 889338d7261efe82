// Copyright 2025 Content Filter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Token types for the filter expression lexer
//!
//! This module defines the token types used by the lexer and parser of the
//! filter sub-language.

use std::fmt;

/// Position represents a position in the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset, starting at 0
    pub offset: usize,
    /// Line number, starting at 1
    pub line: usize,
    /// Column number, starting at 1
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// TokenType represents the type of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Error token
    Error,
    /// End of input
    Eof,
    /// Identifier (field name segment)
    Identifier,
    /// Keyword (AND, OR, NOT, LIKE, ...)
    Keyword,
    /// Quoted literal ('hello'); a single-character content is a CHAR
    String,
    /// Integer number (123, 0x7B, -5)
    Integer,
    /// Floating point number (123.45, 1.5e-3)
    Float,
    /// Operator (=, <>, <, <=, >, >=)
    Operator,
    /// Punctuator (parentheses, comma, dot, brackets)
    Punctuator,
    /// Parameter reference (%0, %1, ...)
    Parameter,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Error => write!(f, "ERROR"),
            TokenType::Eof => write!(f, "EOF"),
            TokenType::Identifier => write!(f, "IDENTIFIER"),
            TokenType::Keyword => write!(f, "KEYWORD"),
            TokenType::String => write!(f, "STRING"),
            TokenType::Integer => write!(f, "INTEGER"),
            TokenType::Float => write!(f, "FLOAT"),
            TokenType::Operator => write!(f, "OPERATOR"),
            TokenType::Punctuator => write!(f, "PUNCTUATOR"),
            TokenType::Parameter => write!(f, "PARAMETER"),
        }
    }
}

/// Token represents a lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of the token
    pub token_type: TokenType,
    /// The literal string value; string tokens hold the unescaped content
    /// without the surrounding quotes
    pub literal: String,
    /// The position in the source
    pub position: Position,
    /// Error message (if token_type is Error)
    pub error: Option<String>,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, literal: impl Into<String>, position: Position) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position,
            error: None,
        }
    }

    /// Create an error token
    pub fn error(
        message: impl Into<String>,
        literal: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            token_type: TokenType::Error,
            literal: literal.into(),
            position,
            error: Some(message.into()),
        }
    }

    /// Create an EOF token
    pub fn eof(position: Position) -> Self {
        Self {
            token_type: TokenType::Eof,
            literal: String::new(),
            position,
            error: None,
        }
    }

    /// True when this token marks the end of input
    pub fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }

    /// True when the lexer flagged this token as invalid
    pub fn is_error(&self) -> bool {
        matches!(self.token_type, TokenType::Error)
    }

    /// True when this token is the keyword `keyword`, compared without case
    pub fn is_keyword(&self, keyword: &str) -> bool {
        match self.token_type {
            TokenType::Keyword => self.literal.eq_ignore_ascii_case(keyword),
            _ => false,
        }
    }

    /// True when this token is the operator `op`
    pub fn is_operator(&self, op: &str) -> bool {
        match self.token_type {
            TokenType::Operator => self.literal == op,
            _ => false,
        }
    }

    /// True when this token is the punctuator `punct`
    pub fn is_punctuator(&self, punct: &str) -> bool {
        match self.token_type {
            TokenType::Punctuator => self.literal == punct,
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token_type == TokenType::Error {
            write!(
                f,
                "{}: {} at {}",
                self.token_type,
                self.error.as_deref().unwrap_or("unknown error"),
                self.position
            )
        } else if self.token_type == TokenType::Eof {
            write!(f, "{} at {}", self.token_type, self.position)
        } else {
            write!(
                f,
                "{}: '{}' at {}",
                self.token_type, self.literal, self.position
            )
        }
    }
}

/// Keywords of the filter sub-language (case-insensitive)
pub static KEYWORDS: &[&str] = &[
    "AND", "OR", "NOT", "LIKE", "MATCH", "BETWEEN", "IS", "NULL", "TRUE", "FALSE",
];

/// Reports whether `s` is one of the sub-language's keywords, ignoring
/// case.
#[inline]
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.iter().any(|kw| s.eq_ignore_ascii_case(kw))
}

/// Comparison operators of the sub-language
pub static OPERATORS: &[&str] = &["=", "<>", "<", "<=", ">", ">="];

/// Reports whether `s` is one of the comparison operators.
#[inline]
pub fn is_operator(s: &str) -> bool {
    OPERATORS.contains(&s)
}

/// Punctuators of the sub-language
pub static PUNCTUATORS: &[char] = &['(', ')', ',', '.', '[', ']'];

/// Reports whether `c` is a punctuator.
pub fn is_punctuator(c: char) -> bool {
    PUNCTUATORS.contains(&c)
}

/// Characters an operator can start with
pub fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>')
}
