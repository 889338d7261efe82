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

//! Parser for the filter sub-language
//!
//! This module provides the complete front end for filter expressions:
//!
//! - [`Lexer`] - tokenizer for expression strings
//! - [`Parser`] - recursive-descent parser building the normalized tree
//! - [`ast`] - parse tree types with attached literal values
//! - [`token`] - token types
//! - [`error`] - parse error type with position context
//!
//! # Example
//!
//! ```
//! use content_filter::parser::parse_expression;
//!
//! let tree = parse_expression("speed > %0 AND name LIKE 'robot%'").unwrap();
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod token;

// Re-export main types
pub use ast::{ComparisonOp, ConditionNode, FieldPath, FieldPathSegment, Operand};
pub use error::ParseError;
pub use lexer::Lexer;
pub use parser::{parse_expression, parse_literal, Parser};
pub use token::{is_keyword, is_operator, is_punctuator, Position, Token, TokenType, KEYWORDS, OPERATORS, PUNCTUATORS};
