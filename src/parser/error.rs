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

//! Parser error types
//!
//! This module provides the error type for filter expression parsing.

use super::token::Position;
use std::fmt;

/// A parse error with position and source context
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Position in source
    pub position: Position,
    /// Expression text where the error occurred
    pub context: String,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            context: String::new(),
        }
    }

    /// Create a parse error with the offending expression text attached
    pub fn with_context(
        message: impl Into<String>,
        position: Position,
        context: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            position,
            context: context.into(),
        }
    }

    /// Format the error with the offending line and a column pointer
    pub fn format_error(&self) -> String {
        if self.context.is_empty() {
            return self.to_string();
        }

        let lines: Vec<&str> = self.context.lines().collect();
        if self.position.line == 0 || self.position.line > lines.len() {
            return self.to_string();
        }

        let line = lines[self.position.line - 1];
        let pointer = " ".repeat(self.position.column.saturating_sub(1)) + "^";

        format!("{}\n{}\n{}", self, line, pointer)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}
