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

//! Error types for the filter engine
//!
//! This module defines all error types used throughout the crate. Runtime
//! evaluation misses (out-of-range sequence indices, payload decode
//! failures) are not errors: the affected evaluation rejects the payload.

use thiserror::Error;

use super::types::ValueKind;
use crate::parser::ParseError;

/// Result type alias for filter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for filter operations
///
/// Covers textual parse failures, semantic bind failures, argument misuse
/// at the public boundary, and internal descriptor inconsistencies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Expression text failed to parse
    #[error("{0}")]
    Parse(#[from] ParseError),

    // =========================================================================
    // Bind errors
    // =========================================================================
    /// Field name does not exist in the message type
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// An intermediate path segment is not a nested message
    #[error("field '{0}' is not a nested message")]
    FieldNotNested(String),

    /// Array or sequence member referenced without an index
    #[error("field '{0}' should have an index (i.e. [n])")]
    MissingArrayIndex(String),

    /// Index applied to a member that is not an array or sequence
    #[error("field '{0}' is not an array or sequence")]
    UnexpectedArrayIndex(String),

    /// Index is statically out of range for a fixed-size array
    #[error("index {index} is out of range for field '{field}' of size {size}")]
    IndexOutOfRange {
        field: String,
        index: usize,
        size: usize,
    },

    /// Terminal field is not of a primitive type
    #[error("type of field '{0}' is not primitive")]
    NotPrimitive(String),

    /// Expression references a parameter that was not supplied
    #[error("parameter %{index} out of range, {supplied} parameter(s) supplied")]
    ParameterIndexOutOfRange { index: usize, supplied: usize },

    /// A supplied parameter could not be parsed as a literal
    #[error("parameter %{index} is not a valid literal: '{text}'")]
    ParameterParse { index: usize, text: String },

    /// Predicate operands have incompatible kinds
    #[error("cannot compare {left} with {right}")]
    IncompatibleOperands { left: ValueKind, right: ValueKind },

    /// LIKE / MATCH used without a string field operand
    #[error("LIKE and MATCH require a string field operand")]
    LikeRequiresStringField,

    // =========================================================================
    // Boundary errors
    // =========================================================================
    /// Invalid argument at the public boundary
    #[error("bad parameter: {0}")]
    BadParameter(&'static str),

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Descriptor data is missing or malformed
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// Type support identifier is not recognized by the adapter
    #[error("unsupported type support identifier '{0}'")]
    UnsupportedTypeSupport(&'static str),
}

impl Error {
    /// Returns true if this error originated in the parse phase.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Returns true if this error originated in the bind phase.
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self,
            Error::FieldNotFound(_)
                | Error::FieldNotNested(_)
                | Error::MissingArrayIndex(_)
                | Error::UnexpectedArrayIndex(_)
                | Error::IndexOutOfRange { .. }
                | Error::NotPrimitive(_)
                | Error::ParameterIndexOutOfRange { .. }
                | Error::ParameterParse { .. }
                | Error::IncompatibleOperands { .. }
                | Error::LikeRequiresStringField
        )
    }
}
