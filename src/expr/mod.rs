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

//! Bound expression trees and their evaluator
//!
//! This module holds everything between the parser and the public filter
//! surface:
//!
//! - [`ConditionArena`] - tri-state condition nodes with upward
//!   propagation and short-circuiting
//! - [`FilterField`] - lazily materialized field values
//! - [`FilterExpression`] - the compiled expression: arena plus constant,
//!   parameter, and field stores
//! - [`bind_expression`] - the semantic binder producing it

pub mod binder;
pub mod condition;
pub mod expression;
pub mod field;

pub use binder::bind_expression;
pub use condition::{CompoundOp, ConditionArena, ConditionKind, ConditionState, OperandRef};
pub use expression::FilterExpression;
pub use field::{AccessPath, FieldAccessor, FilterField};
