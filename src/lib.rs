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

//! # content-filter - SQL-like content filtering for pub/sub payloads
//!
//! This crate evaluates SQL-like boolean filter expressions against
//! structured message payloads. A pub/sub transport attaches an expression
//! to a subscription once; every incoming payload is then evaluated and
//! either delivered or dropped.
//!
//! ## Key pieces
//!
//! - A lexer and recursive-descent parser for the filter sub-language
//!   (comparisons, `AND` / `OR` / `NOT`, `BETWEEN`, `LIKE` / `MATCH`,
//!   `%N` parameters, dotted field paths with array subscripts)
//! - A semantic binder that validates expressions against a message
//!   descriptor and compiles them into a shared-field expression tree
//! - A lazy evaluator with tri-state short-circuit propagation: fields
//!   deserialize one at a time and evaluation stops as soon as the result
//!   is decided
//! - An introspection adapter unifying native (generated accessor tables)
//!   and dynamic (runtime-built) message descriptors
//!
//! ## Quick start
//!
//! ```
//! use content_filter::api::{ContentFilter, Payload};
//! use content_filter::core::TypeTag;
//! use content_filter::introspect::{DynamicMembers, DynamicMessage, TypeSupport};
//!
//! // Describe a message type { int32 x, string name }.
//! let type_support = TypeSupport::dynamic(
//!     DynamicMembers::builder()
//!         .member("x", TypeTag::Int32)
//!         .member("name", TypeTag::String)
//!         .build(),
//! );
//!
//! // Attach an expression with one parameter.
//! let filter = ContentFilter::new(type_support);
//! filter.set(Some("x = %0 AND name LIKE 'robot%'"), &["4".to_string()]).unwrap();
//!
//! // Evaluate payloads.
//! let matching = DynamicMessage::new(vec![4i32.into(), "robot-7".into()]);
//! assert!(filter.evaluate(Payload::Message(&matching)));
//!
//! let other = DynamicMessage::new(vec![5i32.into(), "robot-7".into()]);
//! assert!(!filter.evaluate(Payload::Message(&other)));
//! ```
//!
//! ## Modules
//!
//! - [`api`] - filter instances and the expression factory
//! - [`core`] - value model, type tags, errors
//! - [`parser`] - the filter sub-language front end
//! - [`expr`] - bound expression trees and the evaluator
//! - [`introspect`] - message-type descriptors and payload access

pub mod api;
pub mod core;
pub mod expr;
pub mod introspect;
pub mod parser;

// Re-export main types for convenience
pub use api::{ContentFilter, FilterFactory, ObjectPool, Payload};
pub use core::{Error, FilterValue, Result, TypeTag, ValueKind};
pub use expr::FilterExpression;
pub use introspect::{
    DynamicMembers, DynamicMessage, DynamicValue, FieldRef, MemberView, MembersRef, NativeMember,
    NativeMembers, PayloadDeserializer, TypeSupport,
};
pub use parser::{ParseError, Position};
