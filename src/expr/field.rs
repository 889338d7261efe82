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

//! Field values of a bound filter expression
//!
//! A [`FilterField`] holds the access path to one primitive inside the
//! payload, the value materialized from the current payload, and the set
//! of predicates that depend on it. A field referenced by several
//! predicates exists once and is shared through its index in the
//! expression's field store.

use std::any::Any;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::core::{FilterValue, TypeTag, ValueKind};
use crate::introspect::{FieldRef, TypeSupport};

/// One step on the access path to a field.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    /// Index of the member to access at this nesting level
    pub member_index: usize,
    /// Element index for array / sequence members; `None` for plain members
    pub array_index: Option<usize>,
    /// Descriptor of the message type at this nesting level
    pub type_support: Arc<TypeSupport>,
}

/// Access path from the payload root to a primitive field.
pub type AccessPath = SmallVec<[FieldAccessor; 2]>;

/// A field operand of a filter expression.
#[derive(Debug)]
pub struct FilterField {
    value: FilterValue,
    has_value: bool,
    type_tag: TypeTag,
    access_path: AccessPath,
    /// Predicate arena indices to notify when the value materializes
    parents: Vec<usize>,
}

impl FilterField {
    /// Create a field of the given primitive type with its access path.
    pub fn new(type_tag: TypeTag, kind: ValueKind, access_path: AccessPath) -> Self {
        Self {
            value: FilterValue::of_kind(kind),
            has_value: false,
            type_tag,
            access_path,
            parents: Vec::new(),
        }
    }

    /// The materialized value. Only meaningful while [`has_value`] is true.
    ///
    /// [`has_value`]: FilterField::has_value
    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// The inferred value kind of this field.
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Whether a value has been materialized for the current payload.
    pub fn has_value(&self) -> bool {
        self.has_value
    }

    /// Forget the materialized value.
    pub fn reset(&mut self) {
        self.has_value = false;
    }

    /// Mark this field as the pattern operand of a LIKE / MATCH predicate.
    pub fn mark_regular_expression(&mut self, is_like_operand: bool) {
        self.value.as_regular_expression(is_like_operand);
    }

    /// Register a predicate depending on this field.
    pub fn add_parent(&mut self, predicate: usize) {
        if !self.parents.contains(&predicate) {
            self.parents.push(predicate);
        }
    }

    /// Predicates depending on this field.
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    /// Materialize this field's value from `payload`.
    ///
    /// Walks the access path one step at a time, resolving each base
    /// address through the introspection adapter and checking runtime
    /// sequence lengths against the bound index. Returns false when the
    /// index is out of range, the payload does not match the descriptor,
    /// or the terminal primitive does not match the field's type tag; the
    /// caller rejects the payload in that case.
    pub fn set_value(&mut self, payload: &dyn Any) -> bool {
        let terminal = match resolve_path(&self.access_path, payload) {
            Some(field_ref) => field_ref,
            None => return false,
        };

        if !self.store(terminal) {
            return false;
        }

        self.has_value = true;
        true
    }

    /// Store a terminal field reference into the value, checking it
    /// against the field's type tag.
    fn store(&mut self, field_ref: FieldRef<'_>) -> bool {
        match (self.type_tag, field_ref) {
            (TypeTag::Bool, FieldRef::Bool(v)) => self.value.set_bool(v),
            (TypeTag::Char, FieldRef::Char(v)) => self.value.set_char(v),
            (
                TypeTag::Int8 | TypeTag::Int16 | TypeTag::Int32 | TypeTag::Int64,
                FieldRef::Signed(v),
            ) => self.value.set_signed(v),
            (
                TypeTag::Octet
                | TypeTag::Uint8
                | TypeTag::Uint16
                | TypeTag::Uint32
                | TypeTag::Uint64,
                FieldRef::Unsigned(v),
            ) => self.value.set_unsigned(v),
            (
                TypeTag::Float32 | TypeTag::Float64 | TypeTag::LongDouble,
                FieldRef::Float(v),
            ) => self.value.set_float(v),
            (TypeTag::String, FieldRef::Str(v)) => self.value.set_str(v),
            _ => return false,
        }
        true
    }
}

/// Walk an access path down to the terminal primitive.
///
/// Runtime lengths guard every array step: fixed arrays check against
/// their static size, sequences against the payload's actual length.
fn resolve_path<'p>(path: &[FieldAccessor], payload: &'p dyn Any) -> Option<FieldRef<'p>> {
    let mut base = payload;

    for (step_index, step) in path.iter().enumerate() {
        let members = step.type_support.members().ok()?;
        let member = members.member(step.member_index)?;

        let resolved = if member.is_array() {
            let index = step.array_index?;
            let limit = if member.array_size() > 0 && !member.is_upper_bound() {
                member.array_size()
            } else {
                member.sequence_len(base)?
            };
            if index >= limit {
                return None;
            }
            member.get(base, Some(index))?
        } else {
            if step.array_index.is_some() {
                return None;
            }
            member.get(base, None)?
        };

        if step_index + 1 == path.len() {
            return Some(resolved);
        }

        base = match resolved {
            FieldRef::Message(next) => next,
            _ => return None,
        };
    }

    None
}
