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

//! Dynamic descriptor flavor
//!
//! Descriptors built at runtime over [`DynamicMessage`] payload trees.
//! This flavor serves dynamically typed messages and is the natural decode
//! target for serialized payloads.

use std::any::Any;
use std::sync::Arc;

use super::{FieldRef, TypeSupport};
use crate::core::TypeTag;

/// A dynamically typed payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// Boolean value
    Bool(bool),
    /// Character value
    Char(char),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 8-bit unsigned integer
    Uint8(u8),
    /// 16-bit unsigned integer
    Uint16(u16),
    /// 32-bit unsigned integer
    Uint32(u32),
    /// 64-bit unsigned integer
    Uint64(u64),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
    /// String value
    Str(String),
    /// Nested message
    Message(DynamicMessage),
    /// Fixed array or variable sequence of elements
    Array(Vec<DynamicValue>),
}

impl DynamicValue {
    /// View this value as a [`FieldRef`], widening integers and floats.
    ///
    /// Arrays have no direct field reference; elements are resolved
    /// through [`DynamicMember::get`].
    fn as_field_ref(&self) -> Option<FieldRef<'_>> {
        match self {
            DynamicValue::Bool(v) => Some(FieldRef::Bool(*v)),
            DynamicValue::Char(v) => Some(FieldRef::Char(*v)),
            DynamicValue::Int8(v) => Some(FieldRef::Signed(*v as i64)),
            DynamicValue::Int16(v) => Some(FieldRef::Signed(*v as i64)),
            DynamicValue::Int32(v) => Some(FieldRef::Signed(*v as i64)),
            DynamicValue::Int64(v) => Some(FieldRef::Signed(*v)),
            DynamicValue::Uint8(v) => Some(FieldRef::Unsigned(*v as u64)),
            DynamicValue::Uint16(v) => Some(FieldRef::Unsigned(*v as u64)),
            DynamicValue::Uint32(v) => Some(FieldRef::Unsigned(*v as u64)),
            DynamicValue::Uint64(v) => Some(FieldRef::Unsigned(*v)),
            DynamicValue::Float32(v) => Some(FieldRef::Float(*v as f64)),
            DynamicValue::Float64(v) => Some(FieldRef::Float(*v)),
            DynamicValue::Str(v) => Some(FieldRef::Str(v)),
            DynamicValue::Message(m) => Some(FieldRef::Message(m as &dyn Any)),
            DynamicValue::Array(_) => None,
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<char> for DynamicValue {
    fn from(v: char) -> Self {
        DynamicValue::Char(v)
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        DynamicValue::Int32(v)
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        DynamicValue::Int64(v)
    }
}

impl From<u8> for DynamicValue {
    fn from(v: u8) -> Self {
        DynamicValue::Uint8(v)
    }
}

impl From<u32> for DynamicValue {
    fn from(v: u32) -> Self {
        DynamicValue::Uint32(v)
    }
}

impl From<u64> for DynamicValue {
    fn from(v: u64) -> Self {
        DynamicValue::Uint64(v)
    }
}

impl From<f32> for DynamicValue {
    fn from(v: f32) -> Self {
        DynamicValue::Float32(v)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::Float64(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::Str(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::Str(v)
    }
}

impl From<DynamicMessage> for DynamicValue {
    fn from(v: DynamicMessage) -> Self {
        DynamicValue::Message(v)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        DynamicValue::Array(v)
    }
}

/// A dynamically typed message payload: one value per member, in member
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicMessage {
    values: Vec<DynamicValue>,
}

impl DynamicMessage {
    /// Create a message from member values in descriptor order.
    pub fn new(values: Vec<DynamicValue>) -> Self {
        Self { values }
    }

    /// Value of the member at `index`.
    pub fn value(&self, index: usize) -> Option<&DynamicValue> {
        self.values.get(index)
    }

    /// Replace all member values, reusing the allocation.
    pub fn set_values(&mut self, values: Vec<DynamicValue>) {
        self.values = values;
    }

    /// Number of member values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the message holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One member of a dynamic descriptor.
#[derive(Debug, Clone)]
pub struct DynamicMember {
    name: String,
    type_tag: TypeTag,
    is_array: bool,
    array_size: usize,
    is_upper_bound: bool,
    nested: Option<Arc<TypeSupport>>,
}

impl DynamicMember {
    /// Create a plain member of the given primitive type.
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            is_array: false,
            array_size: 0,
            is_upper_bound: false,
            nested: None,
        }
    }

    /// Turn this member into a fixed-size array.
    pub fn with_array(mut self, size: usize) -> Self {
        self.is_array = true;
        self.array_size = size;
        self.is_upper_bound = false;
        self
    }

    /// Turn this member into a sequence with an upper bound.
    pub fn with_bounded_sequence(mut self, bound: usize) -> Self {
        self.is_array = true;
        self.array_size = bound;
        self.is_upper_bound = true;
        self
    }

    /// Turn this member into an unbounded sequence.
    pub fn with_sequence(mut self) -> Self {
        self.is_array = true;
        self.array_size = 0;
        self.is_upper_bound = false;
        self
    }

    /// Attach the descriptor of a nested message type.
    ///
    /// The member's type tag becomes [`TypeTag::Message`].
    pub fn with_nested(mut self, nested: Arc<TypeSupport>) -> Self {
        self.type_tag = TypeTag::Message;
        self.nested = Some(nested);
        self
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primitive type tag (element tag for arrays).
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Whether the member is an array or sequence.
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Declared size; 0 means runtime-sized.
    pub fn array_size(&self) -> usize {
        self.array_size
    }

    /// Whether `array_size` is an upper bound.
    pub fn is_upper_bound(&self) -> bool {
        self.is_upper_bound
    }

    /// Nested message descriptor, if any.
    pub fn nested(&self) -> Option<&Arc<TypeSupport>> {
        self.nested.as_ref()
    }

    /// Runtime length of this member within `base`.
    pub fn sequence_len(&self, base: &dyn Any, member_index: usize) -> Option<usize> {
        let message = base.downcast_ref::<DynamicMessage>()?;
        match message.value(member_index)? {
            DynamicValue::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Resolve this member (or one of its elements) within `base`.
    pub fn get<'p>(
        &self,
        base: &'p dyn Any,
        member_index: usize,
        element_index: Option<usize>,
    ) -> Option<FieldRef<'p>> {
        let message = base.downcast_ref::<DynamicMessage>()?;
        let value = message.value(member_index)?;

        if self.is_array {
            let index = element_index?;
            match value {
                DynamicValue::Array(items) => items.get(index)?.as_field_ref(),
                _ => None,
            }
        } else {
            if element_index.is_some() {
                return None;
            }
            value.as_field_ref()
        }
    }
}

/// The member table of a dynamic descriptor.
#[derive(Debug, Clone, Default)]
pub struct DynamicMembers {
    members: Vec<DynamicMember>,
}

impl DynamicMembers {
    /// Start building a member table.
    pub fn builder() -> DynamicMembersBuilder {
        DynamicMembersBuilder {
            members: Vec::new(),
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true when the table has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member at `index`.
    pub fn get(&self, index: usize) -> Option<&DynamicMember> {
        self.members.get(index)
    }
}

/// Builder for [`DynamicMembers`].
pub struct DynamicMembersBuilder {
    members: Vec<DynamicMember>,
}

impl DynamicMembersBuilder {
    /// Add a plain primitive member.
    pub fn member(mut self, name: impl Into<String>, type_tag: TypeTag) -> Self {
        self.members.push(DynamicMember::new(name, type_tag));
        self
    }

    /// Add a fixed-size array member.
    pub fn array(mut self, name: impl Into<String>, type_tag: TypeTag, size: usize) -> Self {
        self.members
            .push(DynamicMember::new(name, type_tag).with_array(size));
        self
    }

    /// Add a sequence member with an upper bound.
    pub fn bounded_sequence(
        mut self,
        name: impl Into<String>,
        type_tag: TypeTag,
        bound: usize,
    ) -> Self {
        self.members
            .push(DynamicMember::new(name, type_tag).with_bounded_sequence(bound));
        self
    }

    /// Add an unbounded sequence member.
    pub fn sequence(mut self, name: impl Into<String>, type_tag: TypeTag) -> Self {
        self.members
            .push(DynamicMember::new(name, type_tag).with_sequence());
        self
    }

    /// Add a nested message member.
    pub fn nested(mut self, name: impl Into<String>, nested: Arc<TypeSupport>) -> Self {
        self.members
            .push(DynamicMember::new(name, TypeTag::Message).with_nested(nested));
        self
    }

    /// Add a fully configured member.
    pub fn add(mut self, member: DynamicMember) -> Self {
        self.members.push(member);
        self
    }

    /// Finish the member table.
    pub fn build(self) -> DynamicMembers {
        DynamicMembers {
            members: self.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_members() -> DynamicMembers {
        DynamicMembers::builder()
            .member("x", TypeTag::Int32)
            .member("name", TypeTag::String)
            .array("fixed", TypeTag::Float64, 2)
            .bounded_sequence("seq", TypeTag::Uint8, 4)
            .build()
    }

    fn sample_message() -> DynamicMessage {
        DynamicMessage::new(vec![
            4i32.into(),
            "abc".into(),
            DynamicValue::Array(vec![1.0f64.into(), 2.0f64.into()]),
            DynamicValue::Array(vec![7u8.into()]),
        ])
    }

    #[test]
    fn test_plain_member_access() {
        let members = sample_members();
        let message = sample_message();
        let base: &dyn Any = &message;

        let member = members.get(0).unwrap();
        match member.get(base, 0, None) {
            Some(FieldRef::Signed(4)) => {}
            other => panic!("unexpected field ref: {:?}", other),
        }

        let member = members.get(1).unwrap();
        match member.get(base, 1, None) {
            Some(FieldRef::Str("abc")) => {}
            other => panic!("unexpected field ref: {:?}", other),
        }
    }

    #[test]
    fn test_array_element_access() {
        let members = sample_members();
        let message = sample_message();
        let base: &dyn Any = &message;

        let member = members.get(2).unwrap();
        match member.get(base, 2, Some(1)) {
            Some(FieldRef::Float(v)) => assert_eq!(v, 2.0),
            other => panic!("unexpected field ref: {:?}", other),
        }
        // Out of range
        assert!(member.get(base, 2, Some(2)).is_none());
        // Array members require an element index
        assert!(member.get(base, 2, None).is_none());
    }

    #[test]
    fn test_sequence_len() {
        let members = sample_members();
        let message = sample_message();
        let base: &dyn Any = &message;

        let member = members.get(3).unwrap();
        assert_eq!(member.sequence_len(base, 3), Some(1));
        assert!(member.get(base, 3, Some(0)).is_some());
        assert!(member.get(base, 3, Some(1)).is_none());
    }

    #[test]
    fn test_nested_message_access() {
        let inner = TypeSupport::dynamic(
            DynamicMembers::builder()
                .member("value", TypeTag::Int64)
                .build(),
        );
        let members = DynamicMembers::builder().nested("data", inner).build();

        let message = DynamicMessage::new(vec![DynamicMessage::new(vec![42i64.into()]).into()]);
        let base: &dyn Any = &message;

        let member = members.get(0).unwrap();
        assert_eq!(member.type_tag(), TypeTag::Message);
        let nested_ref = member.get(base, 0, None).unwrap();
        match nested_ref {
            FieldRef::Message(inner_base) => {
                let inner_members = member.nested().unwrap().members().unwrap();
                let (_, view) = inner_members.member_named("value").unwrap();
                match view.get(inner_base, None) {
                    Some(FieldRef::Signed(42)) => {}
                    other => panic!("unexpected field ref: {:?}", other),
                }
            }
            other => panic!("expected nested message, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_payload() {
        let members = sample_members();
        // Payload shorter than the descriptor
        let message = DynamicMessage::new(vec![4i32.into()]);
        let base: &dyn Any = &message;
        assert!(members.get(1).unwrap().get(base, 1, None).is_none());

        // Payload that is not a DynamicMessage at all
        let not_a_message = 42i32;
        let base: &dyn Any = &not_a_message;
        assert!(members.get(0).unwrap().get(base, 0, None).is_none());
    }
}
