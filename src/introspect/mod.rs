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

//! Message-type introspection adapter
//!
//! A [`TypeSupport`] describes the structure of a message type: members by
//! index, primitive type tags, array and sequence metadata, and accessors
//! to read member values out of an opaque payload. Two descriptor flavors
//! exist, distinguished by their identifier string:
//!
//! - [`native`]: accessor tables over concrete Rust message structs, the
//!   kind a code generator emits alongside message definitions;
//! - [`dynamic`]: descriptors built at runtime over [`DynamicMessage`]
//!   payload trees, used for dynamically typed messages and as the decode
//!   target for serialized payloads.
//!
//! Everything outside this module sees only the unified [`MembersRef`] /
//! [`MemberView`] surface; no other code switches on the flavor.

pub mod dynamic;
pub mod native;

use std::any::Any;
use std::sync::Arc;

use crate::core::{Error, Result, TypeTag};

pub use dynamic::{DynamicMember, DynamicMembers, DynamicMembersBuilder, DynamicMessage, DynamicValue};
pub use native::{NativeMember, NativeMembers};

/// Identifier of the native descriptor flavor
pub const NATIVE_TYPESUPPORT_IDENTIFIER: &str = "introspection_native";

/// Identifier of the dynamic descriptor flavor
pub const DYNAMIC_TYPESUPPORT_IDENTIFIER: &str = "introspection_dynamic";

/// A read-only description of a message type.
///
/// The flavor-specific member table is kept behind an opaque payload; the
/// identifier string selects how it is interpreted.
pub struct TypeSupport {
    identifier: &'static str,
    data: Box<dyn Any + Send + Sync>,
}

impl TypeSupport {
    /// Wrap a native member table.
    pub fn native(members: NativeMembers) -> Arc<Self> {
        Arc::new(Self {
            identifier: NATIVE_TYPESUPPORT_IDENTIFIER,
            data: Box::new(members),
        })
    }

    /// Wrap a dynamic member table.
    pub fn dynamic(members: DynamicMembers) -> Arc<Self> {
        Arc::new(Self {
            identifier: DYNAMIC_TYPESUPPORT_IDENTIFIER,
            data: Box::new(members),
        })
    }

    /// The identifier string of this descriptor's flavor.
    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// Resolve the member table behind this descriptor.
    pub fn members(&self) -> Result<MembersRef<'_>> {
        match self.identifier {
            NATIVE_TYPESUPPORT_IDENTIFIER => self
                .data
                .downcast_ref::<NativeMembers>()
                .map(MembersRef::Native)
                .ok_or(Error::Internal("type support data is invalid")),
            DYNAMIC_TYPESUPPORT_IDENTIFIER => self
                .data
                .downcast_ref::<DynamicMembers>()
                .map(MembersRef::Dynamic)
                .ok_or(Error::Internal("type support data is invalid")),
            other => Err(Error::UnsupportedTypeSupport(other)),
        }
    }
}

impl std::fmt::Debug for TypeSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSupport")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Unified view over a descriptor's member table.
#[derive(Clone, Copy)]
pub enum MembersRef<'a> {
    /// Native flavor
    Native(&'a NativeMembers),
    /// Dynamic flavor
    Dynamic(&'a DynamicMembers),
}

impl<'a> MembersRef<'a> {
    /// Number of members in the message type.
    pub fn member_count(&self) -> usize {
        match self {
            MembersRef::Native(m) => m.len(),
            MembersRef::Dynamic(m) => m.len(),
        }
    }

    /// View of the member at `index`.
    pub fn member(&self, index: usize) -> Option<MemberView<'a>> {
        match self {
            MembersRef::Native(m) => m.get(index).map(MemberView::Native),
            MembersRef::Dynamic(m) => m
                .get(index)
                .map(|member| MemberView::Dynamic { member, index }),
        }
    }

    /// Find a member by name (linear scan, case-sensitive).
    pub fn member_named(&self, name: &str) -> Option<(usize, MemberView<'a>)> {
        (0..self.member_count()).find_map(|i| {
            let view = self.member(i)?;
            (view.name() == name).then_some((i, view))
        })
    }
}

/// Unified view of one member of a message type.
pub enum MemberView<'a> {
    /// Native flavor member
    Native(&'a NativeMember),
    /// Dynamic flavor member with its index in the message
    Dynamic {
        member: &'a DynamicMember,
        index: usize,
    },
}

impl<'a> MemberView<'a> {
    /// Member name.
    pub fn name(&self) -> &'a str {
        match self {
            MemberView::Native(m) => m.name(),
            MemberView::Dynamic { member, .. } => member.name(),
        }
    }

    /// Primitive type tag of the member (element tag for arrays).
    pub fn type_tag(&self) -> TypeTag {
        match self {
            MemberView::Native(m) => m.type_tag(),
            MemberView::Dynamic { member, .. } => member.type_tag(),
        }
    }

    /// Whether the member is an array or sequence.
    pub fn is_array(&self) -> bool {
        match self {
            MemberView::Native(m) => m.is_array(),
            MemberView::Dynamic { member, .. } => member.is_array(),
        }
    }

    /// Declared size; 0 means the length is only known at runtime.
    pub fn array_size(&self) -> usize {
        match self {
            MemberView::Native(m) => m.array_size(),
            MemberView::Dynamic { member, .. } => member.array_size(),
        }
    }

    /// Whether `array_size` is an upper bound rather than a fixed size.
    pub fn is_upper_bound(&self) -> bool {
        match self {
            MemberView::Native(m) => m.is_upper_bound(),
            MemberView::Dynamic { member, .. } => member.is_upper_bound(),
        }
    }

    /// Descriptor of the nested message type, for `TypeTag::Message`
    /// members.
    pub fn nested(&self) -> Option<&Arc<TypeSupport>> {
        match self {
            MemberView::Native(m) => m.nested(),
            MemberView::Dynamic { member, .. } => member.nested(),
        }
    }

    /// Runtime length of an array or sequence member within `base`.
    pub fn sequence_len(&self, base: &dyn Any) -> Option<usize> {
        match self {
            MemberView::Native(m) => m.sequence_len(base),
            MemberView::Dynamic { member, index } => member.sequence_len(base, *index),
        }
    }

    /// Resolve the member within `base`.
    ///
    /// For array or sequence members `index` selects the element; for
    /// plain members it must be `None`. Returns `None` when the payload
    /// does not match the descriptor or the index is out of range.
    pub fn get<'p>(&self, base: &'p dyn Any, index: Option<usize>) -> Option<FieldRef<'p>> {
        match self {
            MemberView::Native(m) => m.get(base, index),
            MemberView::Dynamic { member, index: mi } => member.get(base, *mi, index),
        }
    }
}

/// A value read out of a payload by the introspection adapter.
///
/// Either a typed primitive or a reference to a nested message to descend
/// into.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    /// Nested message to descend into
    Message(&'a dyn Any),
    /// Boolean member value
    Bool(bool),
    /// Character member value
    Char(char),
    /// Signed integer member value, widened to i64
    Signed(i64),
    /// Unsigned integer member value, widened to u64
    Unsigned(u64),
    /// Floating point member value, widened to f64
    Float(f64),
    /// String member value
    Str(&'a str),
}

/// External codec used to decode serialized payloads.
///
/// The filter core never interprets payload bytes itself: the instance
/// asks the deserializer for a reusable decode buffer once, then decodes
/// every serialized payload into it.
pub trait PayloadDeserializer: Send + Sync {
    /// Allocate a reusable decode buffer for the given message type.
    fn create_buffer(&self, type_support: &TypeSupport) -> Result<Box<dyn Any + Send + Sync>>;

    /// Decode `bytes` into a buffer previously returned by
    /// [`PayloadDeserializer::create_buffer`].
    fn deserialize(&self, bytes: &[u8], buffer: &mut (dyn Any + Send + Sync)) -> Result<()>;
}
