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

//! Native descriptor flavor
//!
//! Accessor tables over concrete Rust message structs, the kind a message
//! code generator emits next to the type definitions. Payloads are reached
//! through `&dyn Any` downcasts inside the per-member accessor closures;
//! the filter core never learns the concrete message type.

use std::any::Any;
use std::sync::Arc;

use super::{FieldRef, TypeSupport};
use crate::core::TypeTag;

/// Accessor resolving a member (or array element) within a payload.
pub type ReadFn =
    Box<dyn for<'p> Fn(&'p dyn Any, Option<usize>) -> Option<FieldRef<'p>> + Send + Sync>;

/// Accessor reporting the runtime length of an array or sequence member.
pub type LenFn = Box<dyn Fn(&dyn Any) -> Option<usize> + Send + Sync>;

/// One member of a native descriptor.
pub struct NativeMember {
    name: &'static str,
    type_tag: TypeTag,
    is_array: bool,
    array_size: usize,
    is_upper_bound: bool,
    nested: Option<Arc<TypeSupport>>,
    read: ReadFn,
    len: Option<LenFn>,
}

impl NativeMember {
    /// Create a plain member with its read accessor.
    pub fn new(name: &'static str, type_tag: TypeTag, read: ReadFn) -> Self {
        Self {
            name,
            type_tag,
            is_array: false,
            array_size: 0,
            is_upper_bound: false,
            nested: None,
            read,
            len: None,
        }
    }

    /// Turn this member into a fixed-size array.
    pub fn with_array(mut self, size: usize) -> Self {
        self.is_array = true;
        self.array_size = size;
        self.is_upper_bound = false;
        self
    }

    /// Turn this member into a bounded sequence with a length accessor.
    pub fn with_bounded_sequence(mut self, bound: usize, len: LenFn) -> Self {
        self.is_array = true;
        self.array_size = bound;
        self.is_upper_bound = true;
        self.len = Some(len);
        self
    }

    /// Turn this member into an unbounded sequence with a length accessor.
    pub fn with_sequence(mut self, len: LenFn) -> Self {
        self.is_array = true;
        self.array_size = 0;
        self.is_upper_bound = false;
        self.len = Some(len);
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
    pub fn name(&self) -> &'static str {
        self.name
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
    pub fn sequence_len(&self, base: &dyn Any) -> Option<usize> {
        match &self.len {
            Some(len) => len(base),
            // Fixed arrays have no length accessor; their size is static.
            None if self.is_array => Some(self.array_size),
            None => None,
        }
    }

    /// Resolve this member (or one of its elements) within `base`.
    pub fn get<'p>(&self, base: &'p dyn Any, index: Option<usize>) -> Option<FieldRef<'p>> {
        if self.is_array != index.is_some() {
            return None;
        }
        (self.read)(base, index)
    }
}

impl std::fmt::Debug for NativeMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeMember")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("is_array", &self.is_array)
            .field("array_size", &self.array_size)
            .field("is_upper_bound", &self.is_upper_bound)
            .finish_non_exhaustive()
    }
}

/// The member table of a native descriptor.
#[derive(Debug, Default)]
pub struct NativeMembers {
    members: Vec<NativeMember>,
}

impl NativeMembers {
    /// Create a member table.
    pub fn new(members: Vec<NativeMember>) -> Self {
        Self { members }
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
    pub fn get(&self, index: usize) -> Option<&NativeMember> {
        self.members.get(index)
    }
}
