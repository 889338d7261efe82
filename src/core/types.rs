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

//! Core type definitions for the filter engine
//!
//! This module defines the primitive type tags reported by message
//! introspection ([`TypeTag`]) and the semantic value categories used for
//! operand compatibility and promotion ([`ValueKind`]).

use std::fmt;

/// Primitive type tag of a message member, as reported by a descriptor.
///
/// Covers every primitive a payload member can hold, plus the three
/// non-primitive tags (`Message`, `WChar`, `WString`) that a filter
/// expression may encounter while resolving a field path but can never
/// compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Boolean member
    Bool = 1,
    /// Single-byte character member
    Char = 2,
    /// Raw octet member (compares as unsigned)
    Octet = 3,
    /// 8-bit signed integer
    Int8 = 4,
    /// 8-bit unsigned integer
    Uint8 = 5,
    /// 16-bit signed integer
    Int16 = 6,
    /// 16-bit unsigned integer
    Uint16 = 7,
    /// 32-bit signed integer
    Int32 = 8,
    /// 32-bit unsigned integer
    Uint32 = 9,
    /// 64-bit signed integer
    Int64 = 10,
    /// 64-bit unsigned integer
    Uint64 = 11,
    /// 32-bit floating point
    Float32 = 12,
    /// 64-bit floating point
    Float64 = 13,
    /// Extended-precision floating point
    LongDouble = 14,
    /// UTF-8 string member
    String = 15,
    /// Wide character (not filterable)
    WChar = 16,
    /// Wide string (not filterable)
    WString = 17,
    /// Nested message (not a terminal field)
    Message = 18,
}

impl TypeTag {
    /// Returns true if a field of this type can terminate a field path.
    ///
    /// Nested messages and wide-character types cannot be used as predicate
    /// operands.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, TypeTag::Message | TypeTag::WChar | TypeTag::WString)
    }

    /// Map this tag to the value kind used for compatibility checking.
    ///
    /// Returns `None` for non-primitive tags.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            TypeTag::Bool => Some(ValueKind::Boolean),
            TypeTag::Char => Some(ValueKind::Char),
            TypeTag::Int8 | TypeTag::Int16 | TypeTag::Int32 | TypeTag::Int64 => {
                Some(ValueKind::SignedInteger)
            }
            TypeTag::Octet
            | TypeTag::Uint8
            | TypeTag::Uint16
            | TypeTag::Uint32
            | TypeTag::Uint64 => Some(ValueKind::UnsignedInteger),
            TypeTag::Float32 => Some(ValueKind::FloatField),
            TypeTag::Float64 => Some(ValueKind::DoubleField),
            TypeTag::LongDouble => Some(ValueKind::LongDoubleField),
            TypeTag::String => Some(ValueKind::String),
            TypeTag::Message | TypeTag::WChar | TypeTag::WString => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::Octet => "octet",
            TypeTag::Int8 => "int8",
            TypeTag::Uint8 => "uint8",
            TypeTag::Int16 => "int16",
            TypeTag::Uint16 => "uint16",
            TypeTag::Int32 => "int32",
            TypeTag::Uint32 => "uint32",
            TypeTag::Int64 => "int64",
            TypeTag::Uint64 => "uint64",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::LongDouble => "long double",
            TypeTag::String => "string",
            TypeTag::WChar => "wchar",
            TypeTag::WString => "wstring",
            TypeTag::Message => "message",
        };
        write!(f, "{}", name)
    }
}

/// The semantic category of a filter value.
///
/// The declaration order follows numeric promotion precedence; comparison
/// compatibility is decided on these categories at bind time.
///
/// `Enum` is a reserved slot: descriptors do not currently report
/// enumeration members, so the binder never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueKind {
    /// Boolean value
    Boolean = 0,
    /// Enumeration value (reserved, never produced by the binder)
    Enum = 1,
    /// 64-bit signed integer value
    SignedInteger = 2,
    /// 64-bit unsigned integer value
    UnsignedInteger = 3,
    /// Floating point constant from the expression text
    FloatConst = 4,
    /// 32-bit floating point field
    FloatField = 5,
    /// 64-bit floating point field
    DoubleField = 6,
    /// Extended-precision floating point field
    LongDoubleField = 7,
    /// Single character value
    Char = 8,
    /// String value
    String = 9,
}

impl ValueKind {
    /// Returns true for any of the floating point kinds.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            ValueKind::FloatConst
                | ValueKind::FloatField
                | ValueKind::DoubleField
                | ValueKind::LongDoubleField
        )
    }

    /// Returns true for the integer kinds.
    pub fn is_integer(&self) -> bool {
        matches!(self, ValueKind::SignedInteger | ValueKind::UnsignedInteger)
    }

    /// Returns true for kinds that compare as text.
    pub fn is_text(&self) -> bool {
        matches!(self, ValueKind::Char | ValueKind::String)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Boolean => "BOOLEAN",
            ValueKind::Enum => "ENUM",
            ValueKind::SignedInteger => "SIGNED_INTEGER",
            ValueKind::UnsignedInteger => "UNSIGNED_INTEGER",
            ValueKind::FloatConst => "FLOAT_CONST",
            ValueKind::FloatField => "FLOAT_FIELD",
            ValueKind::DoubleField => "DOUBLE_FIELD",
            ValueKind::LongDoubleField => "LONG_DOUBLE_FIELD",
            ValueKind::Char => "CHAR",
            ValueKind::String => "STRING",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_tags() {
        assert!(TypeTag::Bool.is_primitive());
        assert!(TypeTag::Uint64.is_primitive());
        assert!(TypeTag::String.is_primitive());
        assert!(!TypeTag::Message.is_primitive());
        assert!(!TypeTag::WChar.is_primitive());
        assert!(!TypeTag::WString.is_primitive());
    }

    #[test]
    fn test_value_kind_mapping() {
        assert_eq!(TypeTag::Bool.value_kind(), Some(ValueKind::Boolean));
        assert_eq!(TypeTag::Int16.value_kind(), Some(ValueKind::SignedInteger));
        assert_eq!(
            TypeTag::Octet.value_kind(),
            Some(ValueKind::UnsignedInteger)
        );
        assert_eq!(TypeTag::Float32.value_kind(), Some(ValueKind::FloatField));
        assert_eq!(TypeTag::Float64.value_kind(), Some(ValueKind::DoubleField));
        assert_eq!(
            TypeTag::LongDouble.value_kind(),
            Some(ValueKind::LongDoubleField)
        );
        assert_eq!(TypeTag::Message.value_kind(), None);
        assert_eq!(TypeTag::WString.value_kind(), None);
    }

    #[test]
    fn test_kind_categories() {
        assert!(ValueKind::FloatConst.is_float());
        assert!(ValueKind::LongDoubleField.is_float());
        assert!(!ValueKind::SignedInteger.is_float());
        assert!(ValueKind::UnsignedInteger.is_integer());
        assert!(ValueKind::Char.is_text());
        assert!(ValueKind::String.is_text());
        assert!(!ValueKind::Boolean.is_text());
    }

    #[test]
    fn test_promotion_order() {
        // The declaration order mirrors promotion precedence.
        assert!(ValueKind::Boolean < ValueKind::SignedInteger);
        assert!(ValueKind::SignedInteger < ValueKind::UnsignedInteger);
        assert!(ValueKind::UnsignedInteger < ValueKind::FloatConst);
        assert!(ValueKind::LongDoubleField < ValueKind::Char);
        assert!(ValueKind::Char < ValueKind::String);
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeTag::Uint32.to_string(), "uint32");
        assert_eq!(TypeTag::Message.to_string(), "message");
        assert_eq!(ValueKind::SignedInteger.to_string(), "SIGNED_INTEGER");
        assert_eq!(ValueKind::FloatConst.to_string(), "FLOAT_CONST");
    }
}
