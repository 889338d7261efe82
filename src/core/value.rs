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

//! Runtime values for filter expressions
//!
//! [`FilterValue`] represents a constant, parameter, or field value on a
//! filter expression, together with the promotion and comparison rules of
//! the filter sub-language and the regex backing for LIKE / MATCH
//! predicates.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use super::types::ValueKind;

/// Maximum number of content bytes a string value retains.
///
/// Longer strings are truncated on write and compare only on their leading
/// bytes. Truncation never splits a UTF-8 sequence.
pub const MAX_STRING_BYTES: usize = 254;

/// Fixed-capacity string storage for string-kind values.
///
/// The evaluator overwrites this buffer in place on every payload, so
/// materializing a string field performs no allocation.
pub struct StringBuffer {
    buf: [u8; MAX_STRING_BYTES + 1],
    len: usize,
}

impl StringBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: [0; MAX_STRING_BYTES + 1],
            len: 0,
        }
    }

    /// Overwrite the buffer with `s`, truncating at [`MAX_STRING_BYTES`].
    ///
    /// When `s` is longer than the capacity, the cut falls on the last
    /// UTF-8 character boundary at or below the limit.
    pub fn set(&mut self, s: &str) {
        let mut end = s.len().min(MAX_STRING_BYTES);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf[..end].copy_from_slice(&s.as_bytes()[..end]);
        self.len = end;
    }

    /// View the stored content.
    pub fn as_str(&self) -> &str {
        // The buffer only ever holds a prefix of a valid &str, cut on a
        // char boundary.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Number of content bytes stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no content is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for StringBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

/// The payload of a [`FilterValue`].
///
/// Exactly one representation is active; which one is determined by the
/// value's [`ValueKind`] at construction time and never changes afterwards.
#[derive(Debug)]
enum ValueData {
    Bool(bool),
    Char(char),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    String(StringBuffer),
}

/// Regular-expression role of a value used on a LIKE or MATCH predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegexKind {
    None,
    Like,
    Match,
}

/// A value (constant, parameter, or materialized field) on a filter
/// expression.
///
/// Values are move-only; copying the state of another value requires an
/// explicit [`FilterValue::copy_from`].
#[derive(Debug)]
pub struct FilterValue {
    kind: ValueKind,
    data: ValueData,
    regex_kind: RegexKind,
    regex: Option<Regex>,
}

/// Numeric view used for promotion during comparison.
enum Numeric {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl FilterValue {
    /// Construct a zero-valued instance of the given kind.
    ///
    /// Used for field values, whose kind is fixed at bind time and whose
    /// data is overwritten on every evaluation.
    pub fn of_kind(kind: ValueKind) -> Self {
        let data = match kind {
            ValueKind::Boolean => ValueData::Bool(false),
            ValueKind::Enum | ValueKind::SignedInteger => ValueData::Signed(0),
            ValueKind::UnsignedInteger => ValueData::Unsigned(0),
            ValueKind::FloatConst
            | ValueKind::FloatField
            | ValueKind::DoubleField
            | ValueKind::LongDoubleField => ValueData::Float(0.0),
            ValueKind::Char => ValueData::Char('\0'),
            ValueKind::String => ValueData::String(StringBuffer::new()),
        };
        Self {
            kind,
            data,
            regex_kind: RegexKind::None,
            regex: None,
        }
    }

    /// Construct a boolean literal.
    pub fn boolean(value: bool) -> Self {
        let mut v = Self::of_kind(ValueKind::Boolean);
        v.data = ValueData::Bool(value);
        v
    }

    /// Construct a character literal.
    pub fn character(value: char) -> Self {
        let mut v = Self::of_kind(ValueKind::Char);
        v.data = ValueData::Char(value);
        v
    }

    /// Construct a signed integer literal.
    pub fn signed(value: i64) -> Self {
        let mut v = Self::of_kind(ValueKind::SignedInteger);
        v.data = ValueData::Signed(value);
        v
    }

    /// Construct an unsigned integer literal.
    pub fn unsigned(value: u64) -> Self {
        let mut v = Self::of_kind(ValueKind::UnsignedInteger);
        v.data = ValueData::Unsigned(value);
        v
    }

    /// Construct a floating point literal.
    pub fn float(value: f64) -> Self {
        let mut v = Self::of_kind(ValueKind::FloatConst);
        v.data = ValueData::Float(value);
        v
    }

    /// Construct a string literal, truncating at [`MAX_STRING_BYTES`].
    pub fn string(value: &str) -> Self {
        let mut v = Self::of_kind(ValueKind::String);
        if let ValueData::String(buf) = &mut v.data {
            buf.set(value);
        }
        v
    }

    /// The semantic kind of this value.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    // =========================================================================
    // Mutation (field materialization, parameter rebinding)
    // =========================================================================

    /// Copy the state of `other` into this value.
    ///
    /// When `copy_regex` is false the regular-expression role of this value
    /// is kept as-is; the caller is expected to follow up with
    /// [`FilterValue::value_has_changed`].
    pub fn copy_from(&mut self, other: &FilterValue, copy_regex: bool) {
        self.kind = other.kind;
        self.data = match &other.data {
            ValueData::Bool(v) => ValueData::Bool(*v),
            ValueData::Char(v) => ValueData::Char(*v),
            ValueData::Signed(v) => ValueData::Signed(*v),
            ValueData::Unsigned(v) => ValueData::Unsigned(*v),
            ValueData::Float(v) => ValueData::Float(*v),
            ValueData::String(s) => {
                let mut buf = StringBuffer::new();
                buf.set(s.as_str());
                ValueData::String(buf)
            }
        };
        if copy_regex {
            self.regex_kind = other.regex_kind;
            self.regex = other.regex.clone();
        }
    }

    /// Store a boolean into this value.
    pub fn set_bool(&mut self, value: bool) {
        self.data = ValueData::Bool(value);
        self.value_has_changed();
    }

    /// Store a character into this value.
    pub fn set_char(&mut self, value: char) {
        self.data = ValueData::Char(value);
        self.value_has_changed();
    }

    /// Store a signed integer into this value.
    pub fn set_signed(&mut self, value: i64) {
        self.data = ValueData::Signed(value);
        self.value_has_changed();
    }

    /// Store an unsigned integer into this value.
    pub fn set_unsigned(&mut self, value: u64) {
        self.data = ValueData::Unsigned(value);
        self.value_has_changed();
    }

    /// Store a floating point number into this value.
    pub fn set_float(&mut self, value: f64) {
        self.data = ValueData::Float(value);
        self.value_has_changed();
    }

    /// Store a string into this value, truncating at [`MAX_STRING_BYTES`].
    pub fn set_str(&mut self, value: &str) {
        match &mut self.data {
            ValueData::String(buf) => buf.set(value),
            _ => {
                let mut buf = StringBuffer::new();
                buf.set(value);
                self.data = ValueData::String(buf);
            }
        }
        self.value_has_changed();
    }

    // =========================================================================
    // Regular expressions (LIKE / MATCH)
    // =========================================================================

    /// Mark this value as the pattern operand of a LIKE or MATCH predicate
    /// and compile the pattern from the current content.
    pub fn as_regular_expression(&mut self, is_like_operand: bool) {
        self.regex_kind = if is_like_operand {
            RegexKind::Like
        } else {
            RegexKind::Match
        };
        self.recompile_regex();
    }

    /// Notify this value that its content changed.
    ///
    /// Recompiles the regular expression when this value serves as a
    /// LIKE / MATCH pattern.
    pub fn value_has_changed(&mut self) {
        if self.regex_kind != RegexKind::None {
            self.recompile_regex();
        }
    }

    fn recompile_regex(&mut self) {
        let source: Option<String> = self.text_content().map(Cow::into_owned);
        let Some(source) = source else {
            self.regex = None;
            return;
        };
        let pattern = match self.regex_kind {
            RegexKind::Like => like_pattern_to_regex(&source),
            RegexKind::Match => source,
            RegexKind::None => return,
        };
        // Anchor to the entire string; a failed compile leaves the regex
        // empty, which makes the predicate evaluate to false.
        self.regex = Regex::new(&format!("^(?:{})$", pattern)).ok();
    }

    /// Match this value's text against the pattern held by `other`.
    ///
    /// Returns false when this value is not text or when the pattern failed
    /// to compile.
    pub fn is_like(&self, other: &FilterValue) -> bool {
        match (self.text_content(), &other.regex) {
            (Some(text), Some(regex)) => regex.is_match(&text),
            _ => false,
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values under the promotion rules.
    ///
    /// Callers are expected to have validated kind compatibility at bind
    /// time; comparing incompatible kinds falls back to a deterministic
    /// ordering on the kinds themselves.
    pub fn compare(&self, other: &FilterValue) -> Ordering {
        if self.kind.is_text() && other.kind.is_text() {
            let left = self.text_content().unwrap_or(Cow::Borrowed(""));
            let right = other.text_content().unwrap_or(Cow::Borrowed(""));
            return left.as_bytes().cmp(right.as_bytes());
        }

        match (self.as_numeric(), other.as_numeric()) {
            (Some(left), Some(right)) => compare_numeric(left, right),
            _ => self.kind.cmp(&other.kind),
        }
    }

    /// The string content of text-kind values; a char reads as a
    /// single-character string.
    fn text_content(&self) -> Option<Cow<'_, str>> {
        match &self.data {
            ValueData::String(buf) => Some(Cow::Borrowed(buf.as_str())),
            ValueData::Char(c) => Some(Cow::Owned(c.to_string())),
            _ => None,
        }
    }

    /// The numeric view of non-text values; a boolean reads as 0 / 1.
    fn as_numeric(&self) -> Option<Numeric> {
        match &self.data {
            ValueData::Bool(v) => Some(Numeric::Signed(*v as i64)),
            ValueData::Signed(v) => Some(Numeric::Signed(*v)),
            ValueData::Unsigned(v) => Some(Numeric::Unsigned(*v)),
            ValueData::Float(v) => Some(Numeric::Float(*v)),
            ValueData::Char(_) | ValueData::String(_) => None,
        }
    }
}

impl Default for FilterValue {
    /// An empty string value, matching the default kind of a fresh value.
    fn default() -> Self {
        Self::of_kind(ValueKind::String)
    }
}

impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl PartialOrd for FilterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

/// Compare two numeric views after promotion to a common representation.
///
/// Signed and unsigned integers compare exactly whenever the unsigned side
/// fits in i64; otherwise both sides coerce through f64, which loses
/// precision above 2^53.
fn compare_numeric(left: Numeric, right: Numeric) -> Ordering {
    use Numeric::*;

    match (left, right) {
        (Signed(a), Signed(b)) => a.cmp(&b),
        (Unsigned(a), Unsigned(b)) => a.cmp(&b),
        (Signed(a), Unsigned(b)) => {
            if b <= i64::MAX as u64 {
                a.cmp(&(b as i64))
            } else {
                (a as f64).total_cmp(&(b as f64))
            }
        }
        (Unsigned(a), Signed(b)) => {
            if a <= i64::MAX as u64 {
                (a as i64).cmp(&b)
            } else {
                (a as f64).total_cmp(&(b as f64))
            }
        }
        (Float(a), Float(b)) => a.total_cmp(&b),
        (Float(a), Signed(b)) => a.total_cmp(&(b as f64)),
        (Float(a), Unsigned(b)) => a.total_cmp(&(b as f64)),
        (Signed(a), Float(b)) => (a as f64).total_cmp(&b),
        (Unsigned(a), Float(b)) => (a as f64).total_cmp(&b),
    }
}

/// Translate a SQL LIKE pattern into a regular expression body.
///
/// `%` matches any sequence of characters, `_` matches a single character;
/// every other regex metacharacter matches literally.
fn like_pattern_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '.' | '+' | '*' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_buffer_truncation() {
        let mut buf = StringBuffer::new();
        buf.set("hello");
        assert_eq!(buf.as_str(), "hello");
        assert_eq!(buf.len(), 5);

        let long = "x".repeat(300);
        buf.set(&long);
        assert_eq!(buf.len(), MAX_STRING_BYTES);
        assert_eq!(buf.as_str(), &long[..MAX_STRING_BYTES]);

        // Truncation must not split a multi-byte character.
        let mut s = "a".repeat(MAX_STRING_BYTES - 1);
        s.push('é');
        buf.set(&s);
        assert_eq!(buf.len(), MAX_STRING_BYTES - 1);
        assert_eq!(buf.as_str(), &"a".repeat(MAX_STRING_BYTES - 1));
    }

    #[test]
    fn test_integer_comparison() {
        assert_eq!(
            FilterValue::signed(4).compare(&FilterValue::signed(4)),
            Ordering::Equal
        );
        assert_eq!(
            FilterValue::signed(-1).compare(&FilterValue::signed(3)),
            Ordering::Less
        );
        assert_eq!(
            FilterValue::unsigned(10).compare(&FilterValue::unsigned(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_mixed_sign_comparison() {
        // Unsigned fits signed: exact comparison.
        assert_eq!(
            FilterValue::signed(-1).compare(&FilterValue::unsigned(0)),
            Ordering::Less
        );
        assert_eq!(
            FilterValue::signed(7).compare(&FilterValue::unsigned(7)),
            Ordering::Equal
        );

        // Unsigned above i64::MAX: both sides coerce through f64. At the
        // 2^63 boundary, i64::MAX rounds to the same f64 as 2^63, so the
        // comparison reports equality even though the values differ.
        let huge = FilterValue::unsigned(1u64 << 63);
        assert_eq!(
            FilterValue::signed(i64::MAX).compare(&huge),
            Ordering::Equal
        );
        assert_eq!(FilterValue::signed(0).compare(&huge), Ordering::Less);
    }

    #[test]
    fn test_exact_comparison_below_boundary() {
        // As long as the unsigned side fits i64, no precision is lost even
        // above 2^53.
        let a = FilterValue::signed((1i64 << 53) + 1);
        let b = FilterValue::unsigned(1u64 << 53);
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn test_float_comparison() {
        assert_eq!(
            FilterValue::float(1.5).compare(&FilterValue::signed(1)),
            Ordering::Greater
        );
        assert_eq!(
            FilterValue::float(2.0).compare(&FilterValue::unsigned(2)),
            Ordering::Equal
        );
        assert_eq!(
            FilterValue::signed(-3).compare(&FilterValue::float(-2.5)),
            Ordering::Less
        );
    }

    #[test]
    fn test_boolean_comparison() {
        assert_eq!(
            FilterValue::boolean(true).compare(&FilterValue::boolean(true)),
            Ordering::Equal
        );
        assert_eq!(
            FilterValue::boolean(false).compare(&FilterValue::signed(0)),
            Ordering::Equal
        );
        assert_eq!(
            FilterValue::boolean(true).compare(&FilterValue::unsigned(2)),
            Ordering::Less
        );
    }

    #[test]
    fn test_text_comparison() {
        assert_eq!(
            FilterValue::string("abc").compare(&FilterValue::string("abc")),
            Ordering::Equal
        );
        assert_eq!(
            FilterValue::string("abc").compare(&FilterValue::string("abd")),
            Ordering::Less
        );
        // A char compares as a single-character string.
        assert_eq!(
            FilterValue::character('a').compare(&FilterValue::string("a")),
            Ordering::Equal
        );
        assert_eq!(
            FilterValue::string("b").compare(&FilterValue::character('a')),
            Ordering::Greater
        );
    }

    #[test]
    fn test_copy_from() {
        let source = FilterValue::signed(42);
        let mut dest = FilterValue::default();
        dest.copy_from(&source, true);
        assert_eq!(dest.kind(), ValueKind::SignedInteger);
        assert_eq!(dest.compare(&source), Ordering::Equal);
    }

    #[test]
    fn test_like_wildcards() {
        let mut pattern = FilterValue::string("foo%");
        pattern.as_regular_expression(true);

        assert!(FilterValue::string("foobar").is_like(&pattern));
        assert!(FilterValue::string("foo").is_like(&pattern));
        assert!(!FilterValue::string("xfoo").is_like(&pattern));

        let mut single = FilterValue::string("J_n");
        single.as_regular_expression(true);
        assert!(FilterValue::string("Jon").is_like(&single));
        assert!(FilterValue::string("Jan").is_like(&single));
        assert!(!FilterValue::string("John").is_like(&single));
    }

    #[test]
    fn test_like_escapes_metacharacters() {
        let mut pattern = FilterValue::string("a.b%");
        pattern.as_regular_expression(true);
        assert!(FilterValue::string("a.bc").is_like(&pattern));
        assert!(!FilterValue::string("axbc").is_like(&pattern));
    }

    #[test]
    fn test_match_verbatim_pattern() {
        let mut pattern = FilterValue::string("fo+bar|baz");
        pattern.as_regular_expression(false);
        assert!(FilterValue::string("foobar").is_like(&pattern));
        assert!(FilterValue::string("baz").is_like(&pattern));
        assert!(!FilterValue::string("prefix baz").is_like(&pattern));
    }

    #[test]
    fn test_match_is_anchored() {
        let mut pattern = FilterValue::string("oo");
        pattern.as_regular_expression(false);
        // The pattern must match the entire string, not a substring.
        assert!(!FilterValue::string("foo").is_like(&pattern));
        assert!(FilterValue::string("oo").is_like(&pattern));
    }

    #[test]
    fn test_bad_pattern_yields_false() {
        let mut pattern = FilterValue::string("(unclosed");
        pattern.as_regular_expression(false);
        assert!(!FilterValue::string("(unclosed").is_like(&pattern));
    }

    #[test]
    fn test_pattern_recompiles_on_change() {
        let mut pattern = FilterValue::string("a%");
        pattern.as_regular_expression(true);
        assert!(FilterValue::string("abc").is_like(&pattern));

        pattern.set_str("b%");
        assert!(!FilterValue::string("abc").is_like(&pattern));
        assert!(FilterValue::string("bcd").is_like(&pattern));
    }

    #[test]
    fn test_char_field_as_like_subject() {
        let mut pattern = FilterValue::string("_");
        pattern.as_regular_expression(true);
        assert!(FilterValue::character('x').is_like(&pattern));
    }
}
