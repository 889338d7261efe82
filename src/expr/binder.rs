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

//! Semantic binder
//!
//! Walks a normalized parse tree against a message descriptor and builds
//! the bound [`FilterExpression`]: field paths resolve to access paths,
//! array indices are validated against fixed sizes, operand kinds are
//! checked for comparability, `%N` parameters are parsed, and BETWEEN
//! predicates desugar into their two-comparison form.

use std::sync::Arc;

use super::condition::{CompoundOp, OperandRef};
use super::expression::FilterExpression;
use super::field::{AccessPath, FieldAccessor, FilterField};
use crate::core::{Error, Result, TypeTag, ValueKind};
use crate::introspect::TypeSupport;
use crate::parser::{parse_literal, ComparisonOp, ConditionNode, FieldPath, Operand};

/// Bind a parse tree to a message type, filling `expr`.
///
/// `expr` must be empty (fresh or cleared); on error it is left in an
/// unspecified state and should be cleared before reuse.
pub fn bind_expression(
    tree: ConditionNode,
    type_support: &Arc<TypeSupport>,
    parameters: &[String],
    expr: &mut FilterExpression,
) -> Result<()> {
    expr.parameters.resize_with(parameters.len(), || None);

    let mut binder = Binder {
        type_support,
        parameters,
        expr,
    };
    let root = binder.convert_condition(tree)?;
    binder.expr.root = Some(root);
    Ok(())
}

struct Binder<'a> {
    type_support: &'a Arc<TypeSupport>,
    parameters: &'a [String],
    expr: &'a mut FilterExpression,
}

impl Binder<'_> {
    fn convert_condition(&mut self, node: ConditionNode) -> Result<usize> {
        match node {
            ConditionNode::Not(inner) => {
                let child = self.convert_condition(*inner)?;
                Ok(self.expr.arena.push_compound(CompoundOp::Not, child, None))
            }
            ConditionNode::And(left, right) => {
                let left = self.convert_condition(*left)?;
                let right = self.convert_condition(*right)?;
                Ok(self
                    .expr
                    .arena
                    .push_compound(CompoundOp::And, left, Some(right)))
            }
            ConditionNode::Or(left, right) => {
                let left = self.convert_condition(*left)?;
                let right = self.convert_condition(*right)?;
                Ok(self
                    .expr
                    .arena
                    .push_compound(CompoundOp::Or, left, Some(right)))
            }
            ConditionNode::Comparison { op, left, right } => {
                self.convert_comparison(op, left, right)
            }
            ConditionNode::Between {
                negated,
                field,
                low,
                high,
            } => self.convert_between(negated, field, low, high),
        }
    }

    fn convert_comparison(
        &mut self,
        op: ComparisonOp,
        left: Operand,
        right: Operand,
    ) -> Result<usize> {
        let is_pattern_op = matches!(op, ComparisonOp::Like | ComparisonOp::Match);
        let left_is_field = left.as_field().is_some();
        let right_is_field = right.as_field().is_some();

        let (left_ref, left_kind) = self.convert_operand(left)?;
        let (right_ref, right_kind) = self.convert_operand(right)?;

        if is_pattern_op {
            // At least one operand must be a string-typed field.
            let has_string_field = (left_is_field && left_kind == ValueKind::String)
                || (right_is_field && right_kind == ValueKind::String);
            if !has_string_field {
                return Err(Error::LikeRequiresStringField);
            }
        }

        if !check_value_compatibility(left_kind, right_kind, is_pattern_op) {
            return Err(Error::IncompatibleOperands {
                left: left_kind,
                right: right_kind,
            });
        }

        if is_pattern_op {
            self.mark_regular_expression(right_ref, op == ComparisonOp::Like);
        }

        let predicate = self.expr.arena.push_predicate(op, left_ref, right_ref);
        self.register_parent(left_ref, predicate);
        self.register_parent(right_ref, predicate);
        Ok(predicate)
    }

    /// Desugar `field [NOT] BETWEEN low AND high`.
    ///
    /// BETWEEN builds `(low <= field) AND (field <= high)`; NOT BETWEEN
    /// builds `(low > field) OR (field > high)`, the strict-inequality
    /// complement.
    fn convert_between(
        &mut self,
        negated: bool,
        field: FieldPath,
        low: Operand,
        high: Operand,
    ) -> Result<usize> {
        let (field_ref, field_kind) = self.resolve_field(&field)?;
        let (low_ref, low_kind) = self.convert_operand(low)?;
        let (high_ref, high_kind) = self.convert_operand(high)?;

        for (left, right) in [
            (field_kind, low_kind),
            (field_kind, high_kind),
            (low_kind, high_kind),
        ] {
            if !check_value_compatibility(left, right, false) {
                return Err(Error::IncompatibleOperands { left, right });
            }
        }

        let (predicate_op, logical_op) = if negated {
            (ComparisonOp::Gt, CompoundOp::Or)
        } else {
            (ComparisonOp::Le, CompoundOp::And)
        };

        let lower = self.expr.arena.push_predicate(predicate_op, low_ref, field_ref);
        self.register_parent(low_ref, lower);
        self.register_parent(field_ref, lower);

        let upper = self
            .expr
            .arena
            .push_predicate(predicate_op, field_ref, high_ref);
        self.register_parent(field_ref, upper);
        self.register_parent(high_ref, upper);

        Ok(self.expr.arena.push_compound(logical_op, lower, Some(upper)))
    }

    /// Convert an operand into a store reference plus its value kind.
    fn convert_operand(&mut self, operand: Operand) -> Result<(OperandRef, ValueKind)> {
        match operand {
            Operand::Literal(value) => {
                let kind = value.kind();
                self.expr.constants.push(value);
                Ok((OperandRef::Constant(self.expr.constants.len() - 1), kind))
            }
            Operand::Parameter { index, .. } => {
                if index >= self.parameters.len() {
                    return Err(Error::ParameterIndexOutOfRange {
                        index,
                        supplied: self.parameters.len(),
                    });
                }
                if self.expr.parameters[index].is_none() {
                    let text = &self.parameters[index];
                    let value = parse_literal(text).map_err(|_| Error::ParameterParse {
                        index,
                        text: text.clone(),
                    })?;
                    self.expr.parameters[index] = Some(value);
                }
                let kind = match self.expr.parameters[index].as_ref() {
                    Some(value) => value.kind(),
                    None => return Err(Error::Internal("parameter slot not populated")),
                };
                Ok((OperandRef::Parameter(index), kind))
            }
            Operand::Field(path) => self.resolve_field(&path),
        }
    }

    /// Resolve a field path against the descriptor, sharing one field per
    /// canonical path.
    fn resolve_field(&mut self, path: &FieldPath) -> Result<(OperandRef, ValueKind)> {
        let key = path.canonical();
        if let Some(&index) = self.expr.field_index.get(&key) {
            return Ok((OperandRef::Field(index), self.expr.fields[index].kind()));
        }

        let mut current = Arc::clone(self.type_support);
        let mut access_path = AccessPath::new();
        let mut terminal_tag = TypeTag::Message;

        for (i, segment) in path.segments.iter().enumerate() {
            let members = current.members()?;
            let (member_index, member) = members
                .member_named(&segment.name)
                .ok_or_else(|| Error::FieldNotFound(segment.name.clone()))?;

            if member.is_array() {
                let index = segment
                    .index
                    .ok_or_else(|| Error::MissingArrayIndex(segment.name.clone()))?;
                // Fixed-size arrays are checked statically; bounded and
                // unbounded sequences defer to evaluation time.
                if member.array_size() > 0
                    && !member.is_upper_bound()
                    && index >= member.array_size()
                {
                    return Err(Error::IndexOutOfRange {
                        field: segment.name.clone(),
                        index,
                        size: member.array_size(),
                    });
                }
            } else if segment.index.is_some() {
                return Err(Error::UnexpectedArrayIndex(segment.name.clone()));
            }

            let tag = member.type_tag();
            let nested = member.nested().map(Arc::clone);

            access_path.push(FieldAccessor {
                member_index,
                array_index: segment.index,
                type_support: Arc::clone(&current),
            });

            if i + 1 == path.segments.len() {
                terminal_tag = tag;
            } else {
                if tag != TypeTag::Message {
                    return Err(Error::FieldNotNested(segment.name.clone()));
                }
                current = nested.ok_or(Error::Internal("nested descriptor missing"))?;
            }
        }

        let kind = terminal_tag
            .value_kind()
            .ok_or_else(|| Error::NotPrimitive(key.clone()))?;

        self.expr
            .fields
            .push(FilterField::new(terminal_tag, kind, access_path));
        let index = self.expr.fields.len() - 1;
        self.expr.field_index.insert(key, index);
        Ok((OperandRef::Field(index), kind))
    }

    fn mark_regular_expression(&mut self, operand: OperandRef, is_like: bool) {
        match operand {
            OperandRef::Constant(i) => self.expr.constants[i].as_regular_expression(is_like),
            OperandRef::Parameter(i) => {
                if let Some(value) = self.expr.parameters[i].as_mut() {
                    value.as_regular_expression(is_like);
                }
            }
            OperandRef::Field(i) => self.expr.fields[i].mark_regular_expression(is_like),
        }
    }

    fn register_parent(&mut self, operand: OperandRef, predicate: usize) {
        if let OperandRef::Field(i) = operand {
            self.expr.fields[i].add_parent(predicate);
        }
    }
}

/// Kind-compatibility matrix for predicate operands.
///
/// The ENUM rows are carried for completeness but stay unreachable: the
/// binder never produces `ValueKind::Enum` because descriptors do not
/// report enumeration members.
fn check_value_compatibility(left: ValueKind, right: ValueKind, ignore_enum: bool) -> bool {
    use ValueKind::*;

    if !ignore_enum && right == Enum {
        return matches!(left, Enum | SignedInteger | UnsignedInteger | String);
    }

    match left {
        Boolean => matches!(right, Boolean | SignedInteger | UnsignedInteger),
        SignedInteger | UnsignedInteger => matches!(
            right,
            SignedInteger
                | UnsignedInteger
                | Boolean
                | FloatConst
                | FloatField
                | DoubleField
                | LongDoubleField
        ),
        Char | String => matches!(right, Char | String),
        FloatConst | FloatField | DoubleField | LongDoubleField => matches!(
            right,
            FloatConst
                | FloatField
                | DoubleField
                | LongDoubleField
                | SignedInteger
                | UnsignedInteger
        ),
        Enum => {
            if ignore_enum {
                false
            } else {
                matches!(right, Enum | SignedInteger | UnsignedInteger | String)
            }
        }
    }
}
