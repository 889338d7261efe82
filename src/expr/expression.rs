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

//! Bound filter expressions
//!
//! A [`FilterExpression`] is the output of the semantic binder: a
//! condition arena plus the constant, parameter, and field stores its
//! operand references point into. It is retained across evaluations and
//! returned to the expression pool cleared.

use std::any::Any;
use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use super::condition::{ConditionArena, ConditionKind, ConditionState, OperandRef};
use super::field::FilterField;
use crate::core::{Error, FilterValue, Result};
use crate::parser::{parse_literal, ComparisonOp};

/// A compiled, bound filter expression.
#[derive(Debug, Default)]
pub struct FilterExpression {
    /// Condition nodes; the tree structure lives in the node links
    pub(crate) arena: ConditionArena,
    /// Arena index of the root condition
    pub(crate) root: Option<usize>,
    /// Literal values from the expression text
    pub(crate) constants: Vec<FilterValue>,
    /// Parameter values indexed by `%N`; `None` for unreferenced slots
    pub(crate) parameters: Vec<Option<FilterValue>>,
    /// Referenced fields in order of first reference
    pub(crate) fields: Vec<FilterField>,
    /// Canonical field path -> index into `fields`
    pub(crate) field_index: FxHashMap<String, usize>,
}

impl FilterExpression {
    /// Create an empty expression, ready for binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameter slots the expression was bound with.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Evaluate the expression against a payload.
    ///
    /// Resets all evaluation state, then materializes referenced fields in
    /// order of first reference until the root condition decides. A field
    /// that fails to materialize (sequence index out of range, payload not
    /// matching the descriptor) rejects the payload.
    pub fn evaluate(&mut self, payload: &dyn Any) -> bool {
        let root = match self.root {
            Some(root) => root,
            None => return false,
        };

        self.reset();

        for i in 0..self.fields.len() {
            if self.arena.state(root) != ConditionState::Undecided {
                break;
            }
            if !self.fields[i].set_value(payload) {
                return false;
            }
            for k in 0..self.fields[i].parents().len() {
                let predicate = self.fields[i].parents()[k];
                self.predicate_value_changed(predicate);
            }
        }

        self.arena.state(root) == ConditionState::True
    }

    /// Rebind the parameter values without recompiling the expression.
    ///
    /// Every referenced parameter slot is re-parsed from `parameters`. On
    /// any failure all parameter values roll back and the expression is
    /// left exactly as before the call.
    pub fn set_parameters(&mut self, parameters: &[String]) -> Result<()> {
        if parameters.len() < self.parameters.len() {
            return Err(Error::BadParameter(
                "parameter list shorter than the expression requires",
            ));
        }

        let count = self.parameters.len();
        let mut saved: Vec<Option<FilterValue>> = Vec::with_capacity(count);

        for n in 0..count {
            if self.parameters[n].is_none() {
                saved.push(None);
                continue;
            }

            match parse_literal(&parameters[n]) {
                Ok(new_value) => {
                    if let Some(slot) = self.parameters[n].as_mut() {
                        let mut old = FilterValue::default();
                        old.copy_from(slot, true);
                        slot.copy_from(&new_value, false);
                        slot.value_has_changed();
                        saved.push(Some(old));
                    }
                }
                Err(_) => {
                    // Roll back every slot already updated.
                    for (j, previous) in saved.iter().enumerate() {
                        if let (Some(previous), Some(slot)) =
                            (previous.as_ref(), self.parameters[j].as_mut())
                        {
                            slot.copy_from(previous, true);
                        }
                    }
                    return Err(Error::ParameterParse {
                        index: n,
                        text: parameters[n].clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Clear all state so the expression can return to the pool.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.constants.clear();
        self.parameters.clear();
        self.fields.clear();
        self.field_index.clear();
    }

    /// Restore all conditions and field values to their undecided state.
    fn reset(&mut self) {
        self.arena.reset();
        for field in &mut self.fields {
            field.reset();
        }
    }

    /// Recompute a predicate after one of its operands changed.
    fn predicate_value_changed(&mut self, index: usize) {
        let result = {
            let (op, left, right) = match self.arena.kind(index) {
                ConditionKind::Predicate { op, left, right } => (op, left, right),
                ConditionKind::Compound { .. } => return,
            };

            let (left, right) = match (self.operand(left), self.operand(right)) {
                (Some(left), Some(right)) => (left, right),
                // The other operand has not materialized yet.
                _ => return,
            };

            match op {
                ComparisonOp::Eq => left.compare(right) == Ordering::Equal,
                ComparisonOp::Ne => left.compare(right) != Ordering::Equal,
                ComparisonOp::Lt => left.compare(right) == Ordering::Less,
                ComparisonOp::Le => left.compare(right) != Ordering::Greater,
                ComparisonOp::Gt => left.compare(right) == Ordering::Greater,
                ComparisonOp::Ge => left.compare(right) != Ordering::Less,
                ComparisonOp::Like | ComparisonOp::Match => left.is_like(right),
            }
        };

        self.arena.set_result(index, result);
    }

    /// Resolve an operand reference to a usable value.
    ///
    /// Constants and parameters always have a value; fields only after
    /// materialization.
    fn operand(&self, operand: OperandRef) -> Option<&FilterValue> {
        match operand {
            OperandRef::Constant(i) => self.constants.get(i),
            OperandRef::Parameter(i) => self.parameters.get(i)?.as_ref(),
            OperandRef::Field(i) => {
                let field = self.fields.get(i)?;
                field.has_value().then(|| field.value())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TypeTag, ValueKind};
    use crate::expr::condition::CompoundOp;
    use crate::expr::field::FieldAccessor;
    use crate::introspect::{DynamicMembers, DynamicMessage, TypeSupport};
    use smallvec::smallvec;

    /// Assemble `x = 4 OR x = 7` by hand against a one-member descriptor.
    fn sample_expression() -> FilterExpression {
        let ts = TypeSupport::dynamic(
            DynamicMembers::builder()
                .member("x", TypeTag::Int32)
                .build(),
        );

        let mut expr = FilterExpression::new();
        expr.constants.push(FilterValue::signed(4));
        expr.constants.push(FilterValue::signed(7));
        expr.fields.push(FilterField::new(
            TypeTag::Int32,
            ValueKind::SignedInteger,
            smallvec![FieldAccessor {
                member_index: 0,
                array_index: None,
                type_support: ts,
            }],
        ));
        expr.field_index.insert("x".to_string(), 0);

        let p0 = expr.arena.push_predicate(
            ComparisonOp::Eq,
            OperandRef::Field(0),
            OperandRef::Constant(0),
        );
        let p1 = expr.arena.push_predicate(
            ComparisonOp::Eq,
            OperandRef::Field(0),
            OperandRef::Constant(1),
        );
        expr.fields[0].add_parent(p0);
        expr.fields[0].add_parent(p1);
        let root = expr.arena.push_compound(CompoundOp::Or, p0, Some(p1));
        expr.root = Some(root);
        expr
    }

    #[test]
    fn test_evaluate_matches() {
        let mut expr = sample_expression();
        assert!(expr.evaluate(&DynamicMessage::new(vec![4i32.into()])));
        assert!(expr.evaluate(&DynamicMessage::new(vec![7i32.into()])));
        assert!(!expr.evaluate(&DynamicMessage::new(vec![5i32.into()])));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut expr = sample_expression();
        let payload = DynamicMessage::new(vec![4i32.into()]);
        assert!(expr.evaluate(&payload));
        assert!(expr.evaluate(&payload));
        assert!(expr.evaluate(&payload));
    }

    #[test]
    fn test_mismatched_payload_rejects() {
        let mut expr = sample_expression();
        // Payload with no members cannot materialize the field.
        assert!(!expr.evaluate(&DynamicMessage::new(vec![])));
    }

    #[test]
    fn test_cleared_expression_rejects() {
        let mut expr = sample_expression();
        expr.clear();
        assert!(!expr.evaluate(&DynamicMessage::new(vec![4i32.into()])));
        assert_eq!(expr.parameter_count(), 0);
    }

    #[test]
    fn test_set_parameters_rebinds() {
        let mut expr = FilterExpression::new();
        expr.parameters.push(Some(FilterValue::signed(7)));
        expr.parameters.push(None);

        expr.set_parameters(&["9".to_string(), "ignored".to_string()])
            .unwrap();
        let value = expr.parameters[0].as_ref().unwrap();
        assert_eq!(
            value.compare(&FilterValue::signed(9)),
            std::cmp::Ordering::Equal
        );
        // The unreferenced slot stays empty.
        assert!(expr.parameters[1].is_none());
    }

    #[test]
    fn test_set_parameters_rolls_back_on_failure() {
        let mut expr = FilterExpression::new();
        expr.parameters.push(Some(FilterValue::signed(1)));
        expr.parameters.push(Some(FilterValue::signed(2)));

        let err = expr
            .set_parameters(&["5".to_string(), "not a literal".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::ParameterParse { index: 1, .. }));

        // The first slot was updated and must have rolled back.
        let first = expr.parameters[0].as_ref().unwrap();
        assert_eq!(
            first.compare(&FilterValue::signed(1)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn test_set_parameters_requires_full_list() {
        let mut expr = FilterExpression::new();
        expr.parameters.push(Some(FilterValue::signed(1)));
        expr.parameters.push(None);

        let err = expr.set_parameters(&["5".to_string()]).unwrap_err();
        assert!(matches!(err, Error::BadParameter(_)));
    }
}
